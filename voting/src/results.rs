//! Results and turnout, once or on a refresh interval.

use crate::error::VotingError;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use votesecure_client::Backend;
use votesecure_types::{HourlyVotes, ResultsSnapshot, SessionToken, Timestamp};

/// Read side of the results endpoints.
pub struct ResultsBoard<B: ?Sized> {
    backend: Arc<B>,
    bearer: Option<SessionToken>,
}

impl<B: ?Sized> Clone for ResultsBoard<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            bearer: self.bearer.clone(),
        }
    }
}

impl<B: Backend + ?Sized> ResultsBoard<B> {
    pub fn new(backend: Arc<B>, bearer: Option<SessionToken>) -> Self {
        Self { backend, bearer }
    }

    /// Current standings, sorted by votes.
    pub async fn snapshot(&self) -> Result<ResultsSnapshot, VotingError> {
        let response = self.backend.results(self.bearer.as_ref()).await?;
        let snapshot = ResultsSnapshot::from(response);
        tracing::debug!(
            candidates = snapshot.entries.len(),
            total = snapshot.total_votes(),
            "results fetched"
        );
        Ok(snapshot)
    }

    /// Votes per hour of the day.
    pub async fn hourly(&self) -> Result<Vec<HourlyVotes>, VotingError> {
        let response = self.backend.stats(self.bearer.as_ref()).await?;
        Ok(response.votes_par_heure)
    }
}

/// What the live refresher has seen so far.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LiveState {
    /// Last snapshot fetched successfully.
    pub snapshot: Option<ResultsSnapshot>,
    pub hourly: Vec<HourlyVotes>,
    /// Message of the most recent failed refresh, cleared by the next success.
    pub last_error: Option<String>,
    pub refreshes: u64,
    pub updated_at: Option<Timestamp>,
}

/// Periodic results refresher.
///
/// At most one refresh task runs per instance: `start` aborts the previous
/// one, and so do `stop` and drop.
pub struct LiveResults {
    task: Option<JoinHandle<()>>,
    updates: watch::Sender<LiveState>,
}

impl LiveResults {
    pub fn new() -> Self {
        let (updates, _) = watch::channel(LiveState::default());
        Self {
            task: None,
            updates,
        }
    }

    /// Refresh now and then every `every`. Must be called within a tokio runtime.
    pub fn start<B>(&mut self, board: ResultsBoard<B>, every: Duration)
    where
        B: Backend + ?Sized + 'static,
    {
        self.stop();
        let updates = self.updates.clone();
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                refresh(&board, &updates).await;
            }
        }));
        tracing::info!(every_secs = every.as_secs(), "live results started");
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("live results stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn state(&self) -> LiveState {
        self.updates.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LiveState> {
        self.updates.subscribe()
    }
}

impl Default for LiveResults {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LiveResults {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn refresh<B: Backend + ?Sized>(board: &ResultsBoard<B>, updates: &watch::Sender<LiveState>) {
    let snapshot = board.snapshot().await;
    let hourly = board.hourly().await;

    updates.send_modify(|state| {
        state.refreshes += 1;
        let mut failure = None;
        match snapshot {
            Ok(snapshot) => {
                state.snapshot = Some(snapshot);
                state.updated_at = Some(Timestamp::now());
            }
            Err(e) => failure = Some(e),
        }
        match hourly {
            Ok(hourly) => state.hourly = hourly,
            Err(e) => failure = failure.or(Some(e)),
        }
        match failure {
            Some(e) => {
                tracing::warn!(error = %e, "results refresh failed, keeping last snapshot");
                state.last_error = Some(e.user_message());
            }
            None => state.last_error = None,
        }
    });
}
