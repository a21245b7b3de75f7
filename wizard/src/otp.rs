//! OTP challenge lifecycle and its one-second countdown.
//!
//! [`OtpChallenge`] is a pure state machine advanced by [`OtpChallenge::tick`];
//! [`OtpTimer`] drives it from a tokio interval and publishes snapshots.
//! Verification itself is always the backend's call: the challenge only
//! records that the backend accepted a code.

use crate::error::WizardError;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use votesecure_utils::format_countdown;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpState {
    Idle,
    Active,
    Verified,
    Expired,
}

/// Point-in-time view of a challenge, for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OtpSnapshot {
    pub state: OtpState,
    pub remaining_secs: u32,
    pub resend_allowed: bool,
    /// Seconds until resend is allowed again.
    pub resend_in_secs: u32,
    /// `mm:ss`
    pub display: String,
}

#[derive(Clone, Debug)]
pub struct OtpChallenge {
    state: OtpState,
    remaining: u32,
    cooldown_remaining: u32,
    ttl: u32,
    cooldown: u32,
}

impl OtpChallenge {
    pub fn new(ttl_secs: u32, cooldown_secs: u32) -> Self {
        Self {
            state: OtpState::Idle,
            remaining: 0,
            cooldown_remaining: 0,
            ttl: ttl_secs,
            cooldown: cooldown_secs,
        }
    }

    /// Enter `Active` with a full countdown. Resend stays disabled until the
    /// countdown runs out.
    pub fn start(&mut self) {
        self.state = OtpState::Active;
        self.remaining = self.ttl;
        self.cooldown_remaining = self.ttl;
    }

    /// One second elapsed.
    pub fn tick(&mut self) {
        match self.state {
            OtpState::Active => {
                self.remaining = self.remaining.saturating_sub(1);
                self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
                if self.remaining == 0 {
                    self.state = OtpState::Expired;
                    self.cooldown_remaining = 0;
                }
            }
            OtpState::Expired => {
                self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
            }
            OtpState::Idle | OtpState::Verified => {}
        }
    }

    pub fn resend_allowed(&self) -> bool {
        matches!(self.state, OtpState::Active | OtpState::Expired) && self.cooldown_remaining == 0
    }

    /// Record a resend: the countdown restarts and resend is throttled for the cooldown.
    pub fn resend(&mut self) -> Result<(), WizardError> {
        if !self.resend_allowed() {
            return Err(WizardError::ResendThrottled(self.cooldown_remaining));
        }
        self.state = OtpState::Active;
        self.remaining = self.ttl;
        self.cooldown_remaining = self.cooldown;
        Ok(())
    }

    /// The backend accepted a code.
    pub fn verify(&mut self) {
        self.state = OtpState::Verified;
        self.remaining = 0;
        self.cooldown_remaining = 0;
    }

    /// Step exited without verification.
    pub fn clear(&mut self) {
        self.state = OtpState::Idle;
        self.remaining = 0;
        self.cooldown_remaining = 0;
    }

    pub fn state(&self) -> OtpState {
        self.state
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining
    }

    pub fn snapshot(&self) -> OtpSnapshot {
        OtpSnapshot {
            state: self.state,
            remaining_secs: self.remaining,
            resend_allowed: self.resend_allowed(),
            resend_in_secs: if self.resend_allowed() {
                0
            } else {
                self.cooldown_remaining
            },
            display: format_countdown(u64::from(self.remaining)),
        }
    }
}

fn lock(challenge: &Mutex<OtpChallenge>) -> MutexGuard<'_, OtpChallenge> {
    challenge.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ticks an [`OtpChallenge`] once per second on the tokio runtime.
///
/// At most one countdown task runs per timer: starting again aborts the
/// previous task first. Dropping the timer aborts it too.
pub struct OtpTimer {
    challenge: Arc<Mutex<OtpChallenge>>,
    task: Option<JoinHandle<()>>,
    updates: watch::Sender<OtpSnapshot>,
}

impl OtpTimer {
    pub fn new(challenge: OtpChallenge) -> Self {
        let (updates, _) = watch::channel(challenge.snapshot());
        Self {
            challenge: Arc::new(Mutex::new(challenge)),
            task: None,
            updates,
        }
    }

    /// Start a fresh countdown. Must be called within a tokio runtime.
    pub fn start(&mut self) {
        lock(&self.challenge).start();
        self.spawn();
    }

    /// Apply a throttled resend and restart the countdown.
    pub fn resend(&mut self) -> Result<(), WizardError> {
        lock(&self.challenge).resend()?;
        self.spawn();
        Ok(())
    }

    pub fn verify(&mut self) {
        self.abort();
        lock(&self.challenge).verify();
        self.publish();
    }

    pub fn clear(&mut self) {
        self.abort();
        lock(&self.challenge).clear();
        self.publish();
    }

    pub fn snapshot(&self) -> OtpSnapshot {
        lock(&self.challenge).snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<OtpSnapshot> {
        self.updates.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn spawn(&mut self) {
        self.abort();
        self.publish();

        let challenge = Arc::clone(&self.challenge);
        let updates = self.updates.clone();
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let snapshot = {
                    let mut challenge = lock(&challenge);
                    challenge.tick();
                    challenge.snapshot()
                };
                let finished = snapshot.state != OtpState::Active;
                updates.send_replace(snapshot);
                if finished {
                    tracing::info!("OTP countdown expired, resend enabled");
                    break;
                }
            }
        }));
    }
}

impl Drop for OtpTimer {
    fn drop(&mut self) {
        self.abort();
    }
}
