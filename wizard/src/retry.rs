//! Bounded retry routine shared by the face loops.
//!
//! An attempt is split in two: [`AttemptAction::attempt`] performs the
//! round trip and [`AttemptAction::judge`] applies its result. The stop flag
//! is checked before every attempt and again between the two halves, so a
//! result that arrives after a stop is dropped without side effects.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cooperative cancellation shared between a loop and whoever may stop it.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Re-arm the flag before starting another loop.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Pause after an attempt that asked to retry.
    pub delay: Duration,
}

/// Verdict on one attempt.
#[derive(Debug, PartialEq)]
pub enum Attempt<T, E> {
    Accept(T),
    Retry,
    /// Retry, with a pause other than the policy's.
    RetryAfter(Duration),
    Fail(E),
}

#[derive(Debug, PartialEq)]
pub enum Outcome<T, E> {
    Accepted { value: T, attempts: u32 },
    Failed { error: E, attempts: u32 },
    Exhausted { attempts: u32 },
    Stopped { attempts: u32 },
}

impl<T, E> Outcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            Outcome::Accepted { attempts, .. }
            | Outcome::Failed { attempts, .. }
            | Outcome::Exhausted { attempts }
            | Outcome::Stopped { attempts } => *attempts,
        }
    }
}

#[async_trait]
pub trait AttemptAction: Send {
    type Response: Send;
    type Output: Send;
    type Error: Send;

    /// One round trip. `n` is the 1-based attempt number.
    async fn attempt(&mut self, n: u32) -> Self::Response;

    /// Decide what the response means and apply its effects.
    fn judge(&mut self, n: u32, response: Self::Response) -> Attempt<Self::Output, Self::Error>;
}

pub async fn run_bounded<A: AttemptAction>(
    policy: &RetryPolicy,
    stop: &StopFlag,
    action: &mut A,
) -> Outcome<A::Output, A::Error> {
    let mut attempts = 0;
    while attempts < policy.max_attempts {
        if stop.is_stopped() {
            return Outcome::Stopped { attempts };
        }
        attempts += 1;

        let response = action.attempt(attempts).await;
        if stop.is_stopped() {
            tracing::debug!(attempt = attempts, "discarding response received after stop");
            return Outcome::Stopped { attempts };
        }

        let pause = match action.judge(attempts, response) {
            Attempt::Accept(value) => return Outcome::Accepted { value, attempts },
            Attempt::Fail(error) => return Outcome::Failed { error, attempts },
            Attempt::Retry => policy.delay,
            Attempt::RetryAfter(pause) => pause,
        };
        if attempts < policy.max_attempts && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }
    Outcome::Exhausted { attempts }
}
