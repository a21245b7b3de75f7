//! State shared by one run of a wizard.

use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::otp::{OtpChallenge, OtpState, OtpTimer};
use crate::retry::StopFlag;
use crate::step::{Ack, StepController};
use votesecure_session::{SessionKey, SessionStore};

/// Step OTP entry is shown on, in both wizards.
pub const OTP_STEP: u8 = 2;

/// One wizard run: the step counter, the OTP countdown of step 2, the stop
/// flag of the face loops, and the session store that carries identifiers
/// between steps and across runs.
pub struct WizardSession<S> {
    steps: StepController,
    otp: OtpTimer,
    stop: StopFlag,
    store: S,
}

impl<S: SessionStore> WizardSession<S> {
    pub fn new(total_steps: u8, store: S, config: &WizardConfig) -> Self {
        Self {
            steps: StepController::new(total_steps),
            otp: OtpTimer::new(OtpChallenge::new(
                config.otp_ttl_secs,
                config.resend_cooldown_secs,
            )),
            stop: StopFlag::new(),
            store,
        }
    }

    pub fn current_step(&self) -> u8 {
        self.steps.current()
    }

    pub fn steps(&self) -> &StepController {
        &self.steps
    }

    pub fn otp(&self) -> &OtpTimer {
        &self.otp
    }

    pub fn otp_mut(&mut self) -> &mut OtpTimer {
        &mut self.otp
    }

    pub fn stop_flag(&self) -> &StopFlag {
        &self.stop
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn require_step(&self, step: u8) -> Result<(), WizardError> {
        let current = self.steps.current();
        if current == step {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                expected: step,
                current,
            })
        }
    }

    /// Read a value the flow depends on; when it is gone the run starts over.
    pub fn require(&mut self, key: SessionKey) -> Result<String, WizardError> {
        match self.store.get(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => {
                tracing::warn!(%key, "session value missing, restarting wizard");
                self.steps.reset();
                self.enter();
                Err(WizardError::SessionExpired)
            }
        }
    }

    pub fn advance(&mut self, ack: Ack) -> u8 {
        let from = self.steps.current();
        let to = self.steps.advance(ack);
        if to != from {
            tracing::info!(from, to, "step confirmed");
            self.enter();
        }
        to
    }

    pub fn back(&mut self) -> u8 {
        let from = self.steps.current();
        let to = self.steps.back();
        if to != from {
            tracing::debug!(from, to, "step back");
            self.enter();
        }
        to
    }

    /// Step-entry side effects: a fresh countdown on the OTP step, and no
    /// unverified countdown left running anywhere else.
    fn enter(&mut self) {
        if self.steps.current() == OTP_STEP {
            self.otp.start();
        } else if matches!(
            self.otp.snapshot().state,
            OtpState::Active | OtpState::Expired
        ) {
            self.otp.clear();
        }
    }
}
