//! Face-capture loop for enrollment.
//!
//! Frames are grabbed one at a time and sent to `/api/face/detect-single`;
//! frames with a detected face go into the batch until the quota is reached.
//! The batch is only handed back when full, so a failed loop never leads to
//! a partial enrollment.

use crate::camera::{FrameSource, OpenCamera};
use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::retry::{run_bounded, Attempt, AttemptAction, Outcome, RetryPolicy, StopFlag};
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::watch;
use votesecure_client::Backend;
use votesecure_types::wire::DetectResponse;

/// Accepted frames collected so far.
#[derive(Clone, Debug, Default)]
pub struct CaptureBatch {
    frames: Vec<String>,
    quota: usize,
    attempts_used: u32,
    attempts_allowed: u32,
}

impl CaptureBatch {
    pub fn new(quota: usize, attempts_allowed: u32) -> Self {
        Self {
            frames: Vec::with_capacity(quota),
            quota,
            attempts_used: 0,
            attempts_allowed,
        }
    }

    pub fn accepted(&self) -> usize {
        self.frames.len()
    }

    pub fn quota(&self) -> usize {
        self.quota
    }

    pub fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    pub fn attempts_allowed(&self) -> u32 {
        self.attempts_allowed
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.quota
    }

    pub fn progress_percent(&self) -> u8 {
        if self.quota == 0 {
            return 100;
        }
        ((self.frames.len().min(self.quota) * 100) / self.quota) as u8
    }

    fn push(&mut self, frame: String) {
        if !self.is_full() {
            self.frames.push(frame);
        }
    }

    pub fn into_frames(self) -> Vec<String> {
        self.frames
    }
}

/// What the voter should see after each attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CaptureStatus {
    pub accepted: usize,
    pub quota: usize,
    pub attempts: u32,
    pub message: String,
}

struct CaptureAttempts<'a, B: ?Sized, C: FrameSource + ?Sized> {
    backend: &'a B,
    camera: OpenCamera<'a, C>,
    batch: CaptureBatch,
    config: &'a WizardConfig,
    status: Option<&'a watch::Sender<CaptureStatus>>,
}

impl<B: ?Sized, C: FrameSource + ?Sized> CaptureAttempts<'_, B, C> {
    fn report(&self, message: String) {
        if let Some(status) = self.status {
            status.send_replace(CaptureStatus {
                accepted: self.batch.accepted(),
                quota: self.batch.quota(),
                attempts: self.batch.attempts_used(),
                message,
            });
        }
    }
}

#[async_trait]
impl<'a, B, C> AttemptAction for CaptureAttempts<'a, B, C>
where
    B: Backend + ?Sized,
    C: FrameSource + ?Sized,
{
    type Response = Result<(String, DetectResponse), WizardError>;
    type Output = ();
    type Error = WizardError;

    async fn attempt(&mut self, _n: u32) -> Self::Response {
        let frame = self.camera.capture()?;
        let detection = self.backend.detect_face(&frame).await?;
        Ok((frame, detection))
    }

    fn judge(&mut self, n: u32, response: Self::Response) -> Attempt<(), WizardError> {
        self.batch.attempts_used = n;
        match response {
            Ok((frame, detection)) if detection.detected => {
                self.batch.push(frame);
                tracing::debug!(
                    accepted = self.batch.accepted(),
                    quota = self.batch.quota(),
                    attempt = n,
                    "face detected"
                );
                self.report(format!(
                    "Visage détecté ! {}/{} photos valides.",
                    self.batch.accepted(),
                    self.batch.quota()
                ));
                if self.batch.is_full() {
                    Attempt::Accept(())
                } else {
                    Attempt::Retry
                }
            }
            Ok(_) => {
                tracing::debug!(attempt = n, "no face in frame");
                self.report("Aucun visage détecté. Rapprochez-vous et regardez la caméra.".into());
                Attempt::Retry
            }
            Err(WizardError::Camera(e)) => Attempt::Fail(WizardError::Camera(e)),
            Err(e) => {
                tracing::warn!(attempt = n, "face detection request failed: {e}");
                self.report("Erreur de communication. Réessai...".into());
                Attempt::RetryAfter(self.config.capture_error_pause())
            }
        }
    }
}

/// Run the capture loop until the quota is reached.
///
/// Returns exactly `capture_quota` frames on success. The camera is opened
/// for the duration of the loop and closed on every exit path.
pub async fn collect_faces<B, C>(
    backend: &B,
    camera: &mut C,
    config: &WizardConfig,
    stop: &StopFlag,
    status: Option<&watch::Sender<CaptureStatus>>,
) -> Result<Vec<String>, WizardError>
where
    B: Backend + ?Sized,
    C: FrameSource + ?Sized,
{
    let policy = RetryPolicy {
        max_attempts: config.capture_max_attempts,
        delay: config.capture_pause(),
    };
    let mut action = CaptureAttempts {
        backend,
        camera: OpenCamera::open(camera)?,
        batch: CaptureBatch::new(config.capture_quota, config.capture_max_attempts),
        config,
        status,
    };

    match run_bounded(&policy, stop, &mut action).await {
        Outcome::Accepted { attempts, .. } => {
            tracing::info!(attempts, quota = config.capture_quota, "capture quota reached");
            Ok(action.batch.into_frames())
        }
        Outcome::Failed { error, .. } => Err(error),
        Outcome::Exhausted { attempts } => {
            tracing::warn!(
                accepted = action.batch.accepted(),
                quota = config.capture_quota,
                attempts,
                "capture attempts exhausted"
            );
            Err(WizardError::CaptureExhausted {
                accepted: action.batch.accepted(),
                quota: config.capture_quota,
                attempts,
            })
        }
        Outcome::Stopped { .. } => Err(WizardError::Stopped),
    }
}
