//! Face-recognition poller for login.
//!
//! Every tick captures a frame and asks the backend to detect a face; a
//! confident detection is then sent for recognition against the session.
//! A recognized face that belongs to someone else ends the poll at once.

use crate::camera::{FrameSource, OpenCamera};
use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::retry::{run_bounded, Attempt, AttemptAction, Outcome, RetryPolicy, StopFlag};
use async_trait::async_trait;
use votesecure_client::{Backend, Recognition};
use votesecure_types::wire::{DetectResponse, RecognizeRequest};
use votesecure_types::{ElecteurId, SessionToken};

/// A successful recognition.
#[derive(Clone, Debug, PartialEq)]
pub struct Recognized {
    pub user_id: Option<ElecteurId>,
    pub message: Option<String>,
    /// Recognize calls made, including the successful one.
    pub attempts: u32,
}

/// Whether a detection is good enough to spend a recognition attempt on.
/// A detection without a reported confidence counts as confident.
pub fn is_confident(detection: &DetectResponse, min_confidence: f64) -> bool {
    detection.detected && detection.confidence.map_or(true, |c| c > min_confidence)
}

enum Tick {
    NoFace,
    Judged(Recognition),
}

struct RecognitionAttempts<'a, B: ?Sized, C: FrameSource + ?Sized> {
    backend: &'a B,
    camera: OpenCamera<'a, C>,
    token: &'a SessionToken,
    min_confidence: f64,
    max_recognitions: u32,
    recognitions: u32,
    last_message: Option<String>,
}

#[async_trait]
impl<'a, B, C> AttemptAction for RecognitionAttempts<'a, B, C>
where
    B: Backend + ?Sized,
    C: FrameSource + ?Sized,
{
    type Response = Result<Tick, WizardError>;
    type Output = Recognized;
    type Error = WizardError;

    async fn attempt(&mut self, _n: u32) -> Self::Response {
        let frame = self.camera.capture()?;
        let detection = self.backend.detect_face(&frame).await?;
        if !is_confident(&detection, self.min_confidence) {
            return Ok(Tick::NoFace);
        }
        self.recognitions += 1;
        let request = RecognizeRequest {
            image: frame,
            session_token: self.token.clone(),
        };
        let recognition = self.backend.recognize_face(&request).await?;
        Ok(Tick::Judged(recognition))
    }

    fn judge(&mut self, n: u32, response: Self::Response) -> Attempt<Recognized, WizardError> {
        let recognition = match response {
            Ok(Tick::Judged(recognition)) => recognition,
            Ok(Tick::NoFace) => {
                tracing::debug!(tick = n, "no confident face in frame");
                return Attempt::Retry;
            }
            Err(e) => return Attempt::Fail(e),
        };

        match recognition {
            Recognition::Complete { user_id, message } => Attempt::Accept(Recognized {
                user_id,
                message,
                attempts: self.recognitions,
            }),
            Recognition::Mismatch { message } => {
                tracing::warn!("recognized face does not match the session");
                Attempt::Fail(WizardError::FaceMismatch(message))
            }
            Recognition::NotRecognized { message } => {
                tracing::debug!(
                    attempt = self.recognitions,
                    max = self.max_recognitions,
                    "face not recognized"
                );
                if self.recognitions >= self.max_recognitions {
                    Attempt::Fail(WizardError::RecognitionExhausted {
                        attempts: self.recognitions,
                        message,
                    })
                } else {
                    self.last_message = message;
                    Attempt::Retry
                }
            }
        }
    }
}

/// Poll until the face is recognized for `token`.
///
/// Ends with the first of: recognition complete, session mismatch, any
/// transport error, `recognition_max_attempts` unsuccessful recognize calls,
/// or `recognition_max_ticks` ticks.
pub async fn recognize_face<B, C>(
    backend: &B,
    camera: &mut C,
    token: &SessionToken,
    config: &WizardConfig,
    stop: &StopFlag,
) -> Result<Recognized, WizardError>
where
    B: Backend + ?Sized,
    C: FrameSource + ?Sized,
{
    let policy = RetryPolicy {
        max_attempts: config.recognition_max_ticks,
        delay: config.recognition_interval(),
    };
    let mut action = RecognitionAttempts {
        backend,
        camera: OpenCamera::open(camera)?,
        token,
        min_confidence: config.detection_confidence,
        max_recognitions: config.recognition_max_attempts,
        recognitions: 0,
        last_message: None,
    };

    match run_bounded(&policy, stop, &mut action).await {
        Outcome::Accepted { value, .. } => {
            tracing::info!(attempts = value.attempts, "face recognized");
            Ok(value)
        }
        Outcome::Failed { error, .. } => Err(error),
        Outcome::Exhausted { .. } if action.recognitions > 0 => {
            Err(WizardError::RecognitionExhausted {
                attempts: action.recognitions,
                message: action.last_message.take(),
            })
        }
        Outcome::Exhausted { attempts } => Err(WizardError::NoFaceDetected { ticks: attempts }),
        Outcome::Stopped { .. } => Err(WizardError::Stopped),
    }
}
