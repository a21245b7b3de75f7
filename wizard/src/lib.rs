//! Client-side authentication wizards for VoteSecure.
//!
//! Registration runs details → OTP → face capture → done; login runs
//! credentials → OTP → face recognition. The step counter of either wizard
//! only moves forward on an [`step::Ack`], and acks are only minted from a
//! backend response that confirmed the current step.
//!
//! The two face loops share one bounded retry routine ([`retry::run_bounded`])
//! and one cancellation flag ([`retry::StopFlag`]).

pub mod camera;
pub mod capture;
pub mod config;
pub mod error;
pub mod login;
pub mod otp;
pub mod recognition;
pub mod registration;
pub mod retry;
pub mod session;
pub mod step;
pub mod validation;

pub use camera::{CameraError, FrameSource};
pub use config::WizardConfig;
pub use error::{ErrorCategory, WizardError};
pub use login::{LoginForm, LoginWizard};
pub use otp::{OtpChallenge, OtpSnapshot, OtpState, OtpTimer};
pub use registration::{RegistrationForm, RegistrationWizard};
pub use retry::StopFlag;
pub use session::WizardSession;
pub use step::StepController;
