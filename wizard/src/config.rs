//! Wizard timing and loop limits.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Countdown shown for a freshly issued OTP, in seconds.
    #[serde(default = "default_otp_ttl_secs")]
    pub otp_ttl_secs: u32,

    /// How long resend stays disabled after a resend, in seconds.
    #[serde(default = "default_resend_cooldown_secs")]
    pub resend_cooldown_secs: u32,

    /// Accepted frames required before enrollment is submitted.
    #[serde(default = "default_capture_quota")]
    pub capture_quota: usize,

    /// Frames the capture loop may try before giving up.
    #[serde(default = "default_capture_max_attempts")]
    pub capture_max_attempts: u32,

    #[serde(default = "default_capture_pause_ms")]
    pub capture_pause_ms: u64,

    /// Pause after a failed detect call.
    #[serde(default = "default_capture_error_pause_ms")]
    pub capture_error_pause_ms: u64,

    #[serde(default = "default_recognition_interval_ms")]
    pub recognition_interval_ms: u64,

    /// Recognize calls allowed before the poller gives up.
    #[serde(default = "default_recognition_max_attempts")]
    pub recognition_max_attempts: u32,

    /// Poll ticks allowed overall, counting ticks without a confident face.
    #[serde(default = "default_recognition_max_ticks")]
    pub recognition_max_ticks: u32,

    /// Minimum detection confidence before a frame is sent for recognition.
    #[serde(default = "default_detection_confidence")]
    pub detection_confidence: f64,
}

fn default_otp_ttl_secs() -> u32 {
    300
}

fn default_resend_cooldown_secs() -> u32 {
    30
}

fn default_capture_quota() -> usize {
    10
}

fn default_capture_max_attempts() -> u32 {
    30
}

fn default_capture_pause_ms() -> u64 {
    500
}

fn default_capture_error_pause_ms() -> u64 {
    1000
}

fn default_recognition_interval_ms() -> u64 {
    500
}

fn default_recognition_max_attempts() -> u32 {
    5
}

fn default_recognition_max_ticks() -> u32 {
    120
}

fn default_detection_confidence() -> f64 {
    0.7
}

impl WizardConfig {
    pub fn capture_pause(&self) -> Duration {
        Duration::from_millis(self.capture_pause_ms)
    }

    pub fn capture_error_pause(&self) -> Duration {
        Duration::from_millis(self.capture_error_pause_ms)
    }

    pub fn recognition_interval(&self) -> Duration {
        Duration::from_millis(self.recognition_interval_ms)
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            otp_ttl_secs: default_otp_ttl_secs(),
            resend_cooldown_secs: default_resend_cooldown_secs(),
            capture_quota: default_capture_quota(),
            capture_max_attempts: default_capture_max_attempts(),
            capture_pause_ms: default_capture_pause_ms(),
            capture_error_pause_ms: default_capture_error_pause_ms(),
            recognition_interval_ms: default_recognition_interval_ms(),
            recognition_max_attempts: default_recognition_max_attempts(),
            recognition_max_ticks: default_recognition_max_ticks(),
            detection_confidence: default_detection_confidence(),
        }
    }
}
