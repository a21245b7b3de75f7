//! The `next_step` marker returned by the authentication endpoints.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Which step the backend expects the client to perform next.
///
/// A wizard only advances when the marker matches the step it expects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NextStep {
    VerifyOtp,
    FaceCapture,
    FaceRecognition,
    Vote,
    /// Any marker this client does not know about.
    Other(String),
}

impl NextStep {
    pub fn as_str(&self) -> &str {
        match self {
            NextStep::VerifyOtp => "verify_otp",
            NextStep::FaceCapture => "face_capture",
            NextStep::FaceRecognition => "face_recognition",
            NextStep::Vote => "vote",
            NextStep::Other(s) => s,
        }
    }
}

impl From<&str> for NextStep {
    fn from(s: &str) -> Self {
        match s {
            "verify_otp" => NextStep::VerifyOtp,
            "face_capture" => NextStep::FaceCapture,
            "face_recognition" => NextStep::FaceRecognition,
            "vote" => NextStep::Vote,
            other => NextStep::Other(other.to_string()),
        }
    }
}

impl fmt::Display for NextStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NextStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NextStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NextStep::from(s.as_str()))
    }
}
