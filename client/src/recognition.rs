//! Interpretation of `/api/face/recognize` answers.

use votesecure_types::wire::RecognizeResponse;
use votesecure_types::ElecteurId;

/// What a single recognition attempt established.
#[derive(Clone, Debug, PartialEq)]
pub enum Recognition {
    /// The face matches the session's voter and the step is complete.
    Complete {
        user_id: Option<ElecteurId>,
        message: Option<String>,
    },
    /// A face was recognized, but it belongs to someone other than the session's voter.
    Mismatch { message: Option<String> },
    /// No match yet (no model, low confidence, unreadable frame...).
    NotRecognized { message: Option<String> },
}

impl Recognition {
    /// Classify a response body. `forbidden` is set when the backend answered HTTP 403,
    /// which it uses for a recognized face that does not match the session.
    pub fn from_response(resp: RecognizeResponse, forbidden: bool) -> Self {
        match (resp.recognized, resp.authentication_complete) {
            (true, Some(true)) => Recognition::Complete {
                user_id: resp.user_id,
                message: resp.message,
            },
            (true, Some(false)) => Recognition::Mismatch {
                message: resp.message,
            },
            _ if forbidden => Recognition::Mismatch {
                message: resp.message,
            },
            _ => Recognition::NotRecognized {
                message: resp.message,
            },
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Recognition::Complete { message, .. }
            | Recognition::Mismatch { message }
            | Recognition::NotRecognized { message } => message.as_deref(),
        }
    }
}
