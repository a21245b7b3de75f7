use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// The backend answered with an explicit `error` message.
    #[error("{0}")]
    Rejected(String),

    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("request to backend failed: {0}")]
    RequestFailed(String),

    #[error("backend returned HTTP {0}")]
    Status(u16),

    #[error("invalid response from backend: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Whether the backend understood the request and refused it,
    /// as opposed to the exchange itself failing.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::Rejected(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            ClientError::Unreachable(format!("connection failed: {e}"))
        } else {
            ClientError::RequestFailed(e.to_string())
        }
    }
}
