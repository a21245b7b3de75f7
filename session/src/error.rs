use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read session file: {0}")]
    Read(String),

    #[error("failed to write session file: {0}")]
    Write(String),

    #[error("session file is not valid JSON: {0}")]
    Corrupt(String),

    #[error("failed to serialize session value: {0}")]
    Serialization(String),
}
