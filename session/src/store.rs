//! The session store trait.

use crate::error::SessionError;
use crate::key::SessionKey;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Key-value cache shared by the flows of one client.
///
/// Reads never fail: a missing or unreadable value is simply absent, so a
/// flow that depends on it falls back to "session expired". Writes report
/// errors because losing a freshly issued identifier would strand the flow.
pub trait SessionStore: Send {
    fn get(&self, key: SessionKey) -> Option<String>;

    fn set(&mut self, key: SessionKey, value: String) -> Result<(), SessionError>;

    fn remove(&mut self, key: SessionKey) -> Result<(), SessionError>;

    /// Read and decode a JSON value. A value that fails to decode is logged and treated as absent.
    fn get_json<T: DeserializeOwned>(&self, key: SessionKey) -> Option<T>
    where
        Self: Sized,
    {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%key, "discarding undecodable session value: {e}");
                None
            }
        }
    }

    fn set_json<T: Serialize>(&mut self, key: SessionKey, value: &T) -> Result<(), SessionError>
    where
        Self: Sized,
    {
        let raw =
            serde_json::to_string(value).map_err(|e| SessionError::Serialization(e.to_string()))?;
        self.set(key, raw)
    }

    fn contains(&self, key: SessionKey) -> bool {
        self.get(key).is_some()
    }

    /// Remove several keys, stopping at the first write error.
    fn remove_all(&mut self, keys: &[SessionKey]) -> Result<(), SessionError> {
        for &key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}
