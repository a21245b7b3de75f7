//! Nullable session store: shared in-memory map.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use votesecure_session::{SessionError, SessionKey, SessionStore};

/// An in-memory session store for testing.
///
/// Clones share the same map, so a test can keep one handle while a wizard
/// owns another and inspect what the wizard wrote.
#[derive(Clone, Default)]
pub struct NullSessionStore {
    entries: Arc<Mutex<BTreeMap<SessionKey, String>>>,
}

impl NullSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key.
    pub fn with(self, key: SessionKey, value: impl Into<String>) -> Self {
        self.entries.lock().unwrap().insert(key, value.into());
        self
    }

    /// Copy of everything stored, for assertions.
    pub fn snapshot(&self) -> BTreeMap<SessionKey, String> {
        self.entries.lock().unwrap().clone()
    }
}

impl SessionStore for NullSessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        self.entries.lock().unwrap().get(&key).cloned()
    }

    fn set(&mut self, key: SessionKey, value: String) -> Result<(), SessionError> {
        self.entries.lock().unwrap().insert(key, value);
        Ok(())
    }

    fn remove(&mut self, key: SessionKey) -> Result<(), SessionError> {
        self.entries.lock().unwrap().remove(&key);
        Ok(())
    }
}
