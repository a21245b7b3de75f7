//! JSON-file-backed session store.
//!
//! The whole store is one JSON object of string values, rewritten on every
//! change (temp file + rename, so a crash never leaves half a file behind).

use crate::error::SessionError;
use crate::key::SessionKey;
use crate::store::SessionStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct FileSessionStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileSessionStore {
    /// Open the store at `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(json) if json.trim().is_empty() => BTreeMap::new(),
            Ok(json) => {
                serde_json::from_str(&json).map_err(|e| SessionError::Corrupt(e.to_string()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(SessionError::Read(format!("{}: {e}", path.display()))),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "opened session store");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop every key, including ones this client does not know.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.entries.clear();
        self.persist()
    }

    fn persist(&self) -> Result<(), SessionError> {
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| SessionError::Write(format!("{}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| SessionError::Write(format!("{}: {e}", self.path.display())))?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        self.entries.get(key.as_str()).cloned()
    }

    fn set(&mut self, key: SessionKey, value: String) -> Result<(), SessionError> {
        self.entries.insert(key.as_str().to_string(), value);
        self.persist()
    }

    fn remove(&mut self, key: SessionKey) -> Result<(), SessionError> {
        if self.entries.remove(key.as_str()).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}
