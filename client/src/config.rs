//! Backend connection settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend, without the `/api` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_table_overrides() {
        let config: ClientConfig = toml::from_str(r#"base_url = "http://vote.local:8080""#).unwrap();
        assert_eq!(config.base_url, "http://vote.local:8080");
        assert_eq!(config.connect_timeout_secs, 5);
    }
}
