//! Settings file for the command-line client.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use votesecure_client::ClientConfig;
use votesecure_utils::LogFormat;
use votesecure_wizard::WizardConfig;

/// Everything the binary reads from its TOML file.
///
/// ```toml
/// session_file = "./votesecure_session.json"
/// results_refresh_secs = 30
///
/// [client]
/// base_url = "http://127.0.0.1:5000"
///
/// [wizard]
/// capture_quota = 10
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub wizard: WizardConfig,

    /// JSON file standing in for browser local storage.
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    /// Interval of `results --watch`, in seconds.
    #[serde(default = "default_results_refresh_secs")]
    pub results_refresh_secs: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_session_file() -> PathBuf {
    PathBuf::from("./votesecure_session.json")
}

fn default_results_refresh_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            wizard: WizardConfig::default(),
            session_file: default_session_file(),
            results_refresh_secs: default_results_refresh_secs(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Read `path`, or explain why the defaults should be used instead.
    ///
    /// Logging is not set up yet when the file is read, so the problem is
    /// returned for the caller to report once it is.
    pub fn load(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config file {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("failed to parse config file {}: {e}", path.display()))
    }

    pub fn results_refresh(&self) -> Duration {
        Duration::from_secs(self.results_refresh_secs.max(1))
    }
}
