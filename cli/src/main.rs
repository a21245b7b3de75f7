//! VoteSecure command-line client.

mod camera;
mod commands;
mod config;
mod prompt;

use anyhow::Context;
use clap::Parser;
use config::AppConfig;
use std::path::PathBuf;
use std::sync::Arc;
use votesecure_client::{ApiClient, ClientConfig};
use votesecure_session::FileSessionStore;
use votesecure_utils::LogFormat;

#[derive(Parser)]
#[command(name = "votesecure", about = "VoteSecure voting client")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "VOTESECURE_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL, without the `/api` prefix.
    #[arg(long, env = "VOTESECURE_BASE_URL")]
    base_url: Option<String>,

    /// Session file (the client's local storage).
    #[arg(long, env = "VOTESECURE_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VOTESECURE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VOTESECURE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Register a voter: details, OTP, face enrollment.
    Register {
        #[arg(long)]
        voter_id: String,
        #[arg(long)]
        aadhar_id: String,
        #[arg(long)]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
        /// Accept the terms of use.
        #[arg(long)]
        accept_terms: bool,
        /// Directory of JPEG/PNG frames used as the camera.
        #[arg(long)]
        frames: PathBuf,
        /// OTP code; prompted for when absent.
        #[arg(long)]
        otp: Option<String>,
    },
    /// Log in: credentials, OTP, face recognition.
    Login {
        #[arg(long)]
        voter_id: String,
        #[arg(long)]
        aadhar_id: String,
        #[arg(long)]
        frames: PathBuf,
        #[arg(long)]
        otp: Option<String>,
    },
    /// List the candidates.
    Candidates,
    /// Vote for a candidate.
    Vote {
        /// Candidate id as listed by `candidates`.
        candidate: u64,
    },
    /// Show the results.
    Results {
        /// Keep refreshing until interrupted.
        #[arg(long)]
        watch: bool,
    },
    /// Show votes per hour.
    Stats,
    /// Forget the logged-in voter.
    Logout,
    /// Clear the whole session file.
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (file_config, problem) = match &cli.config {
        Some(path) => match AppConfig::load(path) {
            Ok(config) => (config, None),
            Err(e) => (AppConfig::default(), Some(e)),
        },
        None => (AppConfig::default(), None),
    };

    let config = AppConfig {
        client: ClientConfig {
            base_url: cli.base_url.unwrap_or(file_config.client.base_url),
            ..file_config.client
        },
        session_file: cli.session_file.unwrap_or(file_config.session_file),
        log_level: cli.log_level.unwrap_or(file_config.log_level),
        log_format: cli.log_format.unwrap_or(file_config.log_format),
        ..file_config
    };

    votesecure_utils::init_logging(config.log_format, &config.log_level);
    match (&cli.config, problem) {
        (_, Some(problem)) => tracing::warn!("{problem}, using defaults"),
        (Some(path), None) => tracing::info!("Loaded config from {}", path.display()),
        (None, None) => {}
    }

    let backend = Arc::new(ApiClient::new(&config.client));
    let store = FileSessionStore::open(&config.session_file).with_context(|| {
        format!("cannot open session file {}", config.session_file.display())
    })?;
    tracing::debug!(backend = backend.base_url(), "client ready");

    match cli.command {
        Command::Register {
            voter_id,
            aadhar_id,
            phone,
            email,
            accept_terms,
            frames,
            otp,
        } => {
            let form = votesecure_wizard::RegistrationForm {
                voter_id,
                aadhar_id,
                phone,
                email,
                terms_accepted: accept_terms,
            };
            commands::register(backend, store, &config, form, frames, otp).await
        }
        Command::Login {
            voter_id,
            aadhar_id,
            frames,
            otp,
        } => {
            let form = votesecure_wizard::LoginForm {
                voter_id,
                aadhar_id,
            };
            commands::login(backend, store, &config, form, frames, otp).await
        }
        Command::Candidates => commands::candidates(backend, store).await,
        Command::Vote { candidate } => commands::vote(backend, store, candidate).await,
        Command::Results { watch } => commands::results(backend, store, &config, watch).await,
        Command::Stats => commands::stats(backend, store).await,
        Command::Logout => commands::logout(backend, store),
        Command::Reset => commands::reset(store),
    }
}
