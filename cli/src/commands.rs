//! One function per subcommand.

use crate::camera::DirectoryFrames;
use crate::config::AppConfig;
use crate::prompt::{OtpInput, Prompt};
use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use votesecure_client::ApiClient;
use votesecure_session::FileSessionStore;
use votesecure_types::{CandidateId, ResultsSnapshot, VoteRecord};
use votesecure_voting::{bearer, LiveResults, ResultsBoard, VotingBooth, VotingError};
use votesecure_wizard::{
    ErrorCategory, LoginForm, LoginWizard, RegistrationForm, RegistrationWizard, StopFlag,
    WizardError,
};

/// Log the detail, surface the voter-facing text.
fn wizard_failure(e: WizardError) -> anyhow::Error {
    tracing::debug!(error = %e, "wizard step failed");
    anyhow!(e.user_message())
}

fn voting_failure(e: VotingError) -> anyhow::Error {
    tracing::debug!(error = %e, "voting request failed");
    anyhow!(e.user_message())
}

/// Whether the voter may simply try another code.
fn can_retry_otp(e: &WizardError) -> bool {
    matches!(e.category(), ErrorCategory::Validation | ErrorCategory::Backend)
        && !matches!(e, WizardError::SessionExpired)
}

/// Raise the stop flag on Ctrl-C while a face loop runs.
fn stop_on_interrupt(stop: StopFlag) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, stopping camera loop");
            stop.stop();
        }
    })
}

pub async fn register(
    backend: Arc<ApiClient>,
    store: FileSessionStore,
    config: &AppConfig,
    form: RegistrationForm,
    frames: PathBuf,
    mut otp: Option<String>,
) -> Result<()> {
    let mut wizard = RegistrationWizard::new(backend, store, config.wizard.clone());

    wizard.submit_details(&form).await.map_err(wizard_failure)?;
    println!("Code OTP envoyé au {}.", form.phone.trim());

    let mut prompt = Prompt::stdin();
    loop {
        let input = match otp.take() {
            Some(code) => OtpInput::Code(code),
            None => prompt.otp(&wizard.otp().snapshot()).await?,
        };
        match input {
            OtpInput::Resend => match wizard.resend_otp() {
                Ok(()) => println!("Compte à rebours relancé."),
                Err(e) => eprintln!("{}", e.user_message()),
            },
            OtpInput::Code(code) => match wizard.verify_otp(&code).await {
                Ok(()) => break,
                Err(e) if can_retry_otp(&e) => eprintln!("{}", e.user_message()),
                Err(e) => return Err(wizard_failure(e)),
            },
        }
    }
    println!("Téléphone vérifié. Capture faciale en cours, regardez la caméra.");

    let mut progress = wizard.capture_updates();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let status = progress.borrow_and_update().clone();
            eprintln!(
                "  {}/{} images ({} tentatives) {}",
                status.accepted, status.quota, status.attempts, status.message
            );
        }
    });
    let interrupt = stop_on_interrupt(wizard.stop_flag());
    let mut camera = DirectoryFrames::new(frames);
    let captured = wizard.capture_face(&mut camera).await;
    interrupt.abort();
    reporter.abort();
    let saved = captured.map_err(wizard_failure)?;

    wizard.complete().map_err(wizard_failure)?;
    println!("Inscription terminée : {saved} images enregistrées. Vous pouvez vous connecter.");
    Ok(())
}

pub async fn login(
    backend: Arc<ApiClient>,
    store: FileSessionStore,
    config: &AppConfig,
    form: LoginForm,
    frames: PathBuf,
    mut otp: Option<String>,
) -> Result<()> {
    let mut wizard = LoginWizard::new(backend, store, config.wizard.clone());

    wizard
        .submit_credentials(&form)
        .await
        .map_err(wizard_failure)?;
    println!("Identifiants acceptés, code OTP envoyé.");

    let mut prompt = Prompt::stdin();
    loop {
        let input = match otp.take() {
            Some(code) => OtpInput::Code(code),
            None => prompt.otp(&wizard.otp().snapshot()).await?,
        };
        match input {
            OtpInput::Resend => match wizard.resend_otp().await {
                Ok(()) => println!("Nouveau code envoyé."),
                Err(e) => eprintln!("{}", e.user_message()),
            },
            OtpInput::Code(code) => match wizard.verify_otp(&code).await {
                Ok(()) => break,
                Err(e) if can_retry_otp(&e) => eprintln!("{}", e.user_message()),
                Err(e) => return Err(wizard_failure(e)),
            },
        }
    }
    println!("Code vérifié. Reconnaissance faciale en cours, regardez la caméra.");

    let interrupt = stop_on_interrupt(wizard.stop_flag());
    let mut camera = DirectoryFrames::new(frames);
    let recognized = wizard.recognize_face(&mut camera).await;
    interrupt.abort();
    let user = recognized.map_err(wizard_failure)?;

    println!("Bienvenue {} ({}).", user.display_name(), user.voter_id);
    Ok(())
}

fn print_receipt(record: &VoteRecord) {
    println!("Vote enregistré");
    println!("  Candidat       : {} ({})", record.candidate_name, record.candidate_party);
    println!("  ID transaction : {}", record.transaction_id);
    println!("  Date et heure  : {}", record.vote_time);
}

/// Open the booth, or explain why this voter cannot use it.
fn open_booth(
    backend: Arc<ApiClient>,
    store: FileSessionStore,
) -> Result<VotingBooth<ApiClient, FileSessionStore>> {
    let booth = VotingBooth::new(backend, store);
    match booth.check_access() {
        Ok(user) => {
            tracing::debug!(voter = %user.voter_id, "booth opened");
            Ok(booth)
        }
        Err(VotingError::AlreadyVoted(record)) => {
            if let Some(record) = record {
                print_receipt(&record);
            }
            Err(voting_failure(VotingError::AlreadyVoted(None)))
        }
        Err(e) => Err(voting_failure(e)),
    }
}

pub async fn candidates(backend: Arc<ApiClient>, store: FileSessionStore) -> Result<()> {
    let mut booth = open_booth(backend, store)?;
    let candidates = booth.load_candidates().await.map_err(voting_failure)?;
    for c in candidates {
        println!("{:>4}  {:<30} {}", c.id, c.name, c.party);
        if !c.description.is_empty() {
            println!("      {}", c.description);
        }
    }
    Ok(())
}

pub async fn vote(backend: Arc<ApiClient>, store: FileSessionStore, candidate: u64) -> Result<()> {
    let mut booth = open_booth(backend, store)?;
    booth.load_candidates().await.map_err(voting_failure)?;
    let chosen = booth
        .select(CandidateId(candidate))
        .map_err(voting_failure)?;
    tracing::info!(candidate = %chosen.id, "submitting vote");
    let record = booth.submit_vote().await.map_err(voting_failure)?;
    print_receipt(&record);
    Ok(())
}

fn print_results(snapshot: &ResultsSnapshot) {
    for (rank, entry) in snapshot.entries.iter().enumerate() {
        println!(
            "{:>2}. {:<30} {:<20} {:>6} votes {:>5.1}%",
            rank + 1,
            entry.name,
            entry.party,
            entry.votes,
            entry.percentage
        );
    }
    print!("Total : {} votes", snapshot.total_votes());
    if let Some(participation) = snapshot.participation {
        print!(", participation {participation:.1}%");
    }
    println!();
}

pub async fn results(
    backend: Arc<ApiClient>,
    store: FileSessionStore,
    config: &AppConfig,
    watch: bool,
) -> Result<()> {
    let board = ResultsBoard::new(backend, bearer(&store));
    if !watch {
        let snapshot = board.snapshot().await.map_err(voting_failure)?;
        print_results(&snapshot);
        return Ok(());
    }

    let mut live = LiveResults::new();
    let mut updates = live.subscribe();
    live.start(board, config.results_refresh());
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if let Some(snapshot) = &state.snapshot {
                    print_results(snapshot);
                }
                if let Some(error) = &state.last_error {
                    eprintln!("Actualisation échouée : {error}");
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    live.stop();
    Ok(())
}

pub async fn stats(backend: Arc<ApiClient>, store: FileSessionStore) -> Result<()> {
    let board = ResultsBoard::new(backend, bearer(&store));
    let hourly = board.hourly().await.map_err(voting_failure)?;
    for hour in &hourly {
        println!("{:>3}h  {:>6}", hour.heure, hour.votes);
    }
    Ok(())
}

pub fn logout(backend: Arc<ApiClient>, store: FileSessionStore) -> Result<()> {
    let mut booth = VotingBooth::new(backend, store);
    booth.logout().map_err(voting_failure)?;
    println!("Déconnecté.");
    Ok(())
}

pub fn reset(mut store: FileSessionStore) -> Result<()> {
    store.clear()?;
    println!("Session effacée ({}).", store.path().display());
    Ok(())
}
