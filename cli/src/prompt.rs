//! Interactive OTP entry on stdin.

use anyhow::{anyhow, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use votesecure_wizard::{OtpSnapshot, OtpState};

#[derive(Debug, PartialEq, Eq)]
pub enum OtpInput {
    Code(String),
    Resend,
}

pub fn parse_otp_input(line: &str) -> OtpInput {
    let input = line.trim();
    if input.eq_ignore_ascii_case("r") || input.eq_ignore_ascii_case("resend") {
        OtpInput::Resend
    } else {
        OtpInput::Code(input.to_string())
    }
}

fn otp_hint(snapshot: &OtpSnapshot) -> String {
    let validity = match snapshot.state {
        OtpState::Expired => "code expiré".to_string(),
        _ => format!("{} restant", snapshot.display),
    };
    let resend = if snapshot.resend_allowed {
        "« r » pour renvoyer".to_string()
    } else {
        format!("renvoi possible dans {}s", snapshot.resend_in_secs)
    };
    format!("{validity}, {resend}")
}

pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Ask for the OTP, showing the live countdown.
    pub async fn otp(&mut self, snapshot: &OtpSnapshot) -> Result<OtpInput> {
        eprint!("Code OTP ({}) : ", otp_hint(snapshot));
        std::io::stderr().flush()?;
        let line = self
            .lines
            .next_line()
            .await?
            .ok_or_else(|| anyhow!("saisie interrompue"))?;
        Ok(parse_otp_input(&line))
    }
}
