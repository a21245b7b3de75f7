//! Records cached in the session store between steps and across runs.
//!
//! Keys are camelCase so a store written by one client version stays
//! readable by another.

use crate::ids::CandidateId;
use serde::{Deserialize, Serialize};

/// The authenticated voter, stored under `currentUser` after login completes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(rename = "voterID")]
    pub voter_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub authenticated: bool,
}

impl CurrentUser {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Proof that this client cast a vote, stored under `voteRecord`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub voted: bool,
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    pub candidate_party: String,
    pub transaction_id: String,
    pub vote_time: String,
    #[serde(rename = "voterID")]
    pub voter_id: String,
}

/// Form fields collected by the first registration step, stored under `registrationData`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationData {
    #[serde(rename = "voterID")]
    pub voter_id: String,
    #[serde(rename = "aadharID")]
    pub aadhar_id: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
