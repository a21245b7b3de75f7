//! JSON payloads exchanged with the VoteSecure backend.
//!
//! Field names follow the backend contract verbatim (French identifiers).
//! Every response field the backend may omit is optional here; deciding
//! whether an omission is acceptable is the caller's job.

use crate::ids::{CandidateId, ElecteurId, SessionToken};
use crate::results::HourlyVotes;
use crate::step::NextStep;
use serde::{Deserialize, Serialize};

// ── Authentication ──────────────────────────────────────────────────────

/// `POST /api/auth/register`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub identifiant_electeur: String,
    pub identifiant_aadhar: String,
    pub numero_telephone: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub next_step: Option<NextStep>,
    #[serde(default)]
    pub electeur_id: Option<ElecteurId>,
}

/// `POST /api/auth/login`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub identifiant_electeur: String,
    pub identifiant_aadhar: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub next_step: Option<NextStep>,
    #[serde(default)]
    pub session_token: Option<SessionToken>,
    #[serde(default)]
    pub numero_telephone: Option<String>,
}

/// `POST /api/auth/verify-otp`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub numero_telephone: String,
    pub otp_code: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VerifyOtpResponse {
    #[serde(default)]
    pub next_step: Option<NextStep>,
}

/// `POST /api/auth/complete-login`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompleteLoginRequest {
    pub session_token: SessionToken,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CompleteLoginResponse {
    #[serde(default)]
    pub next_step: Option<NextStep>,
    #[serde(default, rename = "voterID")]
    pub voter_id: Option<String>,
    #[serde(default, rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, rename = "lastName")]
    pub last_name: Option<String>,
}

// ── Face ────────────────────────────────────────────────────────────────

/// `POST /api/face/detect-single`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectRequest {
    /// Base64-encoded JPEG, without a data-URL prefix.
    pub image: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectResponse {
    #[serde(default)]
    pub detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DetectResponse {
    pub fn detected() -> Self {
        Self {
            detected: true,
            ..Default::default()
        }
    }

    pub fn missed() -> Self {
        Self::default()
    }
}

/// `POST /api/face/capture`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub electeur_id: ElecteurId,
    pub images: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CaptureResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub images_saved: Option<u32>,
}

/// `POST /api/face/recognize`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecognizeRequest {
    pub image: String,
    pub session_token: SessionToken,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizeResponse {
    #[serde(default)]
    pub recognized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<ElecteurId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

// ── Voting ──────────────────────────────────────────────────────────────

/// One element of the `GET /api/candidates` array.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateWire {
    pub id: CandidateId,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub parti: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `POST /api/vote/submit`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitVoteRequest {
    pub candidat_id: CandidateId,
    pub session_token: Option<SessionToken>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SubmitVoteResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub vote_time: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One row of `GET /api/vote/results`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResultWire {
    pub id: CandidateId,
    #[serde(default)]
    pub candidat: String,
    #[serde(default)]
    pub parti: String,
    #[serde(default)]
    pub votes: u64,
    #[serde(default)]
    pub pourcentage: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub results: Vec<ResultWire>,
    #[serde(default)]
    pub total_votes: Option<u64>,
    #[serde(default)]
    pub total_electeurs: Option<u64>,
    #[serde(default)]
    pub participation: Option<f64>,
}

/// `GET /api/vote/stats`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub votes_par_heure: Vec<HourlyVotes>,
    #[serde(default)]
    pub participation: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_with_all_fields() {
        let json = r#"{"next_step":"verify_otp","session_token":"tok","numero_telephone":"0601020304"}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.next_step, Some(NextStep::VerifyOtp));
        assert_eq!(resp.session_token.unwrap().as_str(), "tok");
        assert_eq!(resp.numero_telephone.as_deref(), Some("0601020304"));
    }

    #[test]
    fn register_request_uses_backend_field_names() {
        let req = RegisterRequest {
            identifiant_electeur: "VOTER123".into(),
            identifiant_aadhar: "123456789012".into(),
            numero_telephone: "0601020304".into(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["identifiant_electeur"], "VOTER123");
        assert_eq!(value["identifiant_aadhar"], "123456789012");
        assert_eq!(value["numero_telephone"], "0601020304");
    }

    #[test]
    fn recognize_response_mismatch_shape() {
        let json = r#"{"recognized":true,"authentication_complete":false,"message":"no match"}"#;
        let resp: RecognizeResponse = serde_json::from_str(json).unwrap();
        assert!(resp.recognized);
        assert_eq!(resp.authentication_complete, Some(false));
        assert_eq!(resp.user_id, None);
    }

    #[test]
    fn complete_login_reads_camel_case_profile() {
        let json = r#"{"next_step":"vote","voterID":"VOTER123","firstName":"Ada","lastName":"L"}"#;
        let resp: CompleteLoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.next_step, Some(NextStep::Vote));
        assert_eq!(resp.voter_id.as_deref(), Some("VOTER123"));
        assert_eq!(resp.first_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn stats_accept_numeric_or_text_hours() {
        let json = r#"{"votes_par_heure":[{"heure":"09","votes":4},{"heure":10,"votes":2}]}"#;
        let resp: StatsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.votes_par_heure.len(), 2);
        assert_eq!(resp.votes_par_heure[0].heure, "09");
        assert_eq!(resp.votes_par_heure[1].heure, "10");
    }
}
