//! The voting booth: access gate, ballot, selection and vote submission.

use crate::bearer;
use crate::error::VotingError;
use rand::Rng;
use serde_json::Value;
use std::sync::Arc;
use votesecure_client::Backend;
use votesecure_session::{SessionKey, SessionStore};
use votesecure_types::wire::SubmitVoteRequest;
use votesecure_types::{CandidateId, CandidateSummary, CurrentUser, SessionToken, Timestamp, VoteRecord};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Transaction id used when the backend confirms a vote without one:
/// `VT-<unix secs>-<9 base36 chars>`.
pub fn fallback_transaction_id<R: Rng + ?Sized>(now: Timestamp, rng: &mut R) -> String {
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("VT-{now}-{suffix}")
}

pub struct VotingBooth<B: ?Sized, S> {
    backend: Arc<B>,
    store: S,
    candidates: Vec<CandidateSummary>,
    selected: Option<CandidateId>,
}

impl<B, S> VotingBooth<B, S>
where
    B: Backend + ?Sized,
    S: SessionStore,
{
    pub fn new(backend: Arc<B>, store: S) -> Self {
        Self {
            backend,
            store,
            candidates: Vec::new(),
            selected: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// The authenticated voter, unless there is none or they already voted.
    pub fn check_access(&self) -> Result<CurrentUser, VotingError> {
        let user = self
            .store
            .get_json::<CurrentUser>(SessionKey::CurrentUser)
            .filter(|u| u.authenticated)
            .ok_or(VotingError::NotAuthenticated)?;

        let voted = self
            .store
            .get_json::<Value>(SessionKey::VoteRecord)
            .is_some_and(|record| record["voted"] == Value::Bool(true));
        if voted {
            let record = self.store.get_json::<VoteRecord>(SessionKey::VoteRecord);
            return Err(VotingError::AlreadyVoted(record.map(Box::new)));
        }
        Ok(user)
    }

    /// The stored vote record, if this session voted.
    pub fn vote_record(&self) -> Option<VoteRecord> {
        self.store
            .get_json::<VoteRecord>(SessionKey::VoteRecord)
            .filter(|r| r.voted)
    }

    /// Fetch the ballot.
    pub async fn load_candidates(&mut self) -> Result<&[CandidateSummary], VotingError> {
        let bearer = bearer(&self.store);
        let wire = self.backend.candidates(bearer.as_ref()).await?;
        self.candidates = wire.into_iter().map(CandidateSummary::from).collect();
        if let Some(id) = self.selected {
            if !self.candidates.iter().any(|c| c.id == id) {
                self.selected = None;
            }
        }
        tracing::info!(count = self.candidates.len(), "candidates loaded");
        Ok(&self.candidates)
    }

    pub fn candidates(&self) -> &[CandidateSummary] {
        &self.candidates
    }

    /// Choose a candidate from the loaded ballot.
    pub fn select(&mut self, id: CandidateId) -> Result<&CandidateSummary, VotingError> {
        let candidate = self
            .candidates
            .iter()
            .find(|c| c.id == id)
            .ok_or(VotingError::UnknownCandidate(id))?;
        self.selected = Some(id);
        tracing::debug!(candidate = %id, "candidate selected");
        Ok(candidate)
    }

    pub fn selected(&self) -> Option<&CandidateSummary> {
        let id = self.selected?;
        self.candidates.iter().find(|c| c.id == id)
    }

    /// Cast the vote for the selected candidate and keep its record.
    pub async fn submit_vote(&mut self) -> Result<VoteRecord, VotingError> {
        let user = self.check_access()?;
        let candidate = self.selected().cloned().ok_or(VotingError::NoSelection)?;

        let bearer = bearer(&self.store);
        let session_token = self
            .store
            .get(SessionKey::SessionToken)
            .filter(|t| !t.is_empty())
            .map(SessionToken::new)
            .or_else(|| bearer.clone());
        let request = SubmitVoteRequest {
            candidat_id: candidate.id,
            session_token,
        };

        let response = self.backend.submit_vote(bearer.as_ref(), &request).await?;
        if !response.success {
            return Err(VotingError::Rejected(response.message.unwrap_or_else(|| {
                "Erreur lors de l'enregistrement du vote".into()
            })));
        }

        let now = Timestamp::now();
        let record = VoteRecord {
            voted: true,
            candidate_id: candidate.id,
            candidate_name: candidate.name,
            candidate_party: candidate.party,
            transaction_id: response
                .transaction_id
                .unwrap_or_else(|| fallback_transaction_id(now, &mut rand::thread_rng())),
            vote_time: response.vote_time.unwrap_or_else(|| now.to_string()),
            voter_id: user.voter_id,
        };
        self.store.set_json(SessionKey::VoteRecord, &record)?;
        self.selected = None;
        tracing::info!(transaction = %record.transaction_id, "vote recorded");
        Ok(record)
    }

    /// End the voter's session on this client.
    pub fn logout(&mut self) -> Result<(), VotingError> {
        self.store.remove(SessionKey::CurrentUser)?;
        self.selected = None;
        tracing::info!("logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fallback_id_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = fallback_transaction_id(Timestamp::new(1_714_557_600), &mut rng);
        let suffix = id.strip_prefix("VT-1714557600-").unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }
}
