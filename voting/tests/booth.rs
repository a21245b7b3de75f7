//! Voting booth against a scripted backend.

use std::sync::Arc;
use votesecure_client::ClientError;
use votesecure_nullables::{Call, NullBackend, NullSessionStore};
use votesecure_session::{SessionKey, SessionStore};
use votesecure_types::wire::SubmitVoteResponse;
use votesecure_types::{CandidateId, CurrentUser, VoteRecord};
use votesecure_voting::{VotingBooth, VotingError};
use votesecure_wizard::ErrorCategory;

const USER: &str = r#"{"voterID":"VOTER123","firstName":"Ada","lastName":"Lovelace","authenticated":true}"#;

fn logged_in() -> NullSessionStore {
    NullSessionStore::new()
        .with(SessionKey::CurrentUser, USER)
        .with(SessionKey::SessionToken, "tok-1")
        .with(SessionKey::AuthBearerToken, "tok-1")
}

fn ballot(backend: &NullBackend) {
    backend.push_candidates(Ok(vec![
        NullBackend::candidate(1, "Jane Doe", "Union"),
        NullBackend::candidate(2, "John Roe", "Renouveau"),
    ]));
}

#[tokio::test]
async fn successful_vote_is_recorded_exactly() {
    let backend = Arc::new(NullBackend::new());
    ballot(&backend);
    backend.push_submit_vote(Ok(SubmitVoteResponse {
        success: true,
        transaction_id: Some("VT-TEST-1".into()),
        vote_time: Some("2024-05-01T10:00:00".into()),
        message: None,
    }));
    let store = logged_in();
    let mut booth = VotingBooth::new(Arc::clone(&backend), store.clone());

    booth.load_candidates().await.unwrap();
    booth.select(CandidateId(1)).unwrap();
    let record = booth.submit_vote().await.unwrap();

    let expected = VoteRecord {
        voted: true,
        candidate_id: CandidateId(1),
        candidate_name: "Jane Doe".into(),
        candidate_party: "Union".into(),
        transaction_id: "VT-TEST-1".into(),
        vote_time: "2024-05-01T10:00:00".into(),
        voter_id: "VOTER123".into(),
    };
    assert_eq!(record, expected);
    let stored: VoteRecord = store.get_json(SessionKey::VoteRecord).unwrap();
    assert_eq!(stored, expected);

    let submitted = backend.calls().into_iter().find_map(|c| match c {
        Call::SubmitVote {
            bearer,
            candidat_id,
            session_token,
        } => Some((bearer, candidat_id, session_token)),
        _ => None,
    });
    assert_eq!(
        submitted,
        Some((Some("tok-1".into()), CandidateId(1), Some("tok-1".into())))
    );
}

#[tokio::test]
async fn second_vote_is_refused_locally() {
    let backend = Arc::new(NullBackend::new());
    ballot(&backend);
    backend.push_submit_vote(Ok(SubmitVoteResponse {
        success: true,
        transaction_id: Some("VT-TEST-1".into()),
        vote_time: None,
        message: None,
    }));
    let mut booth = VotingBooth::new(Arc::clone(&backend), logged_in());
    booth.load_candidates().await.unwrap();
    booth.select(CandidateId(2)).unwrap();
    booth.submit_vote().await.unwrap();

    match booth.check_access() {
        Err(VotingError::AlreadyVoted(Some(record))) => {
            assert_eq!(record.transaction_id, "VT-TEST-1")
        }
        other => panic!("unexpected: {other:?}"),
    }
    booth.select(CandidateId(2)).unwrap();
    assert!(matches!(
        booth.submit_vote().await,
        Err(VotingError::AlreadyVoted(_))
    ));
    assert_eq!(backend.count(|c| matches!(c, Call::SubmitVote { .. })), 1);
}

#[tokio::test]
async fn missing_transaction_id_is_generated() {
    let backend = Arc::new(NullBackend::new());
    ballot(&backend);
    backend.push_submit_vote(Ok(SubmitVoteResponse {
        success: true,
        ..Default::default()
    }));
    let mut booth = VotingBooth::new(Arc::clone(&backend), logged_in());
    booth.load_candidates().await.unwrap();
    booth.select(CandidateId(1)).unwrap();

    let record = booth.submit_vote().await.unwrap();

    assert!(record.transaction_id.starts_with("VT-"));
    assert_eq!(record.transaction_id.rsplit('-').next().map(str::len), Some(9));
    assert!(record.vote_time.parse::<u64>().is_ok());
}

#[tokio::test]
async fn unsuccessful_vote_stores_nothing() {
    let backend = Arc::new(NullBackend::new());
    ballot(&backend);
    backend.push_submit_vote(Ok(SubmitVoteResponse::default()));
    let store = logged_in();
    let mut booth = VotingBooth::new(Arc::clone(&backend), store.clone());
    booth.load_candidates().await.unwrap();
    booth.select(CandidateId(1)).unwrap();

    let err = booth.submit_vote().await.unwrap_err();

    assert_eq!(err.user_message(), "Erreur lors de l'enregistrement du vote");
    assert!(!store.contains(SessionKey::VoteRecord));
    assert!(booth.check_access().is_ok());
}

#[tokio::test]
async fn backend_refusal_is_shown_verbatim() {
    let backend = Arc::new(NullBackend::new());
    ballot(&backend);
    backend.push_submit_vote(Err(ClientError::Rejected("Vous avez déjà voté".into())));
    let mut booth = VotingBooth::new(Arc::clone(&backend), logged_in());
    booth.load_candidates().await.unwrap();
    booth.select(CandidateId(1)).unwrap();

    let err = booth.submit_vote().await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Backend);
    assert_eq!(err.user_message(), "Vous avez déjà voté");
}

#[tokio::test]
async fn vote_requires_a_selection_on_the_ballot() {
    let backend = Arc::new(NullBackend::new());
    ballot(&backend);
    let mut booth = VotingBooth::new(Arc::clone(&backend), logged_in());
    booth.load_candidates().await.unwrap();

    assert!(matches!(booth.submit_vote().await, Err(VotingError::NoSelection)));
    assert!(matches!(
        booth.select(CandidateId(9)),
        Err(VotingError::UnknownCandidate(CandidateId(9)))
    ));
    assert_eq!(backend.count(|c| matches!(c, Call::SubmitVote { .. })), 0);
}

#[test]
fn anonymous_visitor_is_turned_away() {
    let backend = Arc::new(NullBackend::new());
    let booth = VotingBooth::new(backend, NullSessionStore::new());
    assert!(matches!(
        booth.check_access(),
        Err(VotingError::NotAuthenticated)
    ));

    let unauthenticated = NullSessionStore::new().with(
        SessionKey::CurrentUser,
        r#"{"voterID":"V","firstName":"A","lastName":"B","authenticated":false}"#,
    );
    let booth = VotingBooth::new(Arc::new(NullBackend::new()), unauthenticated);
    assert!(matches!(
        booth.check_access(),
        Err(VotingError::NotAuthenticated)
    ));
}

#[test]
fn bare_voted_flag_blocks_the_booth() {
    let store = logged_in().with(SessionKey::VoteRecord, r#"{"voted":true}"#);
    let booth = VotingBooth::new(Arc::new(NullBackend::new()), store);
    assert!(matches!(
        booth.check_access(),
        Err(VotingError::AlreadyVoted(None))
    ));
}

#[tokio::test]
async fn candidates_use_the_login_token_before_completion() {
    let backend = Arc::new(NullBackend::new());
    ballot(&backend);
    let store = NullSessionStore::new().with(SessionKey::SessionToken, "tok-early");
    let mut booth = VotingBooth::new(Arc::clone(&backend), store);

    let candidates = booth.load_candidates().await.unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(
        backend.calls(),
        vec![Call::Candidates {
            bearer: Some("tok-early".into())
        }]
    );
}

#[tokio::test]
async fn unreadable_ballot_is_a_transport_error() {
    let backend = Arc::new(NullBackend::new());
    backend.push_candidates(Err(ClientError::InvalidResponse("expected an array".into())));
    let mut booth = VotingBooth::new(Arc::clone(&backend), logged_in());

    let err = booth.load_candidates().await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Transport);
    assert!(booth.candidates().is_empty());
}

#[test]
fn logout_forgets_the_voter() {
    let store = logged_in();
    let mut booth = VotingBooth::new(Arc::new(NullBackend::new()), store.clone());
    let user: CurrentUser = store.get_json(SessionKey::CurrentUser).unwrap();
    assert_eq!(booth.check_access().unwrap(), user);

    booth.logout().unwrap();

    assert!(!store.contains(SessionKey::CurrentUser));
    assert!(matches!(
        booth.check_access(),
        Err(VotingError::NotAuthenticated)
    ));
}
