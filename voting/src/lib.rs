//! Everything after login: the ballot, the vote and the results.
//!
//! - [`VotingBooth`] gates access on the stored `currentUser`, loads the
//!   candidates, submits the vote and keeps the `voteRecord`
//! - [`ResultsBoard`] reads standings and hourly turnout
//! - [`LiveResults`] refreshes both on an interval, keeping the last good snapshot

pub mod booth;
pub mod error;
pub mod results;

pub use booth::{fallback_transaction_id, VotingBooth};
pub use error::VotingError;
pub use results::{LiveResults, LiveState, ResultsBoard};

use votesecure_session::{SessionKey, SessionStore};
use votesecure_types::SessionToken;

/// Bearer credential for ballot endpoints: the token confirmed by
/// complete-login, else the login session token.
pub fn bearer<S: SessionStore + ?Sized>(store: &S) -> Option<SessionToken> {
    [SessionKey::AuthBearerToken, SessionKey::SessionToken]
        .into_iter()
        .filter_map(|key| store.get(key))
        .find(|token| !token.is_empty())
        .map(SessionToken::new)
}
