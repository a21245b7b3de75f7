//! Fundamental types for the VoteSecure client.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! backend identifiers, the JSON payloads exchanged with the VoteSecure backend,
//! the records cached in the session store, and results projections.

pub mod ids;
pub mod records;
pub mod results;
pub mod step;
pub mod time;
pub mod wire;

pub use ids::{CandidateId, ElecteurId, SessionToken};
pub use records::{CurrentUser, RegistrationData, VoteRecord};
pub use results::{CandidateSummary, HourlyVotes, ResultEntry, ResultsSnapshot};
pub use step::NextStep;
pub use time::Timestamp;
