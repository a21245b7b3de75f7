//! Session store: a small key-value cache for transient identifiers.
//!
//! Holds the session token, phone numbers, electeur id, the current user and
//! the vote record while a flow moves from step to step, and across process
//! runs when backed by a file. It is a cache, not a durable store: losing it
//! only forces the user to restart the flow.

pub mod error;
pub mod file;
pub mod key;
pub mod store;

pub use error::SessionError;
pub use file::FileSessionStore;
pub use key::SessionKey;
pub use store::SessionStore;
