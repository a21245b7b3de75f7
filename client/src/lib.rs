//! Client side of the VoteSecure backend contract.
//!
//! Design:
//! - Every endpoint the front-end consumes is one async method on [`Backend`]
//! - [`ApiClient`] implements it over HTTP/JSON with `reqwest`
//! - A JSON body carrying an `error` string is a backend rejection and surfaces
//!   as [`ClientError::Rejected`] with the backend's message verbatim
//! - Anything that prevents reading a well-formed answer is a transport-class error
//! - Flows depend on the trait, so tests swap in a scripted backend

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod recognition;

pub use api::ApiClient;
pub use backend::Backend;
pub use config::ClientConfig;
pub use error::ClientError;
pub use recognition::Recognition;
