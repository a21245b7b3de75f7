//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! Every external dependency of the flows (backend, camera, session storage)
//! sits behind a trait. This crate provides test-friendly implementations that:
//! - Return scripted, deterministic values
//! - Record every call for assertions
//! - Never touch the filesystem, the network or a real camera
//!
//! Usage: swap real implementations for nullables in tests.

pub mod backend;
pub mod camera;
pub mod store;

pub use backend::{Call, NullBackend};
pub use camera::NullCamera;
pub use store::NullSessionStore;
