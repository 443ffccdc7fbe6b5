//! Keygate Core — domain models, shared error types, and repository
//! trait definitions.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{KeygateError, KeygateResult};
