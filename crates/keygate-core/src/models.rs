//! Domain models for Keygate.
//!
//! These are the core types shared across all crates.

pub mod account;
pub mod session;
