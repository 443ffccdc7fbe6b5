//! Keygate Server — axum HTTP API over the session lifecycle service.

pub mod api;
pub mod config;
pub mod error;
pub mod state;

pub use config::ServerConfig;
pub use state::AppState;
