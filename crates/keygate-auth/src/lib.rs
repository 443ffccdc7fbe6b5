//! Keygate Auth — password authentication, opaque bearer-token
//! issuance, and the session lifecycle manager.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{LoginInput, SessionService, SignUpInput, SignedInSession};
