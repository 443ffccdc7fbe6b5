//! Authentication error types.

use keygate_core::error::KeygateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for KeygateError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::TokenInvalid(_) => {
                KeygateError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::Crypto(msg) => KeygateError::Crypto(msg),
        }
    }
}
