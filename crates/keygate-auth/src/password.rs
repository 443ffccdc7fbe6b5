//! Credential verification.
//!
//! The stored credential is an Argon2id PHC string produced by the
//! account store at write time. Verification sits behind this seam so
//! the session lifecycle never sees the storage format — swapping the
//! hash scheme stays contained here and in the store.

use argon2::{Argon2, PasswordVerifier};

use crate::error::AuthError;

/// Check a supplied password against a stored Argon2id PHC hash.
///
/// When the deployment uses a pepper it is prepended to the password
/// before verification, matching what the account store did when
/// hashing. `Ok(false)` is a clean mismatch; a stored hash that does
/// not parse as PHC is reported as [`AuthError::Crypto`].
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let parsed = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("stored hash is not valid PHC: {e}")))?;

    let candidate = match pepper {
        Some(p) => format!("{p}{password}"),
        None => password.to_string(),
    };

    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verification failed: {e}"))),
    }
}
