//! Opaque bearer-token generation and digestion.
//!
//! A token is the sole credential proving a client holds an active
//! session, so generation must come from a cryptographically secure
//! random source. Only the SHA-256 digest of a token is ever stored.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

/// Raw entropy per token before encoding.
const TOKEN_BYTES: usize = 48;

/// Generate a cryptographically random opaque bearer token
/// (48 bytes → base64url-encoded, no padding, 64 chars).
pub fn generate_session_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; TOKEN_BYTES] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 hash of a raw bearer token, hex-encoded.
///
/// This is the value stored in the database as `session.token_hash`.
pub fn hash_session_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
