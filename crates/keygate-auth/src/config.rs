//! Authentication configuration.

/// Configuration for the session lifecycle service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Optional pepper prepended to passwords before Argon2id
    /// verification. Must match the pepper used during hashing.
    pub pepper: Option<String>,
    /// How many times session creation regenerates the token after a
    /// store-level token collision before giving up (default: 3).
    pub token_create_retries: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            token_create_retries: 3,
        }
    }
}
