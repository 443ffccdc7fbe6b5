//! Session domain model.
//!
//! A session is a dependent record referencing an account by id — the
//! account's lifetime is independent, and deleting an account does not
//! cascade into its sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub account_id: Uuid,
    /// SHA-256 hex digest of the raw bearer token. Raw tokens are
    /// returned to the client once and never persisted.
    pub token_hash: String,
    /// Advisory device/origin descriptor supplied by the client.
    pub device: Option<String>,
    /// Transitions true -> false exactly once; never back.
    pub active: bool,
    pub login_at: DateTime<Utc>,
    /// Non-null iff `active` is false.
    pub logout_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub account_id: Uuid,
    pub token_hash: String,
    pub device: Option<String>,
}
