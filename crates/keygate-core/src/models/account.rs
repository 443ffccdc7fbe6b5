//! Account domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    /// Unique within the whole store; enforced at write time.
    pub username: String,
    pub full_name: String,
    /// Argon2id PHC-format hash. The raw password is never stored.
    pub password_hash: String,
    /// Free-form avatar reference (URL or data URI).
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    pub username: String,
    pub full_name: String,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAccount {
    pub username: Option<String>,
    pub full_name: Option<String>,
    /// Raw replacement password; re-hashed before storage.
    pub password: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub image: Option<Option<String>>,
}
