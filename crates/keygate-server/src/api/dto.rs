//! Wire DTOs. Field names are camelCase for compatibility with the
//! existing clients of this API.
//!
//! Request DTOs deserialize every field as optional so that missing
//! and blank fields both surface as a 400 validation error instead of
//! a body-rejection status.

use chrono::{DateTime, Utc};
use keygate_core::models::account::Account;
use keygate_core::models::session::Session;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub image: Option<String>,
    pub device: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub device: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
    /// `null` and absent are both "no change"; clients clear the
    /// avatar by sending an empty string.
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub token: Option<String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Public account representation — never carries the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            full_name: account.full_name,
            image: account.image,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    #[serde(flatten)]
    pub account: AccountResponse,
    pub token: String,
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(flatten)]
    pub account: AccountResponse,
    pub token: String,
    pub session_id: Uuid,
    pub login_time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateTokenResponse {
    pub valid: bool,
    #[serde(flatten)]
    pub account: Option<AccountResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
}

impl ValidateTokenResponse {
    pub fn invalid() -> Self {
        Self {
            valid: false,
            account: None,
            session_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub device: Option<String>,
    pub active: bool,
    pub login_at: DateTime<Utc>,
    pub logout_at: Option<DateTime<Utc>>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            account_id: session.account_id,
            device: session.device,
            active: session.active,
            login_at: session.login_at,
            logout_at: session.logout_at,
        }
    }
}
