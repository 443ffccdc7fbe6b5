//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups that fail because a
//! record is absent return [`KeygateError::NotFound`]; adapter-level
//! failures surface as [`KeygateError::Database`].
//!
//! [`KeygateError::NotFound`]: crate::error::KeygateError::NotFound
//! [`KeygateError::Database`]: crate::error::KeygateError::Database

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::KeygateResult;
use crate::models::account::{Account, CreateAccount, UpdateAccount};
use crate::models::session::{CreateSession, Session};

pub trait AccountRepository: Send + Sync {
    /// Persist a new account. The raw password in the input is hashed
    /// by the implementation; duplicate usernames are rejected as
    /// `AlreadyExists`.
    fn create(&self, input: CreateAccount) -> impl Future<Output = KeygateResult<Account>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = KeygateResult<Account>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = KeygateResult<Account>> + Send;
    fn username_exists(&self, username: &str) -> impl Future<Output = KeygateResult<bool>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateAccount,
    ) -> impl Future<Output = KeygateResult<Account>> + Send;
    /// Hard delete. Sessions referencing the account are left in place.
    fn delete(&self, id: Uuid) -> impl Future<Output = KeygateResult<()>> + Send;
    fn list(&self) -> impl Future<Output = KeygateResult<Vec<Account>>> + Send;
}

pub trait SessionRepository: Send + Sync {
    /// Persist a new session in the Active state. A duplicate token
    /// hash is rejected as `AlreadyExists` by the store's unique index.
    fn create(&self, input: CreateSession) -> impl Future<Output = KeygateResult<Session>> + Send;
    fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = KeygateResult<Session>> + Send;
    fn list_active_by_account(
        &self,
        account_id: Uuid,
    ) -> impl Future<Output = KeygateResult<Vec<Session>>> + Send;
    /// Flip the session matching `token_hash` to inactive and stamp
    /// `logout_at`. Absence detection is the caller's responsibility.
    fn deactivate(
        &self,
        token_hash: &str,
        logout_at: DateTime<Utc>,
    ) -> impl Future<Output = KeygateResult<()>> + Send;
}
