//! SurrealDB implementation of [`SessionRepository`].

use chrono::{DateTime, Utc};
use keygate_core::error::KeygateResult;
use keygate_core::models::session::{CreateSession, Session};
use keygate_core::repository::SessionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SessionRow {
    account_id: String,
    token_hash: String,
    device: Option<String>,
    active: bool,
    login_at: DateTime<Utc>,
    logout_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct SessionRowWithId {
    record_id: String,
    account_id: String,
    token_hash: String,
    device: Option<String>,
    active: bool,
    login_at: DateTime<Utc>,
    logout_at: Option<DateTime<Utc>>,
}

fn row_to_session(row: SessionRow, id: Uuid) -> Result<Session, DbError> {
    let account_id = Uuid::parse_str(&row.account_id)
        .map_err(|e| DbError::Migration(format!("invalid account UUID: {e}")))?;
    Ok(Session {
        id,
        account_id,
        token_hash: row.token_hash,
        device: row.device,
        active: row.active,
        login_at: row.login_at,
        logout_at: row.logout_at,
    })
}

impl SessionRowWithId {
    fn try_into_session(self) -> Result<Session, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let account_id = Uuid::parse_str(&self.account_id)
            .map_err(|e| DbError::Migration(format!("invalid account UUID: {e}")))?;
        Ok(Session {
            id,
            account_id,
            token_hash: self.token_hash,
            device: self.device,
            active: self.active,
            login_at: self.login_at,
            logout_at: self.logout_at,
        })
    }
}

/// SurrealDB implementation of the Session repository.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> KeygateResult<Session> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('session', $id) SET \
                 account_id = $account_id, \
                 token_hash = $token_hash, \
                 device = $device, \
                 active = true, \
                 logout_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("account_id", input.account_id.to_string()))
            .bind(("token_hash", input.token_hash))
            .bind(("device", input.device))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            // A token-hash collision surfaces as a unique-index
            // violation; callers regenerate and retry.
            if e.to_string().contains("idx_session_token") {
                DbError::Duplicate {
                    entity: "session".into(),
                }
            } else {
                DbError::Surreal(e)
            }
        })?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_str,
        })?;

        row_to_session(row, id).map_err(Into::into)
    }

    async fn get_by_token_hash(&self, token_hash: &str) -> KeygateResult<Session> {
        let token_hash_owned = token_hash.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM session \
                 WHERE token_hash = $token_hash",
            )
            .bind(("token_hash", token_hash_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: format!("token_hash={token_hash_owned}"),
        })?;

        row.try_into_session().map_err(Into::into)
    }

    async fn list_active_by_account(&self, account_id: Uuid) -> KeygateResult<Vec<Session>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM session \
                 WHERE account_id = $account_id AND active = true \
                 ORDER BY login_at",
            )
            .bind(("account_id", account_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|row| row.try_into_session().map_err(Into::into))
            .collect()
    }

    async fn deactivate(&self, token_hash: &str, logout_at: DateTime<Utc>) -> KeygateResult<()> {
        self.db
            .query(
                "UPDATE session SET active = false, logout_at = $logout_at \
                 WHERE token_hash = $token_hash",
            )
            .bind(("token_hash", token_hash.to_string()))
            .bind(("logout_at", logout_at))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }
}
