//! SurrealDB implementation of [`AccountRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use keygate_core::error::KeygateResult;
use keygate_core::models::account::{Account, CreateAccount, UpdateAccount};
use keygate_core::repository::AccountRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AccountRow {
    username: String,
    full_name: String,
    password_hash: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AccountRowWithId {
    record_id: String,
    username: String,
    full_name: String,
    password_hash: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self, id: Uuid) -> Account {
        Account {
            id,
            username: self.username,
            full_name: self.full_name,
            password_hash: self.password_hash,
            image: self.image,
            created_at: self.created_at,
        }
    }
}

impl AccountRowWithId {
    fn try_into_account(self) -> Result<Account, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Account {
            id,
            username: self.username,
            full_name: self.full_name,
            password_hash: self.password_hash,
            image: self.image,
            created_at: self.created_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Migration(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Migration(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Classify a write failure: a violation of the named unique index
/// becomes [`DbError::Duplicate`], anything else stays a raw error.
fn map_write_error(e: surrealdb::Error, entity: &str, index: &str) -> DbError {
    if e.to_string().contains(index) {
        DbError::Duplicate {
            entity: entity.into(),
        }
    } else {
        DbError::Surreal(e)
    }
}

/// SurrealDB implementation of the Account repository.
#[derive(Clone)]
pub struct SurrealAccountRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealAccountRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }
}

impl<C: Connection> AccountRepository for SurrealAccountRepository<C> {
    async fn create(&self, input: CreateAccount) -> KeygateResult<Account> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;

        let result = self
            .db
            .query(
                "CREATE type::record('account', $id) SET \
                 username = $username, \
                 full_name = $full_name, \
                 password_hash = $password_hash, \
                 image = $image",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("full_name", input.full_name))
            .bind(("password_hash", password_hash))
            .bind(("image", input.image))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| map_write_error(e, "account", "idx_account_username"))?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id))
    }

    async fn get_by_id(&self, id: Uuid) -> KeygateResult<Account> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('account', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id))
    }

    async fn get_by_username(&self, username: &str) -> KeygateResult<Account> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM account \
                 WHERE username = $username",
            )
            .bind(("username", username.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: format!("username={username}"),
        })?;

        Ok(row.try_into_account()?)
    }

    async fn username_exists(&self, username: &str) -> KeygateResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM account \
                 WHERE username = $username GROUP ALL",
            )
            .bind(("username", username.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    async fn update(&self, id: Uuid, input: UpdateAccount) -> KeygateResult<Account> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.username.is_some() {
            sets.push("username = $username");
        }
        if input.full_name.is_some() {
            sets.push("full_name = $full_name");
        }
        if input.password.is_some() {
            sets.push("password_hash = $password_hash");
        }
        if input.image.is_some() {
            sets.push("image = $image");
        }

        if sets.is_empty() {
            // Nothing to change; return the current record.
            return self.get_by_id(id).await;
        }

        let password_hash = input
            .password
            .as_deref()
            .map(|p| hash_password(p, self.pepper.as_deref()))
            .transpose()?;

        let sql = format!(
            "UPDATE type::record('account', $id) SET {}",
            sets.join(", ")
        );

        let mut query = self.db.query(sql).bind(("id", id_str.clone()));
        if let Some(username) = input.username {
            query = query.bind(("username", username));
        }
        if let Some(full_name) = input.full_name {
            query = query.bind(("full_name", full_name));
        }
        if let Some(password_hash) = password_hash {
            query = query.bind(("password_hash", password_hash));
        }
        if let Some(image) = input.image {
            query = query.bind(("image", image));
        }

        let result = query.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| map_write_error(e, "account", "idx_account_username"))?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id))
    }

    async fn delete(&self, id: Uuid) -> KeygateResult<()> {
        // Hard delete; sessions referencing the account are left alone.
        // Resolve first so absence is reported as NotFound.
        self.get_by_id(id).await?;

        self.db
            .query("DELETE type::record('account', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self) -> KeygateResult<Vec<Account>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM account ORDER BY created_at")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|row| row.try_into_account().map_err(Into::into))
            .collect()
    }
}
