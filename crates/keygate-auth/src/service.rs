//! Session lifecycle service — signup, login, token validation, and
//! logout orchestration.

use chrono::Utc;
use keygate_core::error::{KeygateError, KeygateResult};
use keygate_core::models::account::{Account, CreateAccount};
use keygate_core::models::session::{CreateSession, Session};
use keygate_core::repository::{AccountRepository, SessionRepository};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the signup flow.
#[derive(Debug)]
pub struct SignUpInput {
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub image: Option<String>,
    pub device: Option<String>,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
    pub device: Option<String>,
}

/// A freshly established session, as returned by signup and login.
#[derive(Debug)]
pub struct SignedInSession {
    pub account: Account,
    pub session: Session,
    /// Raw opaque bearer token (returned to the client, not stored).
    pub token: String,
}

/// Session lifecycle service.
///
/// Generic over repository implementations so that the lifecycle
/// layer has no dependency on the database crate. Dependencies are
/// passed explicitly at construction — no ambient singletons.
pub struct SessionService<A: AccountRepository, S: SessionRepository> {
    accounts: A,
    sessions: S,
    config: AuthConfig,
}

impl<A: AccountRepository, S: SessionRepository> SessionService<A, S> {
    pub fn new(accounts: A, sessions: S, config: AuthConfig) -> Self {
        Self {
            accounts,
            sessions,
            config,
        }
    }

    /// Register a new account and immediately log it in.
    ///
    /// Username, password, and full name must be present and
    /// non-blank; the username must be unused. The uniqueness
    /// pre-check gives the friendly conflict error, and the store's
    /// unique index closes the race between concurrent signups.
    pub async fn sign_up(&self, input: SignUpInput) -> KeygateResult<SignedInSession> {
        require_non_blank("username", &input.username)?;
        require_non_blank("password", &input.password)?;
        require_non_blank("fullName", &input.full_name)?;

        if self.accounts.username_exists(&input.username).await? {
            return Err(KeygateError::AlreadyExists {
                entity: "account".into(),
            });
        }

        let account = self
            .accounts
            .create(CreateAccount {
                username: input.username,
                full_name: input.full_name,
                password: input.password,
                image: input.image,
            })
            .await?;

        tracing::info!(account_id = %account.id, "account created");

        let (session, token) = self
            .create_session_for_login(account.id, input.device)
            .await?;

        Ok(SignedInSession {
            account,
            session,
            token,
        })
    }

    /// Authenticate a user with username + password and establish a
    /// session.
    ///
    /// An unknown username and a wrong password fail identically, so
    /// the result carries no username-enumeration signal.
    pub async fn login(&self, input: LoginInput) -> KeygateResult<SignedInSession> {
        let account = self
            .accounts
            .get_by_username(&input.username)
            .await
            .map_err(|e| match e {
                KeygateError::NotFound { .. } => AuthError::InvalidCredentials.into(),
                other => other,
            })?;

        let valid = password::verify_password(
            &input.password,
            &account.password_hash,
            self.config.pepper.as_deref(),
        )
        .map_err(|e| KeygateError::Crypto(e.to_string()))?;

        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        let (session, token) = self
            .create_session_for_login(account.id, input.device)
            .await?;

        Ok(SignedInSession {
            account,
            session,
            token,
        })
    }

    /// Generate a token and persist a new Active session for the
    /// account. On a store-level token collision the token is
    /// regenerated and the insert retried a bounded number of times.
    pub async fn create_session_for_login(
        &self,
        account_id: Uuid,
        device: Option<String>,
    ) -> KeygateResult<(Session, String)> {
        let mut attempts = 0;
        loop {
            let raw_token = token::generate_session_token();
            let token_hash = token::hash_session_token(&raw_token);

            match self
                .sessions
                .create(CreateSession {
                    account_id,
                    token_hash,
                    device: device.clone(),
                })
                .await
            {
                Ok(session) => return Ok((session, raw_token)),
                Err(KeygateError::AlreadyExists { .. })
                    if attempts < self.config.token_create_retries =>
                {
                    attempts += 1;
                    tracing::warn!(account_id = %account_id, attempts, "token collision, regenerating");
                }
                Err(KeygateError::AlreadyExists { .. }) => {
                    return Err(KeygateError::Internal(
                        "token collision retries exhausted".into(),
                    ));
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// Resolve a bearer token to its owning account and session.
    ///
    /// Unknown tokens, deactivated sessions, and sessions whose
    /// account has been deleted are all reported as the same invalid
    /// outcome.
    pub async fn validate(&self, raw_token: &str) -> KeygateResult<(Account, Session)> {
        let token_hash = token::hash_session_token(raw_token);

        let session = self
            .sessions
            .get_by_token_hash(&token_hash)
            .await
            .map_err(|e| match e {
                KeygateError::NotFound { .. } => {
                    AuthError::TokenInvalid("unknown token".into()).into()
                }
                other => other,
            })?;

        if !session.active {
            return Err(AuthError::TokenInvalid("session is inactive".into()).into());
        }

        let account = self
            .accounts
            .get_by_id(session.account_id)
            .await
            .map_err(|e| match e {
                // The owning account was deleted out from under the
                // session; to the caller this token is simply invalid.
                KeygateError::NotFound { .. } => {
                    AuthError::TokenInvalid("owning account not found".into()).into()
                }
                other => other,
            })?;

        Ok((account, session))
    }

    /// Deactivate the session matching a bearer token.
    ///
    /// Unknown tokens are NotFound. A second logout of an already
    /// inactive session is a no-op success — the original logout
    /// timestamp is preserved.
    pub async fn logout(&self, raw_token: &str) -> KeygateResult<()> {
        let token_hash = token::hash_session_token(raw_token);

        let session = self.sessions.get_by_token_hash(&token_hash).await?;

        if !session.active {
            return Ok(());
        }

        self.sessions.deactivate(&token_hash, Utc::now()).await?;
        tracing::info!(session_id = %session.id, "session deactivated");

        Ok(())
    }

    /// List the account's currently active sessions. Pure read.
    pub async fn list_active_sessions(&self, account_id: Uuid) -> KeygateResult<Vec<Session>> {
        self.sessions.list_active_by_account(account_id).await
    }
}

fn require_non_blank(field: &str, value: &str) -> KeygateResult<()> {
    if value.trim().is_empty() {
        return Err(KeygateError::Validation {
            message: format!("{field} must not be blank"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use keygate_core::models::account::UpdateAccount;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Account store for tests that exercise session creation only.
    struct UnusedAccounts;

    impl AccountRepository for UnusedAccounts {
        async fn create(&self, _input: CreateAccount) -> KeygateResult<Account> {
            unreachable!()
        }
        async fn get_by_id(&self, _id: Uuid) -> KeygateResult<Account> {
            unreachable!()
        }
        async fn get_by_username(&self, _username: &str) -> KeygateResult<Account> {
            unreachable!()
        }
        async fn username_exists(&self, _username: &str) -> KeygateResult<bool> {
            unreachable!()
        }
        async fn update(&self, _id: Uuid, _input: UpdateAccount) -> KeygateResult<Account> {
            unreachable!()
        }
        async fn delete(&self, _id: Uuid) -> KeygateResult<()> {
            unreachable!()
        }
        async fn list(&self) -> KeygateResult<Vec<Account>> {
            unreachable!()
        }
    }

    /// Session store that rejects the first `collisions` inserts as
    /// duplicate token hashes, then accepts. Records every hash it was
    /// asked to insert.
    struct CollidingSessions {
        collisions: AtomicU32,
        seen_hashes: Mutex<Vec<String>>,
    }

    impl CollidingSessions {
        fn rejecting_first(collisions: u32) -> Self {
            Self {
                collisions: AtomicU32::new(collisions),
                seen_hashes: Mutex::new(Vec::new()),
            }
        }
    }

    impl SessionRepository for CollidingSessions {
        async fn create(&self, input: CreateSession) -> KeygateResult<Session> {
            self.seen_hashes
                .lock()
                .unwrap()
                .push(input.token_hash.clone());

            let remaining = self.collisions.load(Ordering::SeqCst);
            if remaining > 0 {
                self.collisions.store(remaining - 1, Ordering::SeqCst);
                return Err(KeygateError::AlreadyExists {
                    entity: "session".into(),
                });
            }

            Ok(Session {
                id: Uuid::new_v4(),
                account_id: input.account_id,
                token_hash: input.token_hash,
                device: input.device,
                active: true,
                login_at: Utc::now(),
                logout_at: None,
            })
        }

        async fn get_by_token_hash(&self, token_hash: &str) -> KeygateResult<Session> {
            Err(KeygateError::NotFound {
                entity: "session".into(),
                id: token_hash.into(),
            })
        }

        async fn list_active_by_account(&self, _account_id: Uuid) -> KeygateResult<Vec<Session>> {
            Ok(Vec::new())
        }

        async fn deactivate(
            &self,
            _token_hash: &str,
            _logout_at: DateTime<Utc>,
        ) -> KeygateResult<()> {
            Ok(())
        }
    }

    fn service(sessions: CollidingSessions) -> SessionService<UnusedAccounts, CollidingSessions> {
        SessionService::new(UnusedAccounts, sessions, AuthConfig::default())
    }

    #[tokio::test]
    async fn token_collision_regenerates_and_succeeds() {
        let svc = service(CollidingSessions::rejecting_first(1));

        let (session, raw_token) = svc
            .create_session_for_login(Uuid::new_v4(), Some("phone".into()))
            .await
            .unwrap();

        assert!(session.active);
        assert_eq!(session.token_hash, token::hash_session_token(&raw_token));

        // The colliding token was discarded and a fresh one generated.
        let seen = svc.sessions.seen_hashes.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_ne!(seen[0], seen[1]);
        assert_eq!(seen[1], session.token_hash);
    }

    #[tokio::test]
    async fn token_collision_retries_are_bounded() {
        let svc = service(CollidingSessions::rejecting_first(u32::MAX));

        let err = svc
            .create_session_for_login(Uuid::new_v4(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, KeygateError::Internal(_)));

        // One initial attempt plus the configured number of retries.
        let attempts = svc.sessions.seen_hashes.lock().unwrap().len() as u32;
        assert_eq!(attempts, AuthConfig::default().token_create_retries + 1);
    }

    #[tokio::test]
    async fn non_collision_store_errors_are_not_retried() {
        struct FailingSessions {
            calls: AtomicU32,
        }

        impl SessionRepository for FailingSessions {
            async fn create(&self, _input: CreateSession) -> KeygateResult<Session> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Err(KeygateError::Database("connection reset".into()))
            }
            async fn get_by_token_hash(&self, token_hash: &str) -> KeygateResult<Session> {
                Err(KeygateError::NotFound {
                    entity: "session".into(),
                    id: token_hash.into(),
                })
            }
            async fn list_active_by_account(
                &self,
                _account_id: Uuid,
            ) -> KeygateResult<Vec<Session>> {
                Ok(Vec::new())
            }
            async fn deactivate(
                &self,
                _token_hash: &str,
                _logout_at: DateTime<Utc>,
            ) -> KeygateResult<()> {
                Ok(())
            }
        }

        let sessions = FailingSessions {
            calls: AtomicU32::new(0),
        };
        let svc = SessionService::new(UnusedAccounts, sessions, AuthConfig::default());

        let err = svc
            .create_session_for_login(Uuid::new_v4(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, KeygateError::Database(_)));
        assert_eq!(svc.sessions.calls.load(Ordering::SeqCst), 1);
    }
}
