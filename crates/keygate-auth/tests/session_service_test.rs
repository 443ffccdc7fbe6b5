//! Integration tests for the session lifecycle service.

use keygate_auth::config::AuthConfig;
use keygate_auth::service::{LoginInput, SessionService, SignUpInput};
use keygate_auth::token;
use keygate_core::error::KeygateError;
use keygate_core::repository::{AccountRepository, SessionRepository};
use keygate_db::repository::{SurrealAccountRepository, SurrealSessionRepository};
use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};

type Service = SessionService<SurrealAccountRepository<Any>, SurrealSessionRepository<Any>>;

/// Spin up an in-memory DB, run migrations, and build the service.
/// Repository handles are returned alongside for direct assertions.
async fn setup() -> (
    Service,
    SurrealAccountRepository<Any>,
    SurrealSessionRepository<Any>,
    Surreal<Any>,
) {
    let db = any::connect("mem://").await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    keygate_db::run_migrations(&db).await.unwrap();

    let accounts = SurrealAccountRepository::new(db.clone());
    let sessions = SurrealSessionRepository::new(db.clone());
    let service = SessionService::new(accounts.clone(), sessions.clone(), AuthConfig::default());

    (service, accounts, sessions, db)
}

fn signup_input(username: &str) -> SignUpInput {
    SignUpInput {
        username: username.into(),
        full_name: "Alice A".into(),
        password: "correct-horse-battery".into(),
        image: None,
        device: Some("test-device".into()),
    }
}

#[tokio::test]
async fn signup_token_validates_immediately() {
    let (service, _, _, _db) = setup().await;

    let signed_in = service.sign_up(signup_input("alice")).await.unwrap();
    assert!(!signed_in.token.is_empty());
    assert!(signed_in.session.active);
    assert!(signed_in.session.logout_at.is_none());

    let (account, session) = service.validate(&signed_in.token).await.unwrap();
    assert_eq!(account.id, signed_in.account.id);
    assert_eq!(session.id, signed_in.session.id);
}

#[tokio::test]
async fn signup_duplicate_username_conflicts() {
    let (service, accounts, _, _db) = setup().await;

    let first = service.sign_up(signup_input("alice")).await.unwrap();

    let mut second = signup_input("alice");
    second.full_name = "Impostor".into();
    let err = service.sign_up(second).await.unwrap_err();
    assert!(matches!(err, KeygateError::AlreadyExists { .. }));

    // First account remains unchanged.
    let stored = accounts.get_by_id(first.account.id).await.unwrap();
    assert_eq!(stored.full_name, "Alice A");
}

#[tokio::test]
async fn signup_rejects_blank_fields() {
    let (service, _, _, _db) = setup().await;

    for input in [
        SignUpInput {
            username: "  ".into(),
            ..signup_input("x")
        },
        SignUpInput {
            password: "".into(),
            ..signup_input("bob")
        },
        SignUpInput {
            full_name: "\t".into(),
            ..signup_input("carol")
        },
    ] {
        let err = service.sign_up(input).await.unwrap_err();
        assert!(matches!(err, KeygateError::Validation { .. }), "{err:?}");
    }
}

#[tokio::test]
async fn login_happy_path_issues_fresh_token() {
    let (service, _, _, _db) = setup().await;

    let signed_up = service.sign_up(signup_input("alice")).await.unwrap();

    let logged_in = service
        .login(LoginInput {
            username: "alice".into(),
            password: "correct-horse-battery".into(),
            device: Some("phone".into()),
        })
        .await
        .unwrap();

    assert_eq!(logged_in.account.id, signed_up.account.id);
    assert_ne!(logged_in.token, signed_up.token);
    assert_ne!(logged_in.session.id, signed_up.session.id);
}

#[tokio::test]
async fn login_failures_are_uniform() {
    let (service, _, _, _db) = setup().await;
    service.sign_up(signup_input("alice")).await.unwrap();

    let wrong_password = service
        .login(LoginInput {
            username: "alice".into(),
            password: "wrong".into(),
            device: None,
        })
        .await
        .unwrap_err();

    let unknown_user = service
        .login(LoginInput {
            username: "nobody".into(),
            password: "irrelevant".into(),
            device: None,
        })
        .await
        .unwrap_err();

    // No distinguishing signal between the two failure modes.
    assert!(matches!(
        wrong_password,
        KeygateError::AuthenticationFailed { .. }
    ));
    assert!(matches!(
        unknown_user,
        KeygateError::AuthenticationFailed { .. }
    ));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn validate_rejects_unknown_and_logged_out_tokens() {
    let (service, _, _, _db) = setup().await;
    let signed_in = service.sign_up(signup_input("alice")).await.unwrap();

    let err = service
        .validate(&token::generate_session_token())
        .await
        .unwrap_err();
    assert!(matches!(err, KeygateError::AuthenticationFailed { .. }));

    service.logout(&signed_in.token).await.unwrap();

    let err = service.validate(&signed_in.token).await.unwrap_err();
    assert!(matches!(err, KeygateError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn logout_unknown_token_is_not_found() {
    let (service, _, _, _db) = setup().await;

    let err = service
        .logout(&token::generate_session_token())
        .await
        .unwrap_err();
    assert!(matches!(err, KeygateError::NotFound { .. }));
}

#[tokio::test]
async fn double_logout_is_noop_success() {
    let (service, _, sessions, _db) = setup().await;
    let signed_in = service.sign_up(signup_input("alice")).await.unwrap();
    let token_hash = token::hash_session_token(&signed_in.token);

    service.logout(&signed_in.token).await.unwrap();
    let after_first = sessions.get_by_token_hash(&token_hash).await.unwrap();
    assert!(!after_first.active);
    let first_logout_at = after_first.logout_at.unwrap();

    // Second logout succeeds without touching the record.
    service.logout(&signed_in.token).await.unwrap();
    let after_second = sessions.get_by_token_hash(&token_hash).await.unwrap();
    assert!(!after_second.active);
    assert_eq!(after_second.logout_at.unwrap(), first_logout_at);
}

#[tokio::test]
async fn orphaned_session_fails_validation() {
    let (service, accounts, sessions, _db) = setup().await;
    let signed_in = service.sign_up(signup_input("alice")).await.unwrap();

    // Deleting the account leaves the session behind.
    accounts.delete(signed_in.account.id).await.unwrap();
    let orphan = sessions
        .get_by_token_hash(&token::hash_session_token(&signed_in.token))
        .await
        .unwrap();
    assert!(orphan.active);

    // The token no longer validates, and nothing panics.
    let err = service.validate(&signed_in.token).await.unwrap_err();
    assert!(matches!(err, KeygateError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn list_active_sessions_excludes_logged_out() {
    let (service, _, _, _db) = setup().await;
    let signed_up = service.sign_up(signup_input("alice")).await.unwrap();
    let account_id = signed_up.account.id;

    let logged_in = service
        .login(LoginInput {
            username: "alice".into(),
            password: "correct-horse-battery".into(),
            device: Some("phone".into()),
        })
        .await
        .unwrap();

    let active = service.list_active_sessions(account_id).await.unwrap();
    assert_eq!(active.len(), 2);

    service.logout(&logged_in.token).await.unwrap();

    let active = service.list_active_sessions(account_id).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, signed_up.session.id);
}
