//! Shared application state.

use std::sync::Arc;

use keygate_auth::config::AuthConfig;
use keygate_auth::service::SessionService;
use keygate_db::repository::{SurrealAccountRepository, SurrealSessionRepository};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

/// State handed to every request handler. Repositories are cheap
/// clones over the shared connection; the lifecycle service is built
/// once with explicit dependencies.
#[derive(Clone)]
pub struct AppState {
    pub service:
        Arc<SessionService<SurrealAccountRepository<Any>, SurrealSessionRepository<Any>>>,
    pub accounts: SurrealAccountRepository<Any>,
}

impl AppState {
    pub fn new(db: Surreal<Any>, config: AuthConfig) -> Self {
        let accounts = match &config.pepper {
            Some(pepper) => SurrealAccountRepository::with_pepper(db.clone(), pepper.clone()),
            None => SurrealAccountRepository::new(db.clone()),
        };
        let sessions = SurrealSessionRepository::new(db);
        let service = Arc::new(SessionService::new(accounts.clone(), sessions, config));

        Self { service, accounts }
    }
}
