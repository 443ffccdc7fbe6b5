//! Keygate Server — application entry point.

use keygate_auth::config::AuthConfig;
use keygate_db::DbManager;
use keygate_server::{AppState, ServerConfig, api};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("keygate=info".parse()?),
        )
        .json()
        .init();

    let config = ServerConfig::from_env()?;

    let manager = DbManager::connect(&config.db).await?;
    keygate_db::run_migrations(manager.client()).await?;

    let state = AppState::new(
        manager.client().clone(),
        AuthConfig {
            pepper: config.pepper.clone(),
            ..Default::default()
        },
    );

    let app = api::router(state).layer(api::cors_layer(&config.allowed_origins));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Keygate server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
