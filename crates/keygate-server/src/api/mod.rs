//! HTTP API — routes, handlers, and wire DTOs.

pub mod dto;
pub mod handlers;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the API router. CORS is layered separately so tests can
/// drive the bare router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/users/health", get(handlers::health))
        .route("/api/users", get(handlers::list_accounts))
        .route("/api/users/signup", post(handlers::sign_up))
        .route("/api/users/login", post(handlers::login))
        .route("/api/users/logout", post(handlers::logout))
        .route("/api/users/validate-token", post(handlers::validate_token))
        .route(
            "/api/users/username/{username}",
            get(handlers::get_account_by_username),
        )
        .route(
            "/api/users/sessions/{user_id}",
            get(handlers::list_sessions),
        )
        .route(
            "/api/users/{id}",
            get(handlers::get_account)
                .put(handlers::update_account)
                .delete(handlers::delete_account),
        )
        .with_state(state)
}

/// Cross-origin access from a fixed, explicit allow-list of origins,
/// with credentials. Origins that fail to parse are skipped.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
