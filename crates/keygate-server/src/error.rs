//! Mapping from domain errors to HTTP responses.
//!
//! All domain errors become a structured `{error: string}` JSON body.
//! Unexpected adapter failures are logged server-side and surface as
//! a generic 500 without internal detail.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use keygate_core::error::KeygateError;
use serde_json::json;

pub struct ApiError(KeygateError);

impl From<KeygateError> for ApiError {
    fn from(err: KeygateError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            KeygateError::Validation { .. } => (StatusCode::BAD_REQUEST, self.0.to_string()),
            KeygateError::AlreadyExists { .. } => (StatusCode::CONFLICT, self.0.to_string()),
            KeygateError::NotFound { .. } => (StatusCode::NOT_FOUND, self.0.to_string()),
            KeygateError::AuthenticationFailed { .. } => {
                (StatusCode::UNAUTHORIZED, self.0.to_string())
            }
            KeygateError::Database(_) | KeygateError::Crypto(_) | KeygateError::Internal(_) => {
                tracing::error!(error = %self.0, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
