//! Request handlers for the user/session API.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use keygate_auth::service::{LoginInput, SignUpInput};
use keygate_core::error::{KeygateError, KeygateResult};
use keygate_core::models::account::UpdateAccount;
use keygate_core::repository::AccountRepository;
use uuid::Uuid;

use super::dto::{
    AccountResponse, LoginRequest, LoginResponse, MessageResponse, SessionResponse,
    SignUpRequest, SignUpResponse, TokenRequest, UpdateAccountRequest, ValidateTokenResponse,
};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn health() -> &'static str {
    "API is running"
}

pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let accounts = state.accounts.list().await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.accounts.get_by_id(id).await?;
    Ok(Json(account.into()))
}

pub async fn get_account_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.accounts.get_by_username(&username).await?;
    Ok(Json(account.into()))
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), ApiError> {
    let signed_in = state
        .service
        .sign_up(SignUpInput {
            username: req.username.unwrap_or_default(),
            full_name: req.full_name.unwrap_or_default(),
            password: req.password.unwrap_or_default(),
            image: req.image,
            device: req.device,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            account: signed_in.account.into(),
            token: signed_in.token,
            session_id: signed_in.session.id,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    require_present("username", req.username.as_deref())?;
    require_present("password", req.password.as_deref())?;

    let signed_in = state
        .service
        .login(LoginInput {
            username: req.username.unwrap_or_default(),
            password: req.password.unwrap_or_default(),
            device: req.device,
        })
        .await?;

    Ok(Json(LoginResponse {
        login_time: signed_in.session.login_at,
        session_id: signed_in.session.id,
        token: signed_in.token,
        account: signed_in.account.into(),
    }))
}

pub async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    // Empty string clears the avatar; absent/null leaves it alone.
    let image = req.image.map(|raw| {
        if raw.is_empty() { None } else { Some(raw) }
    });

    let account = state
        .accounts
        .update(
            id,
            UpdateAccount {
                username: req.username,
                full_name: req.full_name,
                password: req.password,
                image,
            },
        )
        .await?;

    Ok(Json(account.into()))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.accounts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_present("token", req.token.as_deref())?;

    state
        .service
        .logout(req.token.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(MessageResponse {
        message: "Logged out successfully".into(),
    }))
}

pub async fn validate_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Response, ApiError> {
    let raw_token = match req.token.as_deref() {
        Some(token) if !token.trim().is_empty() => token,
        // A missing token is indistinguishable from an invalid one.
        _ => {
            return Ok((
                StatusCode::UNAUTHORIZED,
                Json(ValidateTokenResponse::invalid()),
            )
                .into_response());
        }
    };

    match state.service.validate(raw_token).await {
        Ok((account, session)) => Ok(Json(ValidateTokenResponse {
            valid: true,
            account: Some(account.into()),
            session_id: Some(session.id),
        })
        .into_response()),
        Err(KeygateError::AuthenticationFailed { .. }) => Ok((
            StatusCode::UNAUTHORIZED,
            Json(ValidateTokenResponse::invalid()),
        )
            .into_response()),
        Err(other) => Err(other.into()),
    }
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    let sessions = state.service.list_active_sessions(user_id).await?;
    Ok(Json(sessions.into_iter().map(Into::into).collect()))
}

fn require_present(field: &str, value: Option<&str>) -> KeygateResult<()> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(KeygateError::Validation {
            message: format!("{field} is required"),
        }),
    }
}
