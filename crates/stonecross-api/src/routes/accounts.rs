//! Routes for the accounts context.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use stonecross_accounts::application::command_handlers::{
    self, LoggedIn, PasswordReset, ResetTicketIssued, SignedUp,
};
use stonecross_accounts::domain::commands;

use crate::auth::{Authenticated, BearerToken};
use crate::error::ApiError;
use crate::state::AppState;

/// Success envelope: `{ "ok": true, ...fields }`.
#[derive(Debug, Serialize)]
pub struct Acknowledged<T> {
    pub ok: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Acknowledged<T> {
    fn new(body: T) -> Json<Self> {
        Json(Self { ok: true, body })
    }
}

/// Request body for POST /auth/signup and /auth/login.
///
/// Missing fields decode as empty so the handlers can name them.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    /// SHA-256 hex digest of the password.
    #[serde(default, alias = "passwordHash")]
    pub password_hash: String,
}

/// Request body for POST /auth/reset-request.
#[derive(Debug, Deserialize)]
pub struct ResetRequestRequest {
    #[serde(default)]
    pub username: String,
}

/// Request body for POST /auth/reset.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default, alias = "passwordHash")]
    pub password_hash: String,
}

/// Response body for POST /auth/logout.
#[derive(Debug, Serialize)]
pub struct LoggedOut {
    /// Whether a live session was ended.
    pub removed: bool,
}

/// POST /auth/signup
#[instrument(skip(state, request), fields(username = %request.username))]
async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<Acknowledged<SignedUp>>, ApiError> {
    let command = commands::SignUp {
        correlation_id: Uuid::new_v4(),
        username: request.username,
        password_hash: request.password_hash,
    };

    info!(correlation_id = %command.correlation_id, "handling sign_up command");

    let signed_up =
        command_handlers::handle_sign_up(&command, state.clock.as_ref(), state.store.as_ref())
            .await?;
    Ok(Acknowledged::new(signed_up))
}

/// POST /auth/login
#[instrument(skip(state, request), fields(username = %request.username))]
async fn log_in(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<Acknowledged<LoggedIn>>, ApiError> {
    let command = commands::LogIn {
        correlation_id: Uuid::new_v4(),
        username: request.username,
        password_hash: request.password_hash,
    };

    info!(correlation_id = %command.correlation_id, "handling log_in command");

    let logged_in = command_handlers::handle_log_in(
        &command,
        &state.operator,
        state.session_ttl,
        state.clock.as_ref(),
        state.tokens.as_ref(),
        state.store.as_ref(),
    )
    .await?;
    Ok(Acknowledged::new(logged_in))
}

/// POST /auth/logout
#[instrument(skip(state, token))]
async fn log_out(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<Acknowledged<LoggedOut>>, ApiError> {
    let command = commands::LogOut {
        correlation_id: Uuid::new_v4(),
        token,
    };

    info!(correlation_id = %command.correlation_id, "handling log_out command");

    let removed = command_handlers::handle_log_out(&command, state.store.as_ref()).await?;
    Ok(Acknowledged::new(LoggedOut { removed }))
}

/// POST /auth/reset-request
#[instrument(skip(state, caller, request), fields(username = %request.username))]
async fn request_password_reset(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Json(request): Json<ResetRequestRequest>,
) -> Result<Json<Acknowledged<ResetTicketIssued>>, ApiError> {
    let command = commands::RequestPasswordReset {
        correlation_id: Uuid::new_v4(),
        username: request.username,
    };

    info!(correlation_id = %command.correlation_id, "handling request_password_reset command");

    let issued = command_handlers::handle_request_password_reset(
        &command,
        &caller,
        state.clock.as_ref(),
        state.tokens.as_ref(),
        state.store.as_ref(),
    )
    .await?;
    Ok(Acknowledged::new(issued))
}

/// POST /auth/reset
#[instrument(skip(state, request))]
async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> Result<Json<Acknowledged<PasswordReset>>, ApiError> {
    let command = commands::ResetPassword {
        correlation_id: Uuid::new_v4(),
        token: request.token,
        password_hash: request.password_hash,
    };

    info!(correlation_id = %command.correlation_id, "handling reset_password command");

    let reset =
        command_handlers::handle_reset_password(&command, state.clock.as_ref(), state.store.as_ref())
            .await?;
    Ok(Acknowledged::new(reset))
}

/// Returns the router for the accounts context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/login", post(log_in))
        .route("/logout", post(log_out))
        .route("/reset-request", post(request_password_reset))
        .route("/reset", post(reset_password))
}
