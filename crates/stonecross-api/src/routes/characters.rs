//! Routes for character sheets and the player roster.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use stonecross_characters::application::query_handlers::{self, PlayerList, SheetView};
use stonecross_characters::application::command_handlers;
use stonecross_characters::domain::commands::SaveSheet;

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;

/// `?username=` query parameter.
#[derive(Debug, Deserialize)]
pub struct SheetQuery {
    pub username: Option<String>,
}

/// Request body for POST /character.
#[derive(Debug, Deserialize)]
pub struct SaveSheetRequest {
    #[serde(default)]
    pub sheet: serde_json::Value,
}

/// Response body for POST /character.
#[derive(Debug, Serialize)]
pub struct SheetSaved {
    pub ok: bool,
}

/// GET /character
#[instrument(skip(state, caller), fields(caller = %caller.username))]
async fn get_sheet(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Query(query): Query<SheetQuery>,
) -> Result<Json<SheetView>, ApiError> {
    let view = query_handlers::get_sheet(
        query.username.as_deref(),
        &caller,
        state.clock.as_ref(),
        state.store.as_ref(),
    )
    .await?;
    Ok(Json(view))
}

/// POST /character
#[instrument(skip(state, caller, request), fields(caller = %caller.username))]
async fn save_sheet(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Json(request): Json<SaveSheetRequest>,
) -> Result<Json<SheetSaved>, ApiError> {
    let command = SaveSheet {
        correlation_id: Uuid::new_v4(),
        sheet: request.sheet,
    };

    info!(correlation_id = %command.correlation_id, "handling save_sheet command");

    command_handlers::handle_save_sheet(
        &command,
        &caller,
        state.clock.as_ref(),
        state.store.as_ref(),
    )
    .await?;
    Ok(Json(SheetSaved { ok: true }))
}

/// GET /users
#[instrument(skip(state, caller), fields(caller = %caller.username))]
async fn list_users(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> Result<Json<PlayerList>, ApiError> {
    let list = query_handlers::list_players(&caller, &state.operator, state.store.as_ref()).await?;
    Ok(Json(list))
}

/// Returns the router for the characters context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/character", get(get_sheet).post(save_sheet))
        .route("/users", get(list_users))
}
