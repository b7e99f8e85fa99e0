//! Routes for the combat initiative tracker.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::{Json, Router, routing::get};
use tracing::{info, instrument};
use uuid::Uuid;

use stonecross_combat::application::query_handlers::EncounterView;
use stonecross_combat::application::{command_handlers, query_handlers};
use stonecross_combat::domain::commands::{ApplyEncounterCommand, EncounterCommand};

use super::documents::{RoomQuery, document_response, expected_version, parse_body};
use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/combat
#[instrument(skip(state, caller), fields(username = %caller.username))]
async fn get_combat(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Query(query): Query<RoomQuery>,
) -> Result<Response, ApiError> {
    let view = query_handlers::get_encounter(
        &query.room(),
        &caller,
        state.combat_visibility,
        state.clock.as_ref(),
        state.store.as_ref(),
    )
    .await?;
    let version = view.as_ref().map(|v| v.version);
    Ok(document_response(view, version))
}

/// POST /api/combat
///
/// The body is one tagged command, e.g.
/// `{ "command": "focus_combatant", "id": "..." }`.
#[instrument(skip(state, caller, headers, body))]
async fn post_combat(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Query(query): Query<RoomQuery>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
    let command = ApplyEncounterCommand {
        correlation_id: Uuid::new_v4(),
        room: query.room(),
        command: parse_body::<EncounterCommand>(body)?,
        expected_version: expected_version(&headers)?,
    };

    info!(
        correlation_id = %command.correlation_id,
        command_type = command.command.command_type(),
        "handling encounter command"
    );

    let doc = command_handlers::handle_encounter_command(
        &command,
        &caller,
        state.clock.as_ref(),
        state.store.as_ref(),
    )
    .await?;
    let view = EncounterView::from(doc);
    let version = view.version;
    Ok(document_response(Some(view), Some(version)))
}

/// Returns the router for the combat context.
pub fn router() -> Router<AppState> {
    Router::new().route("/combat", get(get_combat).post(post_combat))
}
