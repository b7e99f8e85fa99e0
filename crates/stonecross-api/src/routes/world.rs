//! Routes for the world context: map unlocks, NPC directory, pantheon.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::{Json, Router, routing::get};
use tracing::{info, instrument};

use stonecross_core::command::UpdateDocument;
use stonecross_world::application::{command_handlers, query_handlers};
use stonecross_world::domain::commands::{UpdateMapUnlocks, UpdateNpcDirectory, UpdatePantheon};

use super::documents::{RoomQuery, document_response, expected_version, parse_body};
use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/map-unlocks
#[instrument(skip(state, _caller))]
async fn get_map_unlocks(
    State(state): State<AppState>,
    Authenticated(_caller): Authenticated,
    Query(query): Query<RoomQuery>,
) -> Result<Response, ApiError> {
    let doc =
        query_handlers::get_map_unlocks(&query.room(), state.clock.as_ref(), state.store.as_ref())
            .await?;
    let version = doc.as_ref().map(|d| d.version);
    Ok(document_response(doc, version))
}

/// PUT /api/map-unlocks
#[instrument(skip(state, caller, headers, body))]
async fn put_map_unlocks(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Query(query): Query<RoomQuery>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
    let command: UpdateMapUnlocks = UpdateDocument::new(query.room(), parse_body(body)?)
        .expecting(expected_version(&headers)?);

    info!(correlation_id = %command.correlation_id, "handling map unlocks update");

    let doc = command_handlers::handle_update_map_unlocks(
        &command,
        &caller,
        state.clock.as_ref(),
        state.store.as_ref(),
    )
    .await?;
    let version = doc.version;
    Ok(document_response(Some(doc), Some(version)))
}

/// GET /api/npcs
#[instrument(skip(state, _caller))]
async fn get_npcs(
    State(state): State<AppState>,
    Authenticated(_caller): Authenticated,
    Query(query): Query<RoomQuery>,
) -> Result<Response, ApiError> {
    let doc =
        query_handlers::get_npc_directory(&query.room(), state.clock.as_ref(), state.store.as_ref())
            .await?;
    let version = doc.as_ref().map(|d| d.version);
    Ok(document_response(doc, version))
}

/// PUT /api/npcs
#[instrument(skip(state, caller, headers, body))]
async fn put_npcs(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Query(query): Query<RoomQuery>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
    let command: UpdateNpcDirectory = UpdateDocument::new(query.room(), parse_body(body)?)
        .expecting(expected_version(&headers)?);

    info!(correlation_id = %command.correlation_id, "handling NPC directory update");

    let doc = command_handlers::handle_update_npc_directory(
        &command,
        &caller,
        state.clock.as_ref(),
        state.store.as_ref(),
    )
    .await?;
    let version = doc.version;
    Ok(document_response(Some(doc), Some(version)))
}

/// GET /api/old-gods
#[instrument(skip(state, _caller))]
async fn get_old_gods(
    State(state): State<AppState>,
    Authenticated(_caller): Authenticated,
    Query(query): Query<RoomQuery>,
) -> Result<Response, ApiError> {
    let doc = query_handlers::get_pantheon(&query.room(), state.clock.as_ref(), state.store.as_ref())
        .await?;
    let version = doc.as_ref().map(|d| d.version);
    Ok(document_response(doc, version))
}

/// PUT /api/old-gods
#[instrument(skip(state, caller, headers, body))]
async fn put_old_gods(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Query(query): Query<RoomQuery>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
    let command: UpdatePantheon = UpdateDocument::new(query.room(), parse_body(body)?)
        .expecting(expected_version(&headers)?);

    info!(correlation_id = %command.correlation_id, "handling pantheon update");

    let doc = command_handlers::handle_update_pantheon(
        &command,
        &caller,
        state.clock.as_ref(),
        state.store.as_ref(),
    )
    .await?;
    let version = doc.version;
    Ok(document_response(Some(doc), Some(version)))
}

/// Returns the router for the world context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/map-unlocks", get(get_map_unlocks).put(put_map_unlocks))
        .route("/npcs", get(get_npcs).put(put_npcs))
        .route("/old-gods", get(get_old_gods).put(put_old_gods))
}
