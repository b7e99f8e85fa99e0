//! Routes for the shop ledger context.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::{Json, Router, routing::get};
use tracing::{info, instrument};

use stonecross_core::command::UpdateDocument;
use stonecross_shops::application::{command_handlers, query_handlers};
use stonecross_shops::domain::commands::UpdateShopLedger;

use super::documents::{RoomQuery, document_response, expected_version, parse_body};
use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/shops
///
/// Players only see shops marked visible to them.
#[instrument(skip(state, caller), fields(username = %caller.username))]
async fn get_shops(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Query(query): Query<RoomQuery>,
) -> Result<Response, ApiError> {
    let doc = query_handlers::get_shop_ledger(
        &query.room(),
        &caller,
        state.clock.as_ref(),
        state.store.as_ref(),
    )
    .await?;
    let version = doc.as_ref().map(|d| d.version);
    Ok(document_response(doc, version))
}

/// PUT /api/shops
#[instrument(skip(state, caller, headers, body))]
async fn put_shops(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Query(query): Query<RoomQuery>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
    let command: UpdateShopLedger = UpdateDocument::new(query.room(), parse_body(body)?)
        .expecting(expected_version(&headers)?);

    info!(correlation_id = %command.correlation_id, "handling shop ledger update");

    let doc = command_handlers::handle_update_shop_ledger(
        &command,
        &caller,
        state.clock.as_ref(),
        state.store.as_ref(),
    )
    .await?;
    let version = doc.version;
    Ok(document_response(Some(doc), Some(version)))
}

/// Returns the router for the shops context.
pub fn router() -> Router<AppState> {
    Router::new().route("/shops", get(get_shops).put(put_shops))
}
