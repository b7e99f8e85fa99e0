//! Health check and store diagnostics.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Store diagnostics response.
#[derive(Serialize)]
pub struct StoreCheckResponse {
    /// Which backend serves documents: `memory` or `postgres`.
    pub backend: &'static str,
    /// Whether documents survive a restart.
    pub persistent: bool,
}

/// GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/store-check
async fn store_check(State(state): State<AppState>) -> Json<StoreCheckResponse> {
    let backend = state.store.backend();
    Json(StoreCheckResponse {
        backend,
        persistent: backend != "memory",
    })
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Returns the store diagnostics router, nested under `/api`.
pub fn diagnostics_router() -> Router<AppState> {
    Router::new().route("/store-check", get(store_check))
}
