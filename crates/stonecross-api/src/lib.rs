//! Stonecross API: the Axum HTTP server.
//!
//! Exposes the room documents, the combat tracker, accounts and character
//! sheets over JSON. The binary in `main.rs` wires configuration, the store
//! backend and telemetry around [`build_app`].

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

/// The full application with request tracing and `cors` applied.
pub fn build_app(state: state::AppState, cors: CorsLayer) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
