//! Stonecross API server entry point.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use stonecross_api::config::AppConfig;
use stonecross_api::error::AppError;
use stonecross_api::state::AppState;
use stonecross_api::{build_app, telemetry};
use stonecross_core::clock::SystemClock;
use stonecross_core::store::KeyValueStore;
use stonecross_core::token::OsTokenSource;
use stonecross_store::{MemoryStore, PgStore};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Read configuration from environment.
    let config = AppConfig::from_env()?;

    // Initialize tracing subscriber.
    let _telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting Stonecross API server");

    // Pick the store backend.
    let store: Arc<dyn KeyValueStore> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;
            let store = PgStore::new(pool);
            store.migrate().await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; documents are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    // Build application state.
    let app_state = AppState::new(store, Arc::new(SystemClock), Arc::new(OsTokenSource))
        .with_operator(config.operator.clone())
        .with_combat_visibility(config.combat_visibility)
        .with_session_ttl(config.session_ttl);

    // Build router.
    let app = build_app(app_state, config.cors_layer()?);

    // Start server.
    let addr = config.listen_addr()?;
    tracing::info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
