//! Route modules organized by bounded context.

use axum::Router;

use crate::state::AppState;

pub mod accounts;
pub mod characters;
pub mod combat;
pub mod documents;
pub mod health;
pub mod shops;
pub mod world;

#[cfg(test)]
pub(crate) mod testing;

/// Every route, with room documents and accounts under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest(
            "/api",
            Router::new()
                .merge(health::diagnostics_router())
                .nest("/auth", accounts::router())
                .merge(characters::router())
                .merge(world::router())
                .merge(shops::router())
                .merge(combat::router()),
        )
}
