//! Helpers shared by the route unit tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::http::header::AUTHORIZATION;
use axum::response::Response;
use serde_json::{Value, json};
use stonecross_accounts::domain::account::session_key;
use stonecross_core::store::{KeyValueStore, WriteRequest};
use stonecross_store::MemoryStore;
use stonecross_test_support::{CountingTokens, FixedClock, fixed_now};

use crate::state::AppState;

pub fn state_with(store: Arc<dyn KeyValueStore>) -> AppState {
    AppState::new(
        store,
        Arc::new(FixedClock(fixed_now())),
        Arc::new(CountingTokens::default()),
    )
}

/// A memory store with an operator session (`dm-token`) and a player
/// session (`player-token`, user `rodney`).
pub async fn signed_in_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for (token, username) in [("dm-token", "dm"), ("player-token", "rodney")] {
        let session = json!({
            "username": username,
            "issued_at": fixed_now(),
            "expires_at": fixed_now() + chrono::Duration::days(1),
        });
        store
            .put(&session_key(token), WriteRequest::new(session, fixed_now()))
            .await
            .unwrap();
    }
    store
}

pub fn request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header("content-type", "application/json");
    match body {
        Some(body) => builder.body(Body::from(serde_json::to_vec(&body).unwrap())),
        None => builder.body(Body::empty()),
    }
    .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
