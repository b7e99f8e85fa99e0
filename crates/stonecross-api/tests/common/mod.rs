//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use stonecross_combat::domain::visibility::CombatVisibility;
use stonecross_core::clock::Clock;
use stonecross_store::MemoryStore;
use stonecross_test_support::{CountingTokens, FixedClock};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use stonecross_api::build_app;
use stonecross_api::state::AppState;

/// SHA-256 of "password", as clients send it.
pub const DIGEST: &str = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app over a fresh in-memory store. Sessions are issued as
/// `token-1`, `token-2`, ... in login order.
pub fn build_test_app(visibility: CombatVisibility) -> Router {
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        fixed_clock(),
        Arc::new(CountingTokens::default()),
    )
    .with_combat_visibility(visibility);
    build_app(state, CorsLayer::permissive())
}

/// Send a request and return status, headers and the JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&serde_json::Value>,
    if_match: Option<&str>,
) -> (StatusCode, HeaderMap, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    if let Some(tag) = if_match {
        builder = builder.header("if-match", tag);
    }
    let body = body.map_or_else(Body::empty, |b| Body::from(serde_json::to_vec(b).unwrap()));
    let request = builder.body(body).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, headers, json)
}

/// Sign up and log in `username`; returns the session token.
pub async fn sign_in(app: &Router, username: &str) -> String {
    let creds = serde_json::json!({ "username": username, "password_hash": DIGEST });
    let (status, _, _) = send(app, "POST", "/api/auth/signup", None, Some(&creds), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, json) = send(app, "POST", "/api/auth/login", None, Some(&creds), None).await;
    assert_eq!(status, StatusCode::OK);
    json["token"].as_str().unwrap().to_owned()
}
