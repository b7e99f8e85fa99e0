//! Shared request and response plumbing for room documents.

use axum::Json;
use axum::http::header::{ETAG, IF_MATCH};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use stonecross_core::room::Room;

use crate::error::ApiError;

/// `?room=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct RoomQuery {
    pub room: Option<String>,
}

impl RoomQuery {
    /// The sanitized room.
    #[must_use]
    pub fn room(&self) -> Room {
        Room::parse(self.room.as_deref())
    }
}

/// Response envelope for a room document.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: Option<T>,
}

/// `{ data }` with an `ETag` carrying `version` when there is a document.
pub fn document_response<T: Serialize>(data: Option<T>, version: Option<i64>) -> Response {
    let mut response = Json(DataResponse { data }).into_response();
    if let Some(version) = version
        && let Ok(etag) = HeaderValue::from_str(&format!("\"{version}\""))
    {
        response.headers_mut().insert(ETAG, etag);
    }
    response
}

/// The version precondition from `If-Match`, if any.
///
/// Accepts `"3"`, `W/"3"` and a bare `3`; `*` means no precondition.
///
/// # Errors
///
/// Returns a validation error for anything else.
pub fn expected_version(headers: &HeaderMap) -> Result<Option<i64>, ApiError> {
    let Some(value) = headers.get(IF_MATCH) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| ApiError::validation("If-Match must be ASCII"))?
        .trim();
    if raw == "*" {
        return Ok(None);
    }
    let tag = raw.strip_prefix("W/").unwrap_or(raw).trim_matches('"');
    tag.parse::<i64>()
        .map(Some)
        .map_err(|_| ApiError::validation(format!("If-Match must carry a document version, got {raw}")))
}

/// Decodes a request body into a document update, as a 400 on mismatch.
///
/// # Errors
///
/// Returns a validation error naming the decoding problem.
pub fn parse_body<U: DeserializeOwned>(body: serde_json::Value) -> Result<U, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::validation(format!("invalid body: {e}")))
}
