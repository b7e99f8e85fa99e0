//! `reqwest` transports for the Stonecross HTTP API.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use stonecross_core::document::Versioned;
use stonecross_core::room::Room;

use crate::error::SyncError;
use crate::transport::{DocumentTransport, SheetSink};

/// Path of the map unlocks document.
pub const MAP_UNLOCKS_PATH: &str = "/api/map-unlocks";
/// Path of the NPC directory document.
pub const NPCS_PATH: &str = "/api/npcs";
/// Path of the shop ledger document.
pub const SHOPS_PATH: &str = "/api/shops";
/// Path of the pantheon document.
pub const OLD_GODS_PATH: &str = "/api/old-gods";
/// Path of the caller's character sheet.
pub const CHARACTER_PATH: &str = "/api/character";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn build_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

fn with_token(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

#[derive(serde::Deserialize)]
struct DataEnvelope<T> {
    data: Option<T>,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

async fn status_error(response: Response) -> SyncError {
    let status = response.status();
    if status == StatusCode::CONFLICT {
        return SyncError::Conflict;
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .unwrap_or(text);
    SyncError::Status {
        status: status.as_u16(),
        message,
    }
}

/// A room document served at `path` under `base_url`.
pub struct HttpDocumentTransport<D> {
    client: Client,
    base_url: String,
    path: &'static str,
    room: Room,
    token: Option<String>,
    _document: PhantomData<fn() -> D>,
}

impl<D> HttpDocumentTransport<D> {
    /// Creates a transport for the document at `path` in `room`.
    pub fn new(base_url: &str, path: &'static str, room: Room) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            path,
            room,
            token: None,
            _document: PhantomData,
        }
    }

    /// Authenticates requests with a session token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// The document URL, without the room query.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    /// The room this transport reads and writes.
    #[must_use]
    pub fn room(&self) -> &Room {
        &self.room
    }
}

#[async_trait]
impl<D> DocumentTransport for HttpDocumentTransport<D>
where
    D: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Document = D;

    async fn fetch(&self) -> Result<Option<Versioned<D>>, SyncError> {
        let request = self
            .client
            .get(self.url())
            .query(&[("room", self.room.as_str())]);
        let response = with_token(request, self.token.as_deref())
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let envelope: DataEnvelope<Versioned<D>> = response
            .json()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))?;
        Ok(envelope.data)
    }

    async fn push(&self, body: &D, expected_version: Option<i64>) -> Result<Versioned<D>, SyncError> {
        let mut request = self
            .client
            .put(self.url())
            .query(&[("room", self.room.as_str())])
            .json(body);
        if let Some(version) = expected_version {
            request = request.header(reqwest::header::IF_MATCH, format!("\"{version}\""));
        }
        let response = with_token(request, self.token.as_deref())
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let envelope: DataEnvelope<Versioned<D>> = response
            .json()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))?;
        envelope
            .data
            .ok_or_else(|| SyncError::Decode("write response carried no document".into()))
    }
}

/// Saves the caller's character sheet.
pub struct HttpSheetSink {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpSheetSink {
    /// Creates a sink saving as the owner of `token`.
    pub fn new(base_url: &str, token: impl Into<String>) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.into(),
        }
    }

    /// The sheet URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}{CHARACTER_PATH}", self.base_url)
    }
}

#[async_trait]
impl SheetSink for HttpSheetSink {
    async fn save_sheet(&self, sheet: &serde_json::Value) -> Result<(), SyncError> {
        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "sheet": sheet }))
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error(response).await)
        }
    }
}
