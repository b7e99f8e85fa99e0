//! Transport seams between the sync machinery and the server.

use async_trait::async_trait;
use stonecross_core::document::Versioned;

use crate::error::SyncError;

/// Reads and writes one room document.
#[async_trait]
pub trait DocumentTransport: Send + Sync + 'static {
    /// The document body.
    type Document: Clone + Send + Sync + 'static;

    /// Fetches the current document, or `None` if the room has none.
    async fn fetch(&self) -> Result<Option<Versioned<Self::Document>>, SyncError>;

    /// Replaces the document. With `expected_version`, the server rejects the
    /// write with [`SyncError::Conflict`] if the document moved on.
    async fn push(
        &self,
        body: &Self::Document,
        expected_version: Option<i64>,
    ) -> Result<Versioned<Self::Document>, SyncError>;
}

/// Persists the caller's character sheet.
#[async_trait]
pub trait SheetSink: Send + Sync + 'static {
    /// Saves `sheet` as the caller's character sheet.
    async fn save_sheet(&self, sheet: &serde_json::Value) -> Result<(), SyncError>;
}
