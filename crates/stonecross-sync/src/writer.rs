//! Operator-side writes of a full room document.

use std::sync::{Arc, Mutex, PoisonError};

use stonecross_core::document::Versioned;
use tracing::{info, warn};

use crate::cursor::SyncCursor;
use crate::error::SyncError;
use crate::transport::DocumentTransport;

/// Pushes attempted per mutation before giving up on conflicts.
pub const MAX_PUSH_ATTEMPTS: usize = 3;

/// State of the last save, for a status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    /// Nothing saved yet.
    #[default]
    Idle,
    /// An edit is waiting for the debounce to expire.
    Pending,
    /// A save is in flight.
    Saving,
    /// The last save succeeded.
    Saved,
    /// The last save failed; local edits are kept for a manual retry.
    Failed,
}

/// Applies local mutations to the latest known document and pushes the full
/// result with its version as a precondition.
///
/// On a conflict the writer re-fetches and re-applies the mutation, up to
/// [`MAX_PUSH_ATTEMPTS`] pushes. Any other failure marks the status
/// [`SaveStatus::Failed`] and keeps the edited document as unsaved.
pub struct DocumentWriter<T: DocumentTransport> {
    transport: Arc<T>,
    cursor: Arc<Mutex<SyncCursor>>,
    latest: Option<Versioned<T::Document>>,
    unsaved: Option<T::Document>,
    status: SaveStatus,
}

impl<T> DocumentWriter<T>
where
    T: DocumentTransport,
    T::Document: Default,
{
    /// Creates a writer sharing `cursor` with the poller of the same document.
    pub fn new(transport: Arc<T>, cursor: Arc<Mutex<SyncCursor>>) -> Self {
        Self {
            transport,
            cursor,
            latest: None,
            unsaved: None,
            status: SaveStatus::Idle,
        }
    }

    /// Adopts a document the poller applied.
    pub fn observe(&mut self, doc: Versioned<T::Document>) {
        let newer = self.latest.as_ref().is_none_or(|current| doc.version >= current.version);
        if newer {
            self.latest = Some(doc);
        }
    }

    /// The last document known to be on the server.
    #[must_use]
    pub fn latest(&self) -> Option<&Versioned<T::Document>> {
        self.latest.as_ref()
    }

    /// What the operator should see: unsaved edits, or the server copy.
    #[must_use]
    pub fn local_view(&self) -> Option<&T::Document> {
        self.unsaved
            .as_ref()
            .or_else(|| self.latest.as_ref().map(|doc| &doc.body))
    }

    /// State of the last save.
    #[must_use]
    pub fn status(&self) -> SaveStatus {
        self.status
    }

    /// Applies `mutation` and persists the whole document.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Exhausted`] if every attempt conflicted, or the
    /// transport error of the first non-conflict failure.
    pub async fn mutate<F>(&mut self, mutation: F) -> Result<&Versioned<T::Document>, SyncError>
    where
        F: Fn(&mut T::Document),
    {
        if self.latest.is_none() {
            self.refresh().await?;
        }
        self.status = SaveStatus::Saving;

        for attempt in 1..=MAX_PUSH_ATTEMPTS {
            let mut body = self
                .latest
                .as_ref()
                .map(|doc| doc.body.clone())
                .unwrap_or_default();
            mutation(&mut body);
            let expected = Some(self.latest.as_ref().map_or(0, |doc| doc.version));

            match self.transport.push(&body, expected).await {
                Ok(saved) => {
                    self.cursor
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .record_write(saved.last_updated_at);
                    info!(version = saved.version, attempt, "document saved");
                    self.unsaved = None;
                    self.status = SaveStatus::Saved;
                    return Ok(self.latest.insert(saved));
                }
                Err(SyncError::Conflict) => {
                    warn!(attempt, "document changed on the server; re-fetching");
                    self.unsaved = Some(body);
                    if let Err(e) = self.refresh().await {
                        self.status = SaveStatus::Failed;
                        return Err(e);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "save failed");
                    self.unsaved = Some(body);
                    self.status = SaveStatus::Failed;
                    return Err(e);
                }
            }
        }

        self.status = SaveStatus::Failed;
        Err(SyncError::Exhausted {
            attempts: MAX_PUSH_ATTEMPTS,
        })
    }

    /// Pushes the unsaved document again, as a manual retry after a failure.
    ///
    /// # Errors
    ///
    /// Same as [`DocumentWriter::mutate`].
    pub async fn retry(&mut self) -> Result<Option<&Versioned<T::Document>>, SyncError> {
        let Some(unsaved) = self.unsaved.clone() else {
            return Ok(None);
        };
        self.mutate(move |body| *body = unsaved.clone()).await.map(Some)
    }

    /// Replaces `latest` with the server's copy; a missing document clears it
    /// so the next push expects an empty room.
    async fn refresh(&mut self) -> Result<(), SyncError> {
        self.latest = self.transport.fetch().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;

    fn stamp(version: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap() + Duration::seconds(version)
    }

    /// A server holding one `Vec<String>` document with version checks.
    /// Scripted failures are returned by pushes before the check.
    #[derive(Default)]
    struct FakeServer {
        doc: Mutex<Option<Versioned<Vec<String>>>>,
        push_failures: Mutex<VecDeque<SyncError>>,
        pushes: Mutex<usize>,
    }

    impl FakeServer {
        fn with_doc(lines: &[&str], version: i64) -> Arc<Self> {
            let server = Self::default();
            *server.doc.lock().unwrap() = Some(Versioned {
                body: lines.iter().map(|l| (*l).to_owned()).collect(),
                last_updated_at: stamp(version),
                version,
            });
            Arc::new(server)
        }

        /// Simulates another operator writing in between.
        fn write_behind_back(&self, line: &str) {
            let mut doc = self.doc.lock().unwrap();
            let current = doc.take().unwrap();
            let mut body = current.body;
            body.push(line.to_owned());
            *doc = Some(Versioned {
                body,
                last_updated_at: stamp(current.version + 1),
                version: current.version + 1,
            });
        }

        fn body(&self) -> Vec<String> {
            self.doc.lock().unwrap().as_ref().unwrap().body.clone()
        }
    }

    #[async_trait]
    impl DocumentTransport for FakeServer {
        type Document = Vec<String>;

        async fn fetch(&self) -> Result<Option<Versioned<Vec<String>>>, SyncError> {
            Ok(self.doc.lock().unwrap().clone())
        }

        async fn push(
            &self,
            body: &Vec<String>,
            expected: Option<i64>,
        ) -> Result<Versioned<Vec<String>>, SyncError> {
            *self.pushes.lock().unwrap() += 1;
            if let Some(e) = self.push_failures.lock().unwrap().pop_front() {
                return Err(e);
            }
            let mut doc = self.doc.lock().unwrap();
            let current = doc.as_ref().map_or(0, |d| d.version);
            if expected.is_some_and(|v| v != current) {
                return Err(SyncError::Conflict);
            }
            let saved = Versioned {
                body: body.clone(),
                last_updated_at: stamp(current + 1),
                version: current + 1,
            };
            *doc = Some(saved.clone());
            Ok(saved)
        }
    }

    fn writer(server: &Arc<FakeServer>) -> (DocumentWriter<FakeServer>, Arc<Mutex<SyncCursor>>) {
        let cursor = Arc::new(Mutex::new(SyncCursor::new()));
        (DocumentWriter::new(server.clone(), cursor.clone()), cursor)
    }

    #[tokio::test]
    async fn test_mutation_pushes_full_document_and_records_stamp() {
        // Arrange
        let server = FakeServer::with_doc(&["stonecross"], 1);
        let (mut writer, cursor) = writer(&server);

        // Act
        let saved = writer.mutate(|body| body.push("eldergate".into())).await.unwrap();

        // Assert
        assert_eq!(saved.version, 2);
        assert_eq!(server.body(), vec!["stonecross", "eldergate"]);
        assert_eq!(writer.status(), SaveStatus::Saved);
        assert_eq!(cursor.lock().unwrap().last_applied(), Some(stamp(2)));
    }

    #[tokio::test]
    async fn test_conflict_refetches_and_reapplies_mutation() {
        // Arrange
        let server = FakeServer::with_doc(&["stonecross"], 1);
        let (mut writer, _) = writer(&server);
        writer.observe(server.doc.lock().unwrap().clone().unwrap());
        server.write_behind_back("sunspire");

        // Act
        let saved = writer.mutate(|body| body.push("eldergate".into())).await.unwrap();

        // Assert
        assert_eq!(saved.version, 3);
        assert_eq!(server.body(), vec!["stonecross", "sunspire", "eldergate"]);
        assert_eq!(*server.pushes.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_repeated_conflicts_give_up() {
        // Arrange
        let server = FakeServer::with_doc(&[], 1);
        server
            .push_failures
            .lock()
            .unwrap()
            .extend([SyncError::Conflict, SyncError::Conflict, SyncError::Conflict]);
        let (mut writer, _) = writer(&server);

        // Act
        let result = writer.mutate(|body| body.push("x".into())).await;

        // Assert
        assert!(matches!(result, Err(SyncError::Exhausted { attempts: 3 })));
        assert_eq!(writer.status(), SaveStatus::Failed);
    }

    #[tokio::test]
    async fn test_failure_keeps_local_edit_without_retrying() {
        // Arrange
        let server = FakeServer::with_doc(&["stonecross"], 1);
        server
            .push_failures
            .lock()
            .unwrap()
            .push_back(SyncError::Request("connection reset".into()));
        let (mut writer, _) = writer(&server);

        // Act
        let result = writer.mutate(|body| body.push("eldergate".into())).await;

        // Assert
        assert!(matches!(result, Err(SyncError::Request(_))));
        assert_eq!(writer.status(), SaveStatus::Failed);
        assert_eq!(
            writer.local_view().unwrap(),
            &vec!["stonecross".to_owned(), "eldergate".to_owned()]
        );
        assert_eq!(server.body(), vec!["stonecross"]);
        assert_eq!(*server.pushes.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_manual_retry_pushes_unsaved_edit() {
        let server = FakeServer::with_doc(&["stonecross"], 1);
        server
            .push_failures
            .lock()
            .unwrap()
            .push_back(SyncError::Request("connection reset".into()));
        let (mut writer, _) = writer(&server);
        let _ = writer.mutate(|body| body.push("eldergate".into())).await;

        let saved = writer.retry().await.unwrap().unwrap();

        assert_eq!(saved.body, vec!["stonecross", "eldergate"]);
        assert_eq!(writer.status(), SaveStatus::Saved);
        assert!(writer.retry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_conflict_with_deleted_document_rewrites_from_default() {
        // Arrange
        let server = FakeServer::with_doc(&["stonecross"], 4);
        let (mut writer, _) = writer(&server);
        writer.observe(server.doc.lock().unwrap().clone().unwrap());
        *server.doc.lock().unwrap() = None;

        // Act
        let saved = writer.mutate(|body| body.push("eldergate".into())).await.unwrap();

        // Assert
        assert_eq!(saved.version, 1);
        assert_eq!(saved.body, vec!["eldergate"]);
        assert_eq!(*server.pushes.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_first_write_to_empty_room_starts_from_default() {
        let server = Arc::new(FakeServer::default());
        let (mut writer, _) = writer(&server);

        let saved = writer.mutate(|body| body.push("first".into())).await.unwrap();

        assert_eq!(saved.version, 1);
        assert_eq!(saved.body, vec!["first"]);
    }
}
