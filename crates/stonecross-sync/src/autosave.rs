//! Debounced autosave of the caller's character sheet.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::transport::SheetSink;
use crate::writer::SaveStatus;

/// Quiet period after the last edit before a sheet is saved.
pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(450);

/// Saves the latest edited sheet once edits stop for the configured delay.
///
/// Every edit restarts the delay. A failed save is logged and reported as
/// [`SaveStatus::Failed`]; the next edit schedules a new attempt.
pub struct Autosave {
    edits: watch::Sender<Option<Value>>,
    status: watch::Receiver<SaveStatus>,
    task: JoinHandle<()>,
}

impl Autosave {
    /// Starts the autosave task for `sink`.
    pub fn spawn<S: SheetSink>(sink: Arc<S>, delay: Duration) -> Self {
        let (edits, edits_rx) = watch::channel(None);
        let (status_tx, status) = watch::channel(SaveStatus::Idle);
        let task = tokio::spawn(debounce_loop(sink, delay, edits_rx, status_tx));
        Self {
            edits,
            status,
            task,
        }
    }

    /// Records an edited sheet and restarts the quiet period.
    pub fn edit(&self, sheet: Value) {
        self.edits.send_replace(Some(sheet));
    }

    /// State of the last save.
    #[must_use]
    pub fn status(&self) -> SaveStatus {
        *self.status.borrow()
    }

    /// Receiver of save state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn debounce_loop<S: SheetSink>(
    sink: Arc<S>,
    delay: Duration,
    mut edits: watch::Receiver<Option<Value>>,
    status: watch::Sender<SaveStatus>,
) {
    loop {
        if edits.changed().await.is_err() {
            return;
        }
        status.send_replace(SaveStatus::Pending);

        // Restart the quiet period on every further edit.
        loop {
            tokio::select! {
                () = tokio::time::sleep(delay) => break,
                changed = edits.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }

        let Some(sheet) = edits.borrow_and_update().clone() else {
            continue;
        };
        status.send_replace(SaveStatus::Saving);
        match sink.save_sheet(&sheet).await {
            Ok(()) => {
                debug!("character sheet autosaved");
                status.send_replace(SaveStatus::Saved);
            }
            Err(e) => {
                warn!(error = %e, "character sheet autosave failed");
                status.send_replace(SaveStatus::Failed);
            }
        }
    }
}
