//! Background polling of one room document.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use stonecross_core::document::Versioned;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::cursor::SyncCursor;
use crate::transport::DocumentTransport;

/// How often players re-fetch shared documents.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Polls a document on a fixed interval and publishes what it applies.
///
/// Failed reads leave the published document unchanged. Dropping the poller
/// stops it; switching rooms means dropping it and spawning a new one.
pub struct Poller<D> {
    updates: watch::Receiver<Option<Versioned<D>>>,
    task: JoinHandle<()>,
}

impl<D: Clone + Send + Sync + 'static> Poller<D> {
    /// Starts polling `transport` every `interval`, the first fetch right away.
    ///
    /// `cursor` is shared with the writer of the same document so that own
    /// writes are not re-applied.
    pub fn spawn<T>(transport: Arc<T>, cursor: Arc<Mutex<SyncCursor>>, interval: Duration) -> Self
    where
        T: DocumentTransport<Document = D>,
    {
        let (tx, updates) = watch::channel(None);
        let task = tokio::spawn(poll_loop(transport, cursor, interval, tx));
        Self { updates, task }
    }

    /// Receiver of applied documents; `None` until the first one arrives.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Versioned<D>>> {
        self.updates.clone()
    }

    /// The last applied document.
    #[must_use]
    pub fn latest(&self) -> Option<Versioned<D>> {
        self.updates.borrow().clone()
    }
}

impl<D> Drop for Poller<D> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn poll_loop<T: DocumentTransport>(
    transport: Arc<T>,
    cursor: Arc<Mutex<SyncCursor>>,
    interval: Duration,
    tx: watch::Sender<Option<Versioned<T::Document>>>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let seq = cursor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .begin_request();
        match transport.fetch().await {
            Ok(doc) => {
                let stamp = doc.as_ref().map(|d| d.last_updated_at);
                let apply = cursor
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .accept(seq, stamp);
                if apply {
                    debug!(seq, "applying polled document");
                    tx.send_replace(doc);
                }
            }
            Err(e) => warn!(seq, error = %e, "poll failed; keeping current view"),
        }
    }
}
