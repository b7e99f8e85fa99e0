//! Ordering of poll responses against each other and against own writes.

use chrono::{DateTime, Utc};

/// Decides which fetched documents a client applies.
///
/// Every fetch takes a sequence number from [`SyncCursor::begin_request`].
/// A response is applied only if it carries a document, its sequence number
/// is newer than the last accepted one and than the last own write, and its
/// stamp differs from the last applied stamp.
#[derive(Debug, Clone, Default)]
pub struct SyncCursor {
    issued: u64,
    accepted: u64,
    write_barrier: u64,
    last_applied: Option<DateTime<Utc>>,
}

impl SyncCursor {
    /// A cursor that has applied nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the sequence number for a request about to be sent.
    pub fn begin_request(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Whether the response to request `seq` with document stamp `stamp`
    /// should be applied. Records it as applied if so.
    pub fn accept(&mut self, seq: u64, stamp: Option<DateTime<Utc>>) -> bool {
        if seq <= self.accepted || seq <= self.write_barrier {
            return false;
        }
        let Some(stamp) = stamp else {
            return false;
        };
        self.accepted = seq;
        if self.last_applied == Some(stamp) {
            return false;
        }
        self.last_applied = Some(stamp);
        true
    }

    /// Records a document this client wrote itself. Its echo will not be
    /// re-applied, and responses to requests sent before the write are
    /// discarded.
    pub fn record_write(&mut self, stamp: DateTime<Utc>) {
        self.last_applied = Some(stamp);
        self.write_barrier = self.issued;
    }

    /// Stamp of the last applied or written document.
    #[must_use]
    pub fn last_applied(&self) -> Option<DateTime<Utc>> {
        self.last_applied
    }
}
