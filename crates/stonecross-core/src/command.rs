//! Command abstractions.

use std::fmt;

use uuid::Uuid;

use crate::document::RoomDocument;
use crate::room::Room;

/// Trait that all commands implement.
pub trait Command: Send + Sync + fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;
}

/// Command to write one room's copy of document `D`.
pub struct UpdateDocument<D: RoomDocument> {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The room whose document is written.
    pub room: Room,
    /// What the writer sent.
    pub update: D::Update,
    /// Version the writer last saw, if they sent one.
    pub expected_version: Option<i64>,
}

impl<D: RoomDocument> UpdateDocument<D> {
    /// Creates an unconditioned update with a fresh correlation ID.
    #[must_use]
    pub fn new(room: Room, update: D::Update) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            room,
            update,
            expected_version: None,
        }
    }

    /// Require the stored document to be at `version`.
    #[must_use]
    pub fn expecting(mut self, version: Option<i64>) -> Self {
        self.expected_version = version;
        self
    }
}

impl<D: RoomDocument> fmt::Debug for UpdateDocument<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateDocument")
            .field("namespace", &D::NAMESPACE)
            .field("correlation_id", &self.correlation_id)
            .field("room", &self.room)
            .field("update", &self.update)
            .field("expected_version", &self.expected_version)
            .finish()
    }
}

impl<D: RoomDocument> Command for UpdateDocument<D> {
    fn command_type(&self) -> &'static str {
        D::NAMESPACE
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
