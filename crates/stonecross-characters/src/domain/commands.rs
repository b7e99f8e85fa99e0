//! Commands for the character sheets context.

use stonecross_core::command::Command;
use uuid::Uuid;

/// Save the caller's character sheet.
#[derive(Debug, Clone)]
pub struct SaveSheet {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The sheet as the client holds it.
    pub sheet: serde_json::Value,
}

impl Command for SaveSheet {
    fn command_type(&self) -> &'static str {
        "characters.save_sheet"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
