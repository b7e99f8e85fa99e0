//! Character sheets and the player roster.
//!
//! A sheet is an opaque JSON object owned by one username; the server only
//! checks its shape.

use stonecross_core::error::DomainError;

const SHEET_KEY_PREFIX: &str = "sc:character:";

/// Set of usernames that have saved a sheet.
pub const ROSTER_KEY: &str = "sc:users";

/// Key of the sheet owned by `username`.
#[must_use]
pub fn sheet_key(username: &str) -> String {
    format!("{SHEET_KEY_PREFIX}{username}")
}

/// Accepts only JSON objects as sheets.
///
/// # Errors
///
/// Returns `DomainError::Validation` for any other JSON value.
pub fn validate_sheet(sheet: &serde_json::Value) -> Result<(), DomainError> {
    if sheet.is_object() {
        Ok(())
    } else {
        Err(DomainError::Validation("sheet must be a JSON object".into()))
    }
}
