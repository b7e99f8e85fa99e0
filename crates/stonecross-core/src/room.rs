//! Room names.
//!
//! A room scopes a shared document to one campaign table. Callers supply the
//! name freely; it is sanitized before it becomes a storage-key suffix.

use std::fmt;

/// Room used when the caller does not name one.
pub const DEFAULT_ROOM: &str = "default";

/// Longest room name kept, in characters.
pub const MAX_ROOM_LEN: usize = 64;

/// A sanitized room name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Room(String);

impl Room {
    /// Resolves a caller-supplied room name.
    ///
    /// Missing or blank names become `default`. The name is trimmed, cut to
    /// [`MAX_ROOM_LEN`] characters, and every character outside
    /// `[A-Za-z0-9_-:.]` is replaced with `_`.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let trimmed = raw.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() {
            return Self::default();
        }
        let safe: String = trimmed
            .chars()
            .take(MAX_ROOM_LEN)
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if safe.is_empty() {
            Self::default()
        } else {
            Self(safe)
        }
    }

    /// The sanitized name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key for a document of `namespace` in this room.
    #[must_use]
    pub fn storage_key(&self, namespace: &str) -> String {
        format!("{namespace}:{}", self.0)
    }
}

impl Default for Room {
    fn default() -> Self {
        Self(DEFAULT_ROOM.to_owned())
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
