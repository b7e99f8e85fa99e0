//! Key-value store abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DomainError;

/// Stored representation of a value.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredValue {
    /// The JSON value.
    pub value: serde_json::Value,
    /// Number of writes applied to this key since it was last absent.
    pub version: i64,
    /// Time of the last write.
    pub updated_at: DateTime<Utc>,
    /// Time after which the value reads as absent.
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredValue {
    /// Whether the value has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// A single write.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    /// The JSON value to store.
    pub value: serde_json::Value,
    /// When set, the write only succeeds if the current version matches.
    /// Absent keys have version 0.
    pub expected_version: Option<i64>,
    /// Time of this write.
    pub written_at: DateTime<Utc>,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl WriteRequest {
    /// An unconditional, non-expiring write.
    #[must_use]
    pub fn new(value: serde_json::Value, written_at: DateTime<Utc>) -> Self {
        Self {
            value,
            expected_version: None,
            written_at,
            expires_at: None,
        }
    }

    /// Require the current version to equal `version`.
    #[must_use]
    pub fn expecting(mut self, version: Option<i64>) -> Self {
        self.expected_version = version;
        self
    }

    /// Expire the value at `at`.
    #[must_use]
    pub fn expiring_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }
}

/// Store trait for reading and writing JSON values by key.
///
/// Per-key `get`/`put` are the only atomic primitives. A `put` with an
/// expected version is a compare-and-set on that key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Load the value under `key`, treating values expired as of `now` as absent.
    async fn get(&self, key: &str, now: DateTime<Utc>) -> Result<Option<StoredValue>, DomainError>;

    /// Write a value, honoring the optional version precondition.
    ///
    /// Returns `DomainError::ConcurrencyConflict` when the precondition fails.
    async fn put(&self, key: &str, write: WriteRequest) -> Result<StoredValue, DomainError>;

    /// Remove the value under `key`. Returns whether anything was removed.
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Add `member` to the set under `key`. Returns whether it was new.
    async fn add_to_set(&self, key: &str, member: &str) -> Result<bool, DomainError>;

    /// All members of the set under `key`, sorted.
    async fn set_members(&self, key: &str) -> Result<Vec<String>, DomainError>;

    /// Remove the set under `key`. Returns how many members it had.
    async fn clear_set(&self, key: &str) -> Result<usize, DomainError>;

    /// Short name of the backend, for diagnostics.
    fn backend(&self) -> &'static str;
}
