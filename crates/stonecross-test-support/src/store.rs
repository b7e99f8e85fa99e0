//! Test stores: `KeyValueStore` implementations for error-path tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stonecross_core::error::DomainError;
use stonecross_core::store::{KeyValueStore, StoredValue, WriteRequest};

/// A store that always returns an infrastructure error. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingStore;

fn refused() -> DomainError {
    DomainError::Infrastructure("connection refused".into())
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str, _now: DateTime<Utc>) -> Result<Option<StoredValue>, DomainError> {
        Err(refused())
    }

    async fn put(&self, _key: &str, _write: WriteRequest) -> Result<StoredValue, DomainError> {
        Err(refused())
    }

    async fn delete(&self, _key: &str) -> Result<bool, DomainError> {
        Err(refused())
    }

    async fn add_to_set(&self, _key: &str, _member: &str) -> Result<bool, DomainError> {
        Err(refused())
    }

    async fn set_members(&self, _key: &str) -> Result<Vec<String>, DomainError> {
        Err(refused())
    }

    async fn clear_set(&self, _key: &str) -> Result<usize, DomainError> {
        Err(refused())
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}
