//! In-process implementation of the `KeyValueStore` trait.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stonecross_core::error::DomainError;
use stonecross_core::store::{KeyValueStore, StoredValue, WriteRequest};

/// Key-value store held in process memory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredValue>>,
    sets: Mutex<HashMap<String, BTreeSet<String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, DomainError> {
    mutex
        .lock()
        .map_err(|_| DomainError::Infrastructure("memory store lock poisoned".into()))
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str, now: DateTime<Utc>) -> Result<Option<StoredValue>, DomainError> {
        let entries = lock(&self.entries)?;
        Ok(entries
            .get(key)
            .filter(|stored| !stored.is_expired(now))
            .cloned())
    }

    async fn put(&self, key: &str, write: WriteRequest) -> Result<StoredValue, DomainError> {
        let mut entries = lock(&self.entries)?;
        let actual = entries
            .get(key)
            .filter(|stored| !stored.is_expired(write.written_at))
            .map_or(0, |stored| stored.version);

        if let Some(expected) = write.expected_version {
            if expected != actual {
                return Err(DomainError::ConcurrencyConflict {
                    key: key.to_owned(),
                    expected,
                    actual,
                });
            }
        }

        let stored = StoredValue {
            value: write.value,
            version: actual + 1,
            updated_at: write.written_at,
            expires_at: write.expires_at,
        };
        entries.insert(key.to_owned(), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(lock(&self.entries)?.remove(key).is_some())
    }

    async fn add_to_set(&self, key: &str, member: &str) -> Result<bool, DomainError> {
        Ok(lock(&self.sets)?
            .entry(key.to_owned())
            .or_default()
            .insert(member.to_owned()))
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, DomainError> {
        Ok(lock(&self.sets)?
            .get(key)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn clear_set(&self, key: &str) -> Result<usize, DomainError> {
        Ok(lock(&self.sets)?.remove(key).map_or(0, |members| members.len()))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
