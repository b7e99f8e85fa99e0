//! Room-scoped typed documents.
//!
//! Every shared feature (map unlocks, NPC directory, shop ledger, pantheon,
//! encounter) is one JSON document per room. This module holds the single
//! get-or-seed / validate / normalize / put path they all go through.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::room::Room;
use crate::store::{KeyValueStore, StoredValue, WriteRequest};

/// How many times an unconditioned write re-reads and re-applies its update
/// after losing a race with another writer.
const MAX_WRITE_ATTEMPTS: usize = 3;

/// A typed document that lives under one key per room.
pub trait RoomDocument: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Storage namespace; the key is `<NAMESPACE>:<room>`.
    const NAMESPACE: &'static str;

    /// What a writer sends: a full replacement, an operation, or a command.
    type Update: DeserializeOwned + Clone + fmt::Debug + Send + Sync;

    /// The document written on first read, if any.
    fn seed() -> Option<Self> {
        None
    }

    /// Validates and normalizes `update`, merging it with `current`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for malformed input. No write
    /// happens when this fails.
    fn apply_update(
        current: Option<&Self>,
        update: Self::Update,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError>;
}

/// A document body with its server-assigned stamp and version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// The document body.
    #[serde(flatten)]
    pub body: T,
    /// Time of the last write.
    pub last_updated_at: DateTime<Utc>,
    /// Write count, used as the optimistic-concurrency precondition.
    pub version: i64,
}

fn decode<D: RoomDocument>(key: &str, stored: StoredValue) -> Result<Versioned<D>, DomainError> {
    let body: D = serde_json::from_value(stored.value).map_err(|e| {
        DomainError::Infrastructure(format!("stored document {key} is unreadable: {e}"))
    })?;
    Ok(Versioned {
        body,
        last_updated_at: stored.updated_at,
        version: stored.version,
    })
}

fn encode<D: RoomDocument>(body: &D) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(body)
        .map_err(|e| DomainError::Infrastructure(format!("document serialization failed: {e}")))
}

/// Reads the document for `room`, writing the seed first if there is none.
///
/// Returns `None` when nothing is stored and `D` has no seed.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails or the stored
/// value does not decode.
pub async fn read_document<D: RoomDocument>(
    store: &dyn KeyValueStore,
    room: &Room,
    now: DateTime<Utc>,
) -> Result<Option<Versioned<D>>, DomainError> {
    let key = room.storage_key(D::NAMESPACE);
    if let Some(stored) = store.get(&key, now).await? {
        return decode(&key, stored).map(Some);
    }

    let Some(seed) = D::seed() else {
        return Ok(None);
    };
    let write = WriteRequest::new(encode(&seed)?, now).expecting(Some(0));
    match store.put(&key, write).await {
        Ok(stored) => decode(&key, stored).map(Some),
        // Another reader seeded it first.
        Err(DomainError::ConcurrencyConflict { .. }) => store
            .get(&key, now)
            .await?
            .map(|stored| decode(&key, stored))
            .transpose(),
        Err(e) => Err(e),
    }
}

/// Applies `update` to the document for `room` and persists the result.
///
/// With `expected_version`, the write is rejected with
/// `DomainError::ConcurrencyConflict` if the document moved on. Without it,
/// the update is re-applied on top of any concurrent write.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the update is rejected,
/// `DomainError::ConcurrencyConflict` on a stale precondition, or
/// `DomainError::Infrastructure` if the store fails.
pub async fn write_document<D: RoomDocument>(
    store: &dyn KeyValueStore,
    room: &Room,
    update: D::Update,
    expected_version: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Versioned<D>, DomainError> {
    let key = room.storage_key(D::NAMESPACE);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let current = match store.get(&key, now).await? {
            Some(stored) => Some(decode::<D>(&key, stored)?),
            None => None,
        };
        let current_version = current.as_ref().map_or(0, |doc| doc.version);

        if let Some(expected) = expected_version {
            if expected != current_version {
                return Err(DomainError::ConcurrencyConflict {
                    key,
                    expected,
                    actual: current_version,
                });
            }
        }

        let body = D::apply_update(current.as_ref().map(|doc| &doc.body), update.clone(), now)?;
        let write = WriteRequest::new(encode(&body)?, now).expecting(Some(current_version));

        match store.put(&key, write).await {
            Ok(stored) => return decode(&key, stored),
            Err(DomainError::ConcurrencyConflict { .. })
                if expected_version.is_none() && attempt < MAX_WRITE_ATTEMPTS => {}
            Err(e) => return Err(e),
        }
    }
}
