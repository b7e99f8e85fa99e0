//! Query handlers for the world state context.
//!
//! Any signed-in participant may read these documents.

use stonecross_core::clock::Clock;
use stonecross_core::document::{Versioned, read_document};
use stonecross_core::error::DomainError;
use stonecross_core::room::Room;
use stonecross_core::store::KeyValueStore;

use crate::domain::map_unlocks::MapUnlocks;
use crate::domain::npcs::NpcDirectory;
use crate::domain::pantheon::Pantheon;

/// Retrieves a room's map unlocks, seeding them on first access.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn get_map_unlocks(
    room: &Room,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<Option<Versioned<MapUnlocks>>, DomainError> {
    read_document(store, room, clock.now()).await
}

/// Retrieves a room's NPC directory, seeding it empty on first access.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn get_npc_directory(
    room: &Room,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<Option<Versioned<NpcDirectory>>, DomainError> {
    read_document(store, room, clock.now()).await
}

/// Retrieves a room's pantheon, or `None` if it was never written.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn get_pantheon(
    room: &Room,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<Option<Versioned<Pantheon>>, DomainError> {
    read_document(store, room, clock.now()).await
}
