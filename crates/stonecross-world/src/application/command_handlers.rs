//! Command handlers for the world state context.
//!
//! Every world document is written by the operator only; the handlers check
//! that, then hand the update to the shared document path.

use stonecross_core::actor::Actor;
use stonecross_core::clock::Clock;
use stonecross_core::command::{Command, UpdateDocument};
use stonecross_core::document::{RoomDocument, Versioned, write_document};
use stonecross_core::error::DomainError;
use stonecross_core::store::KeyValueStore;
use tracing::info;

use crate::domain::commands::{UpdateMapUnlocks, UpdateNpcDirectory, UpdatePantheon};
use crate::domain::map_unlocks::MapUnlocks;
use crate::domain::npcs::NpcDirectory;
use crate::domain::pantheon::Pantheon;

async fn update_world_document<D: RoomDocument>(
    command: &UpdateDocument<D>,
    actor: &Actor,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<Versioned<D>, DomainError> {
    actor.require_operator()?;
    let doc = write_document::<D>(
        store,
        &command.room,
        command.update.clone(),
        command.expected_version,
        clock.now(),
    )
    .await?;
    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        room = %command.room,
        version = doc.version,
        "world document updated"
    );
    Ok(doc)
}

/// Handles [`UpdateMapUnlocks`].
///
/// # Errors
///
/// Returns `DomainError::Forbidden` for non-operators,
/// `DomainError::Validation` for unknown towns or operations,
/// `DomainError::ConcurrencyConflict` on a stale version, or
/// `DomainError::Infrastructure` if the store fails.
pub async fn handle_update_map_unlocks(
    command: &UpdateMapUnlocks,
    actor: &Actor,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<Versioned<MapUnlocks>, DomainError> {
    update_world_document(command, actor, clock, store).await
}

/// Handles [`UpdateNpcDirectory`].
///
/// # Errors
///
/// Same as [`handle_update_map_unlocks`]; invalid upserts, deletes without
/// an id and unknown operations are `DomainError::Validation`.
pub async fn handle_update_npc_directory(
    command: &UpdateNpcDirectory,
    actor: &Actor,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<Versioned<NpcDirectory>, DomainError> {
    update_world_document(command, actor, clock, store).await
}

/// Handles [`UpdatePantheon`].
///
/// # Errors
///
/// Same as [`handle_update_map_unlocks`]; a god without a name is
/// `DomainError::Validation`.
pub async fn handle_update_pantheon(
    command: &UpdatePantheon,
    actor: &Actor,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<Versioned<Pantheon>, DomainError> {
    update_world_document(command, actor, clock, store).await
}
