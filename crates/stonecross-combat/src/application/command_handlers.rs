//! Command handlers for the combat context.
//!
//! Load the room's encounter, execute the operator's command, persist the
//! result with the caller's version precondition.

use stonecross_core::actor::Actor;
use stonecross_core::clock::Clock;
use stonecross_core::command::Command;
use stonecross_core::document::{Versioned, write_document};
use stonecross_core::error::DomainError;
use stonecross_core::store::KeyValueStore;
use tracing::info;

use crate::domain::commands::ApplyEncounterCommand;
use crate::domain::encounter::Encounter;

/// Handles an [`ApplyEncounterCommand`]: checks the caller is the operator,
/// then applies the command to the room's encounter.
///
/// # Errors
///
/// Returns `DomainError::Forbidden` for non-operators,
/// `DomainError::Validation` / `DomainError::NotFound` from the command,
/// `DomainError::ConcurrencyConflict` on a stale version, or
/// `DomainError::Infrastructure` if the store fails.
pub async fn handle_encounter_command(
    command: &ApplyEncounterCommand,
    actor: &Actor,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<Versioned<Encounter>, DomainError> {
    actor.require_operator()?;

    let encounter = write_document::<Encounter>(
        store,
        &command.room,
        command.command.clone(),
        command.expected_version,
        clock.now(),
    )
    .await?;

    info!(
        correlation_id = %command.correlation_id(),
        room = %command.room,
        command_type = command.command_type(),
        version = encounter.version,
        "encounter updated"
    );
    Ok(encounter)
}
