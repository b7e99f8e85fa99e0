//! Command handlers for the character sheets context.

use stonecross_core::actor::Actor;
use stonecross_core::clock::Clock;
use stonecross_core::command::Command;
use stonecross_core::error::DomainError;
use stonecross_core::store::{KeyValueStore, WriteRequest};
use tracing::info;

use crate::domain::commands::SaveSheet;
use crate::domain::sheet::{ROSTER_KEY, sheet_key, validate_sheet};

/// Handles [`SaveSheet`]: stores the sheet under the caller's username and
/// adds non-operators to the roster.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the sheet is not a JSON object, or
/// `DomainError::Infrastructure` if the store fails.
pub async fn handle_save_sheet(
    command: &SaveSheet,
    actor: &Actor,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<(), DomainError> {
    validate_sheet(&command.sheet)?;

    let write = WriteRequest::new(command.sheet.clone(), clock.now());
    store.put(&sheet_key(&actor.username), write).await?;
    if !actor.is_operator {
        store.add_to_set(ROSTER_KEY, &actor.username).await?;
    }

    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        username = %actor.username,
        "character sheet saved"
    );
    Ok(())
}
