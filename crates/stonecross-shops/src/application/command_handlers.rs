//! Command handlers for the shop ledger context.

use stonecross_core::actor::Actor;
use stonecross_core::clock::Clock;
use stonecross_core::command::Command;
use stonecross_core::document::{Versioned, write_document};
use stonecross_core::error::DomainError;
use stonecross_core::store::KeyValueStore;
use tracing::info;

use crate::domain::commands::UpdateShopLedger;
use crate::domain::ledger::ShopLedger;

/// Handles [`UpdateShopLedger`]: operator-only full replacement.
///
/// # Errors
///
/// Returns `DomainError::Forbidden` for non-operators,
/// `DomainError::Validation` if a shop or item fails normalization,
/// `DomainError::ConcurrencyConflict` on a stale version, or
/// `DomainError::Infrastructure` if the store fails.
pub async fn handle_update_shop_ledger(
    command: &UpdateShopLedger,
    actor: &Actor,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<Versioned<ShopLedger>, DomainError> {
    actor.require_operator()?;
    let doc = write_document::<ShopLedger>(
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
        shops = doc.body.shops.len(),
        version = doc.version,
        "shop ledger updated"
    );
    Ok(doc)
}
