//! Query handlers for the shop ledger context.

use stonecross_core::actor::Actor;
use stonecross_core::clock::Clock;
use stonecross_core::document::{Versioned, read_document};
use stonecross_core::error::DomainError;
use stonecross_core::room::Room;
use stonecross_core::store::KeyValueStore;

use crate::domain::ledger::ShopLedger;

/// Retrieves a room's shop ledger as `actor` may see it.
///
/// The operator sees every shop; players see only shops marked visible.
/// Either way shops come back in ledger order.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn get_shop_ledger(
    room: &Room,
    actor: &Actor,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<Option<Versioned<ShopLedger>>, DomainError> {
    let Some(doc) = read_document::<ShopLedger>(store, room, clock.now()).await? else {
        return Ok(None);
    };
    let mut body = if actor.is_operator {
        doc.body
    } else {
        doc.body.visible_to_players()
    };
    body.sort();
    Ok(Some(Versioned {
        body,
        last_updated_at: doc.last_updated_at,
        version: doc.version,
    }))
}
