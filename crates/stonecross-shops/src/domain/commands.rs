//! Commands for the shop ledger context.

use stonecross_core::command::UpdateDocument;

use super::ledger::ShopLedger;

/// Replace a room's shop ledger.
pub type UpdateShopLedger = UpdateDocument<ShopLedger>;
