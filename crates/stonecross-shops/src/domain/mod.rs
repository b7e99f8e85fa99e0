//! Domain model for the shop ledger context.

pub mod commands;
pub mod ledger;
