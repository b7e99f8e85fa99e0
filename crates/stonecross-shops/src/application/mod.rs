//! Application layer for the shop ledger context.

pub mod command_handlers;
pub mod query_handlers;
