//! Application layer for the world state context.

pub mod command_handlers;
pub mod query_handlers;
