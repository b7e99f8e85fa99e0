//! Application layer for the character sheets context.

pub mod command_handlers;
pub mod query_handlers;
