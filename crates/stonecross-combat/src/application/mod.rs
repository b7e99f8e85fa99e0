//! Application layer for the combat context.

pub mod command_handlers;
pub mod query_handlers;
