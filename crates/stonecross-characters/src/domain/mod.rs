//! Domain model for the character sheets context.

pub mod commands;
pub mod sheet;
