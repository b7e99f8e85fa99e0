//! Domain model for the world state context.

pub mod commands;
pub mod map_unlocks;
pub mod npcs;
pub mod pantheon;
pub mod towns;
