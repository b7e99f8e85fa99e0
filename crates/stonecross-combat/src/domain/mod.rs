//! Domain model for the combat context.

pub mod combatant;
pub mod commands;
pub mod encounter;
pub mod ordering;
pub mod visibility;
