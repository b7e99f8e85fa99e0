//! Stonecross: Combat initiative tracker bounded context.
//!
//! Responsible for the encounter document: combatants, initiative order,
//! the turn cursor and the round counter.

pub mod application;
pub mod domain;
