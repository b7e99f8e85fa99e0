//! Stonecross: Character sheets bounded context.
//!
//! Responsible for each player's character sheet and the roster of players
//! who have saved one.

pub mod application;
pub mod domain;
