//! Stonecross: World state bounded context.
//!
//! Responsible for the shared picture of the campaign world: which towns are
//! unlocked on the map, who lives where, and which old gods the party knows.

pub mod application;
pub mod domain;
