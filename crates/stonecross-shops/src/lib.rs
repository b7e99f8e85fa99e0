//! Stonecross: Shop ledger bounded context.
//!
//! Responsible for the shops of each town, their stock and prices, and which
//! of them the players can see.

pub mod application;
pub mod domain;
