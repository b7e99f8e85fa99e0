//! Stonecross Core: shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that all bounded
//! contexts depend on: time and token seams, the domain error, actor
//! identity, room names, the key-value store contract, and the generic
//! room-scoped document. It contains no infrastructure code.

pub mod actor;
pub mod clock;
pub mod command;
pub mod document;
pub mod error;
pub mod room;
pub mod store;
pub mod token;
