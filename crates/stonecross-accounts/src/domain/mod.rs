//! Domain model for the accounts context.

pub mod account;
pub mod commands;
pub mod password;
