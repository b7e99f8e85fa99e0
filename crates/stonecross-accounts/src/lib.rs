//! Stonecross: Accounts bounded context.
//!
//! Responsible for user accounts, server-issued bearer sessions, and
//! operator-initiated password resets.

pub mod application;
pub mod domain;
