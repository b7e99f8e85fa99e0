//! Shared test mocks and utilities for the Stonecross campaign companion.

mod clock;
mod store;
mod token;

pub use clock::{FixedClock, fixed_now};
pub use store::FailingStore;
pub use token::{CountingTokens, ScriptedTokens};
