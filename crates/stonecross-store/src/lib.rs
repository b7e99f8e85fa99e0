//! Stonecross Store: key-value store backends.
//!
//! `MemoryStore` keeps everything in process and backs local runs and tests.
//! `PgStore` persists to PostgreSQL.

pub mod memory_store;
pub mod pg_store;

pub use memory_store::MemoryStore;
pub use pg_store::PgStore;
