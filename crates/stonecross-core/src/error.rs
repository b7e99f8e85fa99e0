//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A resource with the same identity already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on {key}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The storage key that had the conflict.
        key: String,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// The caller presented no identity, or an identity that did not check out.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The caller is known but may not perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
