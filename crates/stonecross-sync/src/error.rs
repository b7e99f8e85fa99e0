//! Synchronization error types.

use thiserror::Error;

/// Errors from talking to the server.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The request never got a response.
    #[error("request failed: {0}")]
    Request(String),

    /// The server rejected the write because the document moved on.
    #[error("document changed on the server")]
    Conflict,

    /// The server answered with an error status.
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the body, if any.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Conflicts kept happening after re-fetching.
    #[error("gave up after {attempts} conflicting attempts")]
    Exhausted {
        /// How many pushes were tried.
        attempts: usize,
    },
}
