//! Token source abstraction for determinism.
//!
//! In production, this wraps the thread-local CSPRNG. In tests, a scripted
//! implementation is injected so issued session and reset tokens are known
//! up front.

use std::fmt::Write as _;

use rand::RngCore;

/// Abstraction over opaque token generation.
pub trait TokenSource: Send + Sync {
    /// Generate a fresh opaque token.
    fn next_token(&self) -> String;
}

/// Production token source: 32 random bytes, hex encoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsTokenSource;

impl TokenSource for OsTokenSource {
    fn next_token(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        to_hex(&bytes)
    }
}

/// Lower-case hex encoding.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}
