//! Test token sources: deterministic `TokenSource` implementations for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use stonecross_core::token::TokenSource;

/// Returns tokens from a predetermined list. Panics if the list is exhausted.
#[derive(Debug)]
pub struct ScriptedTokens {
    tokens: Mutex<std::vec::IntoIter<String>>,
}

impl ScriptedTokens {
    /// Create a new `ScriptedTokens` with the given tokens.
    #[must_use]
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        Self {
            tokens: Mutex::new(tokens.into_iter()),
        }
    }
}

impl TokenSource for ScriptedTokens {
    fn next_token(&self) -> String {
        self.tokens
            .lock()
            .unwrap()
            .next()
            .expect("ScriptedTokens: ran out of tokens")
    }
}

/// Returns `token-1`, `token-2`, ... without end. Suitable for tests that
/// only need tokens to be distinct.
#[derive(Debug, Default)]
pub struct CountingTokens {
    issued: AtomicU64,
}

impl TokenSource for CountingTokens {
    fn next_token(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        format!("token-{n}")
    }
}
