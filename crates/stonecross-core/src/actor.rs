//! Authenticated caller identity.

use crate::error::DomainError;

/// Normalizes a username: trimmed and lower-cased.
#[must_use]
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// The configured operator (DM) identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator(String);

impl Operator {
    /// Creates the operator identity from a configured username.
    #[must_use]
    pub fn new(username: &str) -> Self {
        Self(normalize_username(username))
    }

    /// The normalized operator username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.0
    }

    /// Whether `username` names the operator.
    #[must_use]
    pub fn is(&self, username: &str) -> bool {
        normalize_username(username) == self.0
    }
}

/// A caller whose identity was established by a server-issued session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Normalized username.
    pub username: String,
    /// Whether this caller is the operator.
    pub is_operator: bool,
}

impl Actor {
    /// Builds an actor, deciding the operator role against `operator`.
    #[must_use]
    pub fn new(username: &str, operator: &Operator) -> Self {
        let username = normalize_username(username);
        let is_operator = operator.is(&username);
        Self {
            username,
            is_operator,
        }
    }

    /// Fails with `Forbidden` unless this actor is the operator.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Forbidden` for non-operators.
    pub fn require_operator(&self) -> Result<(), DomainError> {
        if self.is_operator {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!(
                "{} is not the operator",
                self.username
            )))
        }
    }
}
