//! Stored account records and their keys.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use stonecross_core::error::DomainError;
use stonecross_core::store::StoredValue;
use stonecross_core::token::to_hex;

const USER_KEY_PREFIX: &str = "stonecross:user:";
const SESSION_KEY_PREFIX: &str = "stonecross:session:";
const RESET_KEY_PREFIX: &str = "stonecross:pwreset:";
const USER_SESSIONS_KEY_PREFIX: &str = "stonecross:user-sessions:";

/// How long a password reset ticket stays valid.
pub const RESET_TICKET_TTL_SECS: i64 = 3600;

/// Default session lifetime: seven days.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Normalized username.
    pub username: String,
    /// Argon2 PHC string over the client-supplied password digest.
    pub password_verifier: String,
    pub created_at: DateTime<Utc>,
}

/// A server-issued session. Stored under the digest of its bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A pending password reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetTicket {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Key of the account record for `username`.
#[must_use]
pub fn user_key(username: &str) -> String {
    format!("{USER_KEY_PREFIX}{username}")
}

/// Key of the session behind `token`. The raw token is never stored.
#[must_use]
pub fn session_key(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{SESSION_KEY_PREFIX}{}", to_hex(&digest))
}

/// Key of the set holding the session keys issued to `username`.
#[must_use]
pub fn user_sessions_key(username: &str) -> String {
    format!("{USER_SESSIONS_KEY_PREFIX}{username}")
}

/// Key of the reset ticket `token`.
#[must_use]
pub fn reset_key(token: &str) -> String {
    format!("{RESET_KEY_PREFIX}{token}")
}

/// Decodes a stored record.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the value does not decode.
pub fn decode<T: DeserializeOwned>(key: &str, stored: StoredValue) -> Result<T, DomainError> {
    serde_json::from_value(stored.value)
        .map_err(|e| DomainError::Infrastructure(format!("stored record {key} is unreadable: {e}")))
}

/// Encodes a record for storage.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if serialization fails.
pub fn encode<T: Serialize>(record: &T) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(record)
        .map_err(|e| DomainError::Infrastructure(format!("record serialization failed: {e}")))
}
