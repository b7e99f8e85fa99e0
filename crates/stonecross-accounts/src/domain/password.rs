//! Password verifiers.
//!
//! Clients send a SHA-256 hex digest of the password. The server stores an
//! Argon2id hash of that digest, never the digest itself.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::RngCore;
use stonecross_core::error::DomainError;

/// Hashes a client password digest into a PHC string.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if hashing fails.
pub fn hash_password_digest(digest: &str) -> Result<String, DomainError> {
    let mut salt_bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| DomainError::Infrastructure(format!("salt encoding failed: {e}")))?;
    Argon2::default()
        .hash_password(digest.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::Infrastructure(format!("password hashing failed: {e}")))
}

/// Checks a client password digest against a stored PHC string.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the stored verifier is malformed.
pub fn verify_password_digest(digest: &str, verifier: &str) -> Result<bool, DomainError> {
    let parsed = PasswordHash::new(verifier)
        .map_err(|e| DomainError::Infrastructure(format!("stored password verifier is malformed: {e}")))?;
    Ok(Argon2::default()
        .verify_password(digest.as_bytes(), &parsed)
        .is_ok())
}
