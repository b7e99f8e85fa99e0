//! Query handlers for the accounts context.

use stonecross_core::actor::{Actor, Operator};
use stonecross_core::clock::Clock;
use stonecross_core::error::DomainError;
use stonecross_core::store::KeyValueStore;

use crate::domain::account::{Session, decode, session_key};

/// Resolves a bearer token to the caller it was issued to.
///
/// # Errors
///
/// Returns `DomainError::Unauthenticated` if the token is empty, unknown or
/// expired, or `DomainError::Infrastructure` if the store fails.
pub async fn resolve_session(
    token: &str,
    operator: &Operator,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<Actor, DomainError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DomainError::Unauthenticated("missing bearer token".into()));
    }
    let now = clock.now();
    let key = session_key(token);
    let Some(stored) = store.get(&key, now).await? else {
        return Err(DomainError::Unauthenticated("session unknown or expired".into()));
    };
    let session: Session = decode(&key, stored)?;
    if session.expires_at <= now {
        return Err(DomainError::Unauthenticated("session unknown or expired".into()));
    }
    Ok(Actor::new(&session.username, operator))
}
