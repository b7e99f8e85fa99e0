//! Command handlers for the accounts context.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use stonecross_core::actor::{Actor, Operator, normalize_username};
use stonecross_core::clock::Clock;
use stonecross_core::command::Command;
use stonecross_core::error::DomainError;
use stonecross_core::store::{KeyValueStore, WriteRequest};
use stonecross_core::token::TokenSource;
use tracing::info;

use crate::domain::account::{
    RESET_TICKET_TTL_SECS, ResetTicket, Session, UserAccount, decode, encode, reset_key,
    session_key, user_key, user_sessions_key,
};
use crate::domain::commands::{LogIn, LogOut, RequestPasswordReset, ResetPassword, SignUp};
use crate::domain::password::{hash_password_digest, verify_password_digest};

/// Result of a successful sign-up.
#[derive(Debug, Clone, Serialize)]
pub struct SignedUp {
    pub username: String,
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoggedIn {
    pub username: String,
    /// Bearer token for subsequent requests.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Whether this user is the operator (DM).
    pub is_operator: bool,
}

/// Result of a reset request.
#[derive(Debug, Clone, Serialize)]
pub struct ResetTicketIssued {
    pub token: String,
    pub username: String,
    pub expires_in_seconds: i64,
}

/// Result of a completed reset.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordReset {
    pub username: String,
}

fn required_username(raw: &str) -> Result<String, DomainError> {
    let username = normalize_username(raw);
    if username.is_empty() {
        return Err(DomainError::Validation("missing_username".into()));
    }
    Ok(username)
}

fn required_digest(raw: &str) -> Result<&str, DomainError> {
    if raw.is_empty() {
        return Err(DomainError::Validation("missing_password_hash".into()));
    }
    Ok(raw)
}

async fn load_user(
    store: &dyn KeyValueStore,
    username: &str,
    now: DateTime<Utc>,
) -> Result<Option<(UserAccount, i64)>, DomainError> {
    let key = user_key(username);
    match store.get(&key, now).await? {
        Some(stored) => {
            let version = stored.version;
            Ok(Some((decode(&key, stored)?, version)))
        }
        None => Ok(None),
    }
}

/// Handles [`SignUp`].
///
/// # Errors
///
/// Returns `DomainError::Validation` for a missing username or digest,
/// `DomainError::AlreadyExists` if the username is taken, or
/// `DomainError::Infrastructure` if hashing or the store fails.
pub async fn handle_sign_up(
    command: &SignUp,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<SignedUp, DomainError> {
    let username = required_username(&command.username)?;
    let digest = required_digest(&command.password_hash)?;

    let account = UserAccount {
        username: username.clone(),
        password_verifier: hash_password_digest(digest)?,
        created_at: clock.now(),
    };
    let write = WriteRequest::new(encode(&account)?, clock.now()).expecting(Some(0));
    match store.put(&user_key(&username), write).await {
        Ok(_) => {}
        Err(DomainError::ConcurrencyConflict { .. }) => {
            return Err(DomainError::AlreadyExists("user_exists".into()));
        }
        Err(e) => return Err(e),
    }

    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        username = %username,
        "account created"
    );
    Ok(SignedUp { username })
}

/// Handles [`LogIn`]: verifies the digest and issues a session that expires
/// after `session_ttl`.
///
/// # Errors
///
/// Returns `DomainError::Validation` for missing fields,
/// `DomainError::NotFound` for an unknown user,
/// `DomainError::Unauthenticated` for a wrong password, or
/// `DomainError::Infrastructure` if the store fails or the expiry is out of
/// range.
pub async fn handle_log_in(
    command: &LogIn,
    operator: &Operator,
    session_ttl: Duration,
    clock: &dyn Clock,
    tokens: &dyn TokenSource,
    store: &dyn KeyValueStore,
) -> Result<LoggedIn, DomainError> {
    let username = required_username(&command.username)?;
    let digest = required_digest(&command.password_hash)?;
    let now = clock.now();

    let Some((account, _)) = load_user(store, &username, now).await? else {
        return Err(DomainError::NotFound("not_found".into()));
    };
    if !verify_password_digest(digest, &account.password_verifier)? {
        return Err(DomainError::Unauthenticated("bad_password".into()));
    }

    let expires_at = now
        .checked_add_signed(session_ttl)
        .ok_or_else(|| DomainError::Infrastructure("session lifetime is out of range".into()))?;
    let token = tokens.next_token();
    let session = Session {
        username: account.username.clone(),
        issued_at: now,
        expires_at,
    };
    let key = session_key(&token);
    let write = WriteRequest::new(encode(&session)?, now).expiring_at(expires_at);
    store.put(&key, write).await?;
    store
        .add_to_set(&user_sessions_key(&account.username), &key)
        .await?;

    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        username = %account.username,
        expires_at = %session.expires_at,
        "session issued"
    );
    Ok(LoggedIn {
        is_operator: operator.is(&account.username),
        username: account.username,
        token,
        expires_at: session.expires_at,
    })
}

/// Handles [`LogOut`]. Returns whether a session was removed.
///
/// # Errors
///
/// Returns `DomainError::Unauthenticated` without a token, or
/// `DomainError::Infrastructure` if the store fails.
pub async fn handle_log_out(command: &LogOut, store: &dyn KeyValueStore) -> Result<bool, DomainError> {
    let token = command.token.trim();
    if token.is_empty() {
        return Err(DomainError::Unauthenticated("missing bearer token".into()));
    }
    let removed = store.delete(&session_key(token)).await?;
    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        removed,
        "session ended"
    );
    Ok(removed)
}

/// Handles [`RequestPasswordReset`]: the operator issues a one-hour ticket
/// for another user.
///
/// # Errors
///
/// Returns `DomainError::Forbidden` for non-operators,
/// `DomainError::Validation` for a missing username,
/// `DomainError::NotFound` for an unknown user, or
/// `DomainError::Infrastructure` if the store fails.
pub async fn handle_request_password_reset(
    command: &RequestPasswordReset,
    actor: &Actor,
    clock: &dyn Clock,
    tokens: &dyn TokenSource,
    store: &dyn KeyValueStore,
) -> Result<ResetTicketIssued, DomainError> {
    actor.require_operator()?;
    let username = required_username(&command.username)?;
    let now = clock.now();

    if load_user(store, &username, now).await?.is_none() {
        return Err(DomainError::NotFound("not_found".into()));
    }

    let token = tokens.next_token();
    let ticket = ResetTicket {
        username: username.clone(),
        created_at: now,
    };
    let write = WriteRequest::new(encode(&ticket)?, now)
        .expiring_at(now + Duration::seconds(RESET_TICKET_TTL_SECS));
    store.put(&reset_key(&token), write).await?;

    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        username = %username,
        requested_by = %actor.username,
        "password reset ticket issued"
    );
    Ok(ResetTicketIssued {
        token,
        username,
        expires_in_seconds: RESET_TICKET_TTL_SECS,
    })
}

/// Handles [`ResetPassword`]: replaces the verifier, burns the ticket and ends
/// the user's existing sessions.
///
/// # Errors
///
/// Returns `DomainError::Validation` for missing fields or an unknown or
/// expired ticket, `DomainError::NotFound` if the user is gone,
/// `DomainError::ConcurrencyConflict` if the account changed concurrently, or
/// `DomainError::Infrastructure` if the store fails.
pub async fn handle_reset_password(
    command: &ResetPassword,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<PasswordReset, DomainError> {
    let token = command.token.trim();
    if token.is_empty() {
        return Err(DomainError::Validation("missing_token".into()));
    }
    let digest = required_digest(&command.password_hash)?;
    let now = clock.now();

    let ticket_key = reset_key(token);
    let ticket: ResetTicket = match store.get(&ticket_key, now).await? {
        Some(stored) => decode(&ticket_key, stored)?,
        None => return Err(DomainError::Validation("invalid_or_expired".into())),
    };
    let username = normalize_username(&ticket.username);
    let Some((mut account, version)) = load_user(store, &username, now).await? else {
        return Err(DomainError::NotFound("not_found".into()));
    };

    account.password_verifier = hash_password_digest(digest)?;
    let write = WriteRequest::new(encode(&account)?, now).expecting(Some(version));
    store.put(&user_key(&username), write).await?;
    store.delete(&ticket_key).await?;
    let revoked = revoke_sessions(store, &username).await?;

    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        username = %username,
        revoked,
        "password reset"
    );
    Ok(PasswordReset { username })
}

/// Ends every session issued to `username`. Returns how many were live.
async fn revoke_sessions(store: &dyn KeyValueStore, username: &str) -> Result<usize, DomainError> {
    let sessions_key = user_sessions_key(username);
    let mut revoked = 0;
    for key in store.set_members(&sessions_key).await? {
        if store.delete(&key).await? {
            revoked += 1;
        }
    }
    store.clear_set(&sessions_key).await?;
    Ok(revoked)
}
