//! Query handlers for the character sheets context.

use serde::Serialize;
use stonecross_core::actor::{Actor, Operator, normalize_username};
use stonecross_core::clock::Clock;
use stonecross_core::error::DomainError;
use stonecross_core::store::KeyValueStore;

use crate::domain::sheet::{ROSTER_KEY, sheet_key};

/// A sheet lookup result; `sheet` is `None` when nothing was saved.
#[derive(Debug, Clone, Serialize)]
pub struct SheetView {
    pub sheet: Option<serde_json::Value>,
}

/// The roster as the operator sees it.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerList {
    pub users: Vec<String>,
}

/// Retrieves the sheet owned by `username`.
///
/// Only the owner and the operator may read a sheet.
///
/// # Errors
///
/// Returns `DomainError::Validation` if no username was given,
/// `DomainError::Forbidden` for anyone else's sheet, or
/// `DomainError::Infrastructure` if the store fails.
pub async fn get_sheet(
    username: Option<&str>,
    actor: &Actor,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<SheetView, DomainError> {
    let username = normalize_username(username.unwrap_or_default());
    if username.is_empty() {
        return Err(DomainError::Validation("missing_username".into()));
    }
    if !actor.is_operator && actor.username != username {
        return Err(DomainError::Forbidden(format!(
            "{} may not read the sheet of {username}",
            actor.username
        )));
    }
    let stored = store.get(&sheet_key(&username), clock.now()).await?;
    Ok(SheetView {
        sheet: stored.map(|s| s.value).filter(|v| !v.is_null()),
    })
}

/// Lists the players who have saved a sheet, excluding the operator.
///
/// # Errors
///
/// Returns `DomainError::Forbidden` for non-operators, or
/// `DomainError::Infrastructure` if the store fails.
pub async fn list_players(
    actor: &Actor,
    operator: &Operator,
    store: &dyn KeyValueStore,
) -> Result<PlayerList, DomainError> {
    actor.require_operator()?;
    let mut users: Vec<String> = store
        .set_members(ROSTER_KEY)
        .await?
        .iter()
        .map(|member| normalize_username(member))
        .filter(|member| !member.is_empty() && !operator.is(member))
        .collect();
    users.sort();
    users.dedup();
    Ok(PlayerList { users })
}
