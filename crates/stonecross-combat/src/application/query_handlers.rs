//! Query handlers for the combat context.

use chrono::{DateTime, Utc};
use serde::Serialize;
use stonecross_core::actor::Actor;
use stonecross_core::clock::Clock;
use stonecross_core::document::{Versioned, read_document};
use stonecross_core::error::DomainError;
use stonecross_core::room::Room;
use stonecross_core::store::KeyValueStore;

use crate::domain::combatant::Combatant;
use crate::domain::encounter::Encounter;
use crate::domain::visibility::CombatVisibility;

/// Read-only view of an encounter with the combatants already in turn order.
#[derive(Debug, Clone, Serialize)]
pub struct EncounterView {
    /// Current round.
    pub round: u32,
    /// Index of the active combatant in `combatants`.
    pub turn: usize,
    /// Id of the active combatant.
    pub active_id: Option<String>,
    /// Combatants in initiative order.
    pub combatants: Vec<Combatant>,
    /// Time of the last write.
    pub last_updated_at: DateTime<Utc>,
    /// Write count; send it back as the precondition.
    pub version: i64,
}

impl From<Versioned<Encounter>> for EncounterView {
    fn from(doc: Versioned<Encounter>) -> Self {
        let encounter = doc.body.normalized();
        let active_id = encounter.active().map(|c| c.id.clone());
        let combatants = encounter.ordered().into_iter().cloned().collect();
        Self {
            round: encounter.round,
            turn: encounter.turn,
            active_id,
            combatants,
            last_updated_at: doc.last_updated_at,
            version: doc.version,
        }
    }
}

/// Retrieves the encounter for `room`, or `None` if none was started.
///
/// # Errors
///
/// Returns `DomainError::Forbidden` if `visibility` hides the encounter from
/// `actor`, or `DomainError::Infrastructure` if the store fails.
pub async fn get_encounter(
    room: &Room,
    actor: &Actor,
    visibility: CombatVisibility,
    clock: &dyn Clock,
    store: &dyn KeyValueStore,
) -> Result<Option<EncounterView>, DomainError> {
    visibility.authorize_read(actor)?;
    let doc = read_document::<Encounter>(store, room, clock.now()).await?;
    Ok(doc.map(EncounterView::from))
}
