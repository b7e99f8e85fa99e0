//! The encounter document: round counter, turn cursor, combatants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stonecross_core::document::RoomDocument;
use stonecross_core::error::DomainError;
use uuid::Uuid;

use super::combatant::{Combatant, CombatantPatch};
use super::commands::EncounterCommand;
use super::ordering::initiative_order;

/// Storage namespace for encounters.
pub const ENCOUNTER_NAMESPACE: &str = "stonecross.combat.v1";

fn first_round() -> u32 {
    1
}

/// Combat tracker state for one room.
///
/// `turn` indexes the initiative order, not `combatants`. It is always a
/// valid index into that order, or 0 when there are no combatants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    /// Current round, starting at 1.
    #[serde(default = "first_round")]
    pub round: u32,
    /// Index of the active combatant in initiative order.
    #[serde(default)]
    pub turn: usize,
    /// Combatants in the order they were added.
    #[serde(default)]
    pub combatants: Vec<Combatant>,
}

impl Default for Encounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Encounter {
    /// An empty encounter at round 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            round: 1,
            turn: 0,
            combatants: Vec::new(),
        }
    }

    /// Restores the invariants on a value that came from storage.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.round = self.round.max(1);
        self.turn = match self.combatants.len() {
            0 => 0,
            len => self.turn.min(len - 1),
        };
        self
    }

    /// Combatants in initiative order.
    #[must_use]
    pub fn ordered(&self) -> Vec<&Combatant> {
        initiative_order(&self.combatants)
    }

    /// The combatant whose turn it is.
    #[must_use]
    pub fn active(&self) -> Option<&Combatant> {
        self.ordered().get(self.turn).copied()
    }

    fn active_id(&self) -> Option<String> {
        self.active().map(|c| c.id.clone())
    }

    /// Moves to the next combatant. Past the last one, wraps to the first
    /// and starts the next round. No-op without combatants.
    pub fn advance_turn(&mut self) {
        let len = self.combatants.len();
        if len == 0 {
            return;
        }
        self.turn += 1;
        if self.turn >= len {
            self.turn = 0;
            self.round += 1;
        }
    }

    /// Moves to the previous combatant. Before the first one, wraps to the
    /// last and steps the round back, never below 1. No-op without combatants.
    pub fn retreat_turn(&mut self) {
        let len = self.combatants.len();
        if len == 0 {
            return;
        }
        if self.turn == 0 {
            self.turn = len - 1;
            self.round = self.round.saturating_sub(1).max(1);
        } else {
            self.turn -= 1;
        }
    }

    /// Starts a new round at the top of the order, wherever the cursor was.
    /// No-op without combatants.
    pub fn start_new_round(&mut self) {
        if self.combatants.is_empty() {
            return;
        }
        self.turn = 0;
        self.round += 1;
    }

    /// Makes `id` the active combatant. No-op if it is not in the encounter.
    pub fn focus(&mut self, id: &str) {
        if let Some(index) = self.ordered().iter().position(|c| c.id == id) {
            self.turn = index;
        }
    }

    /// Adds a combatant; whoever was active stays active.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyExists` if the id is taken.
    pub fn add_combatant(&mut self, combatant: Combatant) -> Result<(), DomainError> {
        if self.combatants.iter().any(|c| c.id == combatant.id) {
            return Err(DomainError::AlreadyExists(format!(
                "combatant {}",
                combatant.id
            )));
        }
        let preserve = self.active_id();
        self.combatants.push(combatant);
        self.rederive_cursor(preserve.as_deref());
        Ok(())
    }

    /// Edits a combatant; whoever was active stays active even if the edit
    /// moves them in the order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown id and
    /// `DomainError::Validation` for a bad patch.
    pub fn update_combatant(&mut self, id: &str, patch: CombatantPatch) -> Result<(), DomainError> {
        let preserve = self.active_id();
        let combatant = self
            .combatants
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("combatant {id}")))?;
        combatant.apply_patch(patch)?;
        self.rederive_cursor(preserve.as_deref());
        Ok(())
    }

    /// Removes a combatant. If it was active, the cursor stays where it was,
    /// clamped into range; otherwise the active combatant stays active.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown id.
    pub fn remove_combatant(&mut self, id: &str) -> Result<(), DomainError> {
        let active = self.active_id();
        let index = self
            .combatants
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("combatant {id}")))?;
        self.combatants.remove(index);
        let preserve = active.filter(|active_id| active_id != id);
        self.rederive_cursor(preserve.as_deref());
        Ok(())
    }

    /// Clears everything back to round 1.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn rederive_cursor(&mut self, preserve: Option<&str>) {
        let len = self.combatants.len();
        if len == 0 {
            self.turn = 0;
            return;
        }
        self.turn = match preserve {
            Some(id) => self
                .ordered()
                .iter()
                .position(|c| c.id == id)
                .unwrap_or(0),
            None => self.turn.min(len - 1),
        };
    }

    /// Executes an operator command, using `new_id` for added combatants
    /// that arrive without one.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying operation.
    pub fn execute(
        &mut self,
        command: EncounterCommand,
        new_id: impl FnOnce() -> String,
    ) -> Result<(), DomainError> {
        match command {
            EncounterCommand::AddCombatant { combatant } => {
                self.add_combatant(Combatant::create(combatant, new_id)?)
            }
            EncounterCommand::UpdateCombatant { id, patch } => self.update_combatant(&id, patch),
            EncounterCommand::RemoveCombatant { id } => self.remove_combatant(&id),
            EncounterCommand::AdvanceTurn => {
                self.advance_turn();
                Ok(())
            }
            EncounterCommand::RetreatTurn => {
                self.retreat_turn();
                Ok(())
            }
            EncounterCommand::StartNewRound => {
                self.start_new_round();
                Ok(())
            }
            EncounterCommand::FocusCombatant { id } => {
                self.focus(&id);
                Ok(())
            }
            EncounterCommand::Reset => {
                self.reset();
                Ok(())
            }
        }
    }
}

impl RoomDocument for Encounter {
    const NAMESPACE: &'static str = ENCOUNTER_NAMESPACE;
    type Update = EncounterCommand;

    fn apply_update(
        current: Option<&Self>,
        update: Self::Update,
        _now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let mut encounter = current.cloned().unwrap_or_default().normalized();
        encounter.execute(update, || Uuid::new_v4().to_string())?;
        Ok(encounter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::combatant::NewCombatant;

    fn combatant(id: &str, name: &str, initiative: i32) -> Combatant {
        Combatant::create(
            NewCombatant {
                id: Some(id.to_owned()),
                name: name.to_owned(),
                initiative,
                ..NewCombatant::default()
            },
            String::new,
        )
        .unwrap()
    }

    /// Three combatants in order C(10), A(5), B(5).
    fn three() -> Encounter {
        let mut encounter = Encounter::new();
        encounter.add_combatant(combatant("b", "B", 5)).unwrap();
        encounter.add_combatant(combatant("a", "A", 5)).unwrap();
        encounter.add_combatant(combatant("c", "C", 10)).unwrap();
        encounter.focus("c");
        encounter
    }

    fn active_name(encounter: &Encounter) -> &str {
        encounter.active().map(|c| c.name.as_str()).unwrap_or_default()
    }

    #[test]
    fn test_new_encounter_starts_at_round_one() {
        let encounter = Encounter::new();

        assert_eq!(encounter.round, 1);
        assert_eq!(encounter.turn, 0);
        assert!(encounter.active().is_none());
    }

    #[test]
    fn test_advance_moves_to_next_combatant() {
        let mut encounter = three();

        encounter.advance_turn();

        assert_eq!(encounter.turn, 1);
        assert_eq!(active_name(&encounter), "A");
        assert_eq!(encounter.round, 1);
    }

    #[test]
    fn test_advance_past_last_wraps_and_increments_round() {
        // Arrange
        let mut encounter = three();
        encounter.turn = 2;

        // Act
        encounter.advance_turn();

        // Assert
        assert_eq!(encounter.turn, 0);
        assert_eq!(encounter.round, 2);
    }

    #[test]
    fn test_retreat_before_first_wraps_and_decrements_round() {
        // Arrange
        let mut encounter = three();
        encounter.round = 2;
        encounter.turn = 0;

        // Act
        encounter.retreat_turn();

        // Assert
        assert_eq!(encounter.turn, 2);
        assert_eq!(encounter.round, 1);
    }

    #[test]
    fn test_retreat_in_round_one_keeps_round_one() {
        let mut encounter = three();
        encounter.turn = 0;

        encounter.retreat_turn();

        assert_eq!(encounter.turn, 2);
        assert_eq!(encounter.round, 1);
    }

    #[test]
    fn test_retreat_within_round_moves_back_one() {
        let mut encounter = three();
        encounter.turn = 2;

        encounter.retreat_turn();

        assert_eq!(encounter.turn, 1);
        assert_eq!(encounter.round, 1);
    }

    #[test]
    fn test_start_new_round_resets_cursor_from_anywhere() {
        let mut encounter = three();
        encounter.turn = 1;

        encounter.start_new_round();

        assert_eq!(encounter.turn, 0);
        assert_eq!(encounter.round, 2);
    }

    #[test]
    fn test_cursor_operations_are_noops_when_empty() {
        // Arrange
        let mut encounter = Encounter::new();

        // Act
        encounter.advance_turn();
        encounter.retreat_turn();
        encounter.start_new_round();
        encounter.focus("ghost");

        // Assert
        assert_eq!(encounter, Encounter::new());
    }

    #[test]
    fn test_focus_moves_cursor_to_combatant() {
        let mut encounter = three();

        encounter.focus("b");

        assert_eq!(encounter.turn, 2);
        assert_eq!(active_name(&encounter), "B");
    }

    #[test]
    fn test_focus_unknown_combatant_is_noop() {
        let mut encounter = three();
        encounter.turn = 1;

        encounter.focus("ghost");

        assert_eq!(encounter.turn, 1);
    }

    #[test]
    fn test_adding_to_empty_encounter_makes_it_active() {
        // Arrange
        let mut encounter = Encounter::new();

        // Act
        encounter
            .add_combatant(combatant("warg", "Frost Warg", 14))
            .unwrap();

        // Assert
        assert_eq!(encounter.round, 1);
        assert_eq!(encounter.turn, 0);
        assert_eq!(active_name(&encounter), "Frost Warg");
    }

    #[test]
    fn test_adding_ahead_of_active_combatant_preserves_identity() {
        // Arrange
        let mut encounter = Encounter::new();
        encounter
            .add_combatant(combatant("warg", "Frost Warg", 14))
            .unwrap();

        // Act
        encounter.add_combatant(combatant("aria", "Aria", 14)).unwrap();

        // Assert
        let order: Vec<&str> = encounter.ordered().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, vec!["Aria", "Frost Warg"]);
        assert_eq!(encounter.turn, 1);
        assert_eq!(active_name(&encounter), "Frost Warg");
    }

    #[test]
    fn test_adding_duplicate_id_is_rejected() {
        let mut encounter = three();

        let result = encounter.add_combatant(combatant("a", "Another A", 1));

        assert!(matches!(result, Err(DomainError::AlreadyExists(_))));
        assert_eq!(encounter.combatants.len(), 3);
    }

    #[test]
    fn test_edit_that_reorders_keeps_active_combatant() {
        // Arrange
        let mut encounter = three();
        encounter.focus("a");

        // Act
        encounter
            .update_combatant(
                "b",
                CombatantPatch {
                    initiative: Some(20),
                    ..CombatantPatch::default()
                },
            )
            .unwrap();

        // Assert
        let order: Vec<&str> = encounter.ordered().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
        assert_eq!(active_name(&encounter), "A");
        assert_eq!(encounter.turn, 2);
    }

    #[test]
    fn test_editing_unknown_combatant_is_not_found() {
        let mut encounter = three();

        let result = encounter.update_combatant("ghost", CombatantPatch::default());

        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[test]
    fn test_removing_inactive_combatant_preserves_active_identity() {
        let mut encounter = three();
        encounter.focus("b");

        encounter.remove_combatant("c").unwrap();

        assert_eq!(active_name(&encounter), "B");
        assert_eq!(encounter.turn, 1);
    }

    #[test]
    fn test_removing_active_last_combatant_clamps_cursor() {
        // Arrange
        let mut encounter = three();
        encounter.turn = 2;

        // Act
        encounter.remove_combatant("b").unwrap();

        // Assert
        assert_eq!(encounter.turn, 1);
        assert_eq!(active_name(&encounter), "A");
    }

    #[test]
    fn test_removing_active_middle_combatant_keeps_position() {
        let mut encounter = three();
        encounter.turn = 1;

        encounter.remove_combatant("a").unwrap();

        assert_eq!(encounter.turn, 1);
        assert_eq!(active_name(&encounter), "B");
    }

    #[test]
    fn test_removing_only_combatant_resets_cursor_to_zero() {
        let mut encounter = Encounter::new();
        encounter.add_combatant(combatant("solo", "Solo", 3)).unwrap();

        encounter.remove_combatant("solo").unwrap();

        assert_eq!(encounter.turn, 0);
        assert!(encounter.active().is_none());
    }

    #[test]
    fn test_removing_unknown_combatant_is_not_found() {
        let mut encounter = three();

        assert!(matches!(
            encounter.remove_combatant("ghost"),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut encounter = three();
        encounter.start_new_round();

        encounter.reset();

        assert_eq!(encounter, Encounter::new());
    }

    #[test]
    fn test_normalized_repairs_out_of_range_state() {
        let mut encounter = three();
        encounter.turn = 9;
        encounter.round = 0;

        let encounter = encounter.normalized();

        assert_eq!(encounter.turn, 2);
        assert_eq!(encounter.round, 1);
    }

    #[test]
    fn test_execute_assigns_id_when_missing() {
        let mut encounter = Encounter::new();
        let command = EncounterCommand::AddCombatant {
            combatant: NewCombatant {
                name: "Ogre".to_owned(),
                initiative: 8,
                ..NewCombatant::default()
            },
        };

        encounter.execute(command, || "generated".to_owned()).unwrap();

        assert_eq!(encounter.combatants[0].id, "generated");
    }

    #[test]
    fn test_commands_deserialize_from_tagged_json() {
        let advance: EncounterCommand =
            serde_json::from_value(serde_json::json!({ "command": "advance_turn" })).unwrap();
        let add: EncounterCommand = serde_json::from_value(serde_json::json!({
            "command": "add_combatant",
            "combatant": { "name": "Aria", "kind": "pc", "initiative": 14 }
        }))
        .unwrap();

        assert!(matches!(advance, EncounterCommand::AdvanceTurn));
        match add {
            EncounterCommand::AddCombatant { combatant } => {
                assert_eq!(combatant.name, "Aria");
                assert_eq!(combatant.initiative, 14);
            }
            other => panic!("expected AddCombatant, got {other:?}"),
        }
    }
}
