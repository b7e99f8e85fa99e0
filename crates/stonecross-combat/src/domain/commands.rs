//! Commands for the combat context.

use serde::Deserialize;
use stonecross_core::command::Command;
use stonecross_core::room::Room;
use uuid::Uuid;

use super::combatant::{CombatantPatch, NewCombatant};

/// Operator actions on an encounter.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EncounterCommand {
    /// Add a combatant, keeping the active combatant active.
    AddCombatant {
        /// The combatant to add.
        combatant: NewCombatant,
    },
    /// Edit a combatant in place, keeping the active combatant active.
    UpdateCombatant {
        /// Target combatant.
        id: String,
        /// Fields to change.
        patch: CombatantPatch,
    },
    /// Remove a combatant.
    RemoveCombatant {
        /// Target combatant.
        id: String,
    },
    /// Move to the next combatant, wrapping into a new round.
    AdvanceTurn,
    /// Move to the previous combatant, wrapping into the previous round.
    RetreatTurn,
    /// Start a new round at the top of the order.
    StartNewRound,
    /// Make a specific combatant active.
    FocusCombatant {
        /// Target combatant.
        id: String,
    },
    /// Clear the encounter back to round 1 with no combatants.
    Reset,
}

impl EncounterCommand {
    /// The command name (for logging).
    #[must_use]
    pub fn command_type(&self) -> &'static str {
        match self {
            Self::AddCombatant { .. } => "combat.add_combatant",
            Self::UpdateCombatant { .. } => "combat.update_combatant",
            Self::RemoveCombatant { .. } => "combat.remove_combatant",
            Self::AdvanceTurn => "combat.advance_turn",
            Self::RetreatTurn => "combat.retreat_turn",
            Self::StartNewRound => "combat.start_new_round",
            Self::FocusCombatant { .. } => "combat.focus_combatant",
            Self::Reset => "combat.reset",
        }
    }
}

/// Command to apply an [`EncounterCommand`] to a room's encounter.
#[derive(Debug, Clone)]
pub struct ApplyEncounterCommand {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The room whose encounter is changed.
    pub room: Room,
    /// The action.
    pub command: EncounterCommand,
    /// Version the operator last saw, if they sent one.
    pub expected_version: Option<i64>,
}

impl Command for ApplyEncounterCommand {
    fn command_type(&self) -> &'static str {
        self.command.command_type()
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
