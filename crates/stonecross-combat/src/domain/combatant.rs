//! Combatants and their edits.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use stonecross_core::error::DomainError;

/// Which side of the table a combatant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatantKind {
    /// Player character.
    Pc,
    /// Non-player character.
    Npc,
    /// Monster.
    #[default]
    Monster,
}

/// One participant in an encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    /// Opaque identifier, stable across edits.
    pub id: String,
    /// Display name; also the initiative tiebreak.
    pub name: String,
    /// Player character, NPC, or monster.
    pub kind: CombatantKind,
    /// Initiative score; may be zero or negative.
    pub initiative: i32,
    /// Armor class, if tracked.
    #[serde(default)]
    pub armor_class: Option<i32>,
    /// Current hit points, if tracked.
    #[serde(default)]
    pub hp: Option<i32>,
    /// Maximum hit points, if tracked.
    #[serde(default)]
    pub max_hp: Option<i32>,
    /// Condition tags such as "prone" or "poisoned".
    #[serde(default)]
    pub conditions: BTreeSet<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
}

/// Input for adding a combatant. The id is assigned when absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCombatant {
    /// Caller-chosen id.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name (required).
    pub name: String,
    /// Defaults to monster.
    #[serde(default)]
    pub kind: CombatantKind,
    /// Defaults to 0.
    #[serde(default)]
    pub initiative: i32,
    /// Armor class.
    #[serde(default)]
    pub armor_class: Option<i32>,
    /// Current hit points.
    #[serde(default)]
    pub hp: Option<i32>,
    /// Maximum hit points.
    #[serde(default)]
    pub max_hp: Option<i32>,
    /// Condition tags.
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
}

/// A partial edit. Absent fields are left alone; `null` clears the optional
/// numbers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CombatantPatch {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New kind.
    #[serde(default)]
    pub kind: Option<CombatantKind>,
    /// New initiative.
    #[serde(default)]
    pub initiative: Option<i32>,
    /// New armor class, or `Some(None)` to clear.
    #[serde(default, deserialize_with = "present")]
    pub armor_class: Option<Option<i32>>,
    /// New hit points, or `Some(None)` to clear.
    #[serde(default, deserialize_with = "present")]
    pub hp: Option<Option<i32>>,
    /// New maximum hit points, or `Some(None)` to clear.
    #[serde(default, deserialize_with = "present")]
    pub max_hp: Option<Option<i32>>,
    /// Replacement condition tags.
    #[serde(default)]
    pub conditions: Option<Vec<String>>,
    /// Replacement notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn clean_name(raw: &str) -> Result<String, DomainError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::Validation(
            "combatant name must not be empty".to_owned(),
        ));
    }
    Ok(name.to_owned())
}

fn clean_conditions(raw: Vec<String>) -> BTreeSet<String> {
    raw.into_iter()
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty())
        .collect()
}

impl Combatant {
    /// Builds a combatant from input, using `fallback_id` when none was given.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name is blank.
    pub fn create(input: NewCombatant, fallback_id: impl FnOnce() -> String) -> Result<Self, DomainError> {
        let name = clean_name(&input.name)?;
        let id = input
            .id
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(fallback_id);
        Ok(Self {
            id,
            name,
            kind: input.kind,
            initiative: input.initiative,
            armor_class: input.armor_class,
            hp: input.hp,
            max_hp: input.max_hp,
            conditions: clean_conditions(input.conditions),
            notes: input.notes.trim().to_owned(),
        })
    }

    /// Applies a patch in place.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the patch blanks the name. The
    /// combatant is unchanged on error.
    pub fn apply_patch(&mut self, patch: CombatantPatch) -> Result<(), DomainError> {
        let name = patch.name.as_deref().map(clean_name).transpose()?;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(initiative) = patch.initiative {
            self.initiative = initiative;
        }
        if let Some(armor_class) = patch.armor_class {
            self.armor_class = armor_class;
        }
        if let Some(hp) = patch.hp {
            self.hp = hp;
        }
        if let Some(max_hp) = patch.max_hp {
            self.max_hp = max_hp;
        }
        if let Some(conditions) = patch.conditions {
            self.conditions = clean_conditions(conditions);
        }
        if let Some(notes) = patch.notes {
            self.notes = notes.trim().to_owned();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_combatant(name: &str) -> NewCombatant {
        NewCombatant {
            name: name.to_owned(),
            ..NewCombatant::default()
        }
    }

    #[test]
    fn test_create_trims_name_and_assigns_fallback_id() {
        let combatant = Combatant::create(new_combatant("  Frost Warg "), || "c-1".to_owned()).unwrap();

        assert_eq!(combatant.name, "Frost Warg");
        assert_eq!(combatant.id, "c-1");
        assert_eq!(combatant.kind, CombatantKind::Monster);
    }

    #[test]
    fn test_create_keeps_given_id() {
        let input = NewCombatant {
            id: Some("warg".to_owned()),
            ..new_combatant("Frost Warg")
        };

        let combatant = Combatant::create(input, || unreachable!()).unwrap();

        assert_eq!(combatant.id, "warg");
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let result = Combatant::create(new_combatant("   "), || "c-1".to_owned());

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_conditions_are_trimmed_deduplicated_and_blank_dropped() {
        let input = NewCombatant {
            conditions: vec![" prone".into(), "".into(), "prone ".into(), "poisoned".into()],
            ..new_combatant("Aria")
        };

        let combatant = Combatant::create(input, || "c-1".to_owned()).unwrap();

        assert_eq!(
            combatant.conditions.into_iter().collect::<Vec<_>>(),
            vec!["poisoned", "prone"]
        );
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        // Arrange
        let mut combatant = Combatant::create(
            NewCombatant {
                armor_class: Some(13),
                hp: Some(30),
                ..new_combatant("Aria")
            },
            || "c-1".to_owned(),
        )
        .unwrap();
        let patch: CombatantPatch =
            serde_json::from_value(serde_json::json!({ "armor_class": null, "initiative": 9 })).unwrap();

        // Act
        combatant.apply_patch(patch).unwrap();

        // Assert
        assert_eq!(combatant.armor_class, None);
        assert_eq!(combatant.hp, Some(30));
        assert_eq!(combatant.initiative, 9);
    }

    #[test]
    fn test_patch_with_blank_name_leaves_combatant_unchanged() {
        let mut combatant = Combatant::create(new_combatant("Aria"), || "c-1".to_owned()).unwrap();
        let before = combatant.clone();

        let result = combatant.apply_patch(CombatantPatch {
            name: Some(" ".to_owned()),
            initiative: Some(20),
            ..CombatantPatch::default()
        });

        assert!(result.is_err());
        assert_eq!(combatant, before);
    }

    #[test]
    fn test_kind_uses_snake_case_on_the_wire() {
        assert_eq!(serde_json::to_value(CombatantKind::Pc).unwrap(), "pc");
        assert_eq!(
            serde_json::from_value::<CombatantKind>(serde_json::json!("npc")).unwrap(),
            CombatantKind::Npc
        );
    }
}
