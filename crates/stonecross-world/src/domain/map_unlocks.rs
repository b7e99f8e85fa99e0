//! Which towns the players can open on the map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stonecross_core::document::RoomDocument;
use stonecross_core::error::DomainError;

use super::towns::TownId;

/// Towns unlocked when a room is first opened.
pub const DEFAULT_UNLOCKED: [TownId; 3] = [TownId::Stonecross, TownId::Stormwatch, TownId::Westhaven];

/// The map unlock document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapUnlocks {
    /// Unlocked towns, without duplicates, in the order they were unlocked.
    pub unlocked: Vec<TownId>,
}

impl MapUnlocks {
    /// Whether `town` is unlocked.
    #[must_use]
    pub fn is_unlocked(&self, town: TownId) -> bool {
        self.unlocked.contains(&town)
    }

    /// Locks `town` if unlocked, unlocks it otherwise.
    pub fn toggle(&mut self, town: TownId) {
        if self.is_unlocked(town) {
            self.unlocked.retain(|t| *t != town);
        } else {
            self.unlocked.push(town);
        }
    }
}

/// Request body for a map unlock write: `{ unlocked: [...] }` or
/// `{ op: "toggle", town_id }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapUnlocksUpdate {
    #[serde(default)]
    pub unlocked: Option<Vec<String>>,
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default)]
    pub town_id: Option<String>,
}

fn parse_towns(raw: &[String]) -> Result<Vec<TownId>, DomainError> {
    let mut towns = Vec::with_capacity(raw.len());
    for name in raw {
        let town: TownId = name.parse()?;
        if !towns.contains(&town) {
            towns.push(town);
        }
    }
    Ok(towns)
}

impl RoomDocument for MapUnlocks {
    const NAMESPACE: &'static str = "stonecross.map.unlocks.v1";
    type Update = MapUnlocksUpdate;

    fn seed() -> Option<Self> {
        Some(Self {
            unlocked: DEFAULT_UNLOCKED.to_vec(),
        })
    }

    fn apply_update(
        current: Option<&Self>,
        update: Self::Update,
        _now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if let Some(unlocked) = update.unlocked {
            return Ok(Self {
                unlocked: parse_towns(&unlocked)?,
            });
        }

        match update.op.as_deref().map(str::trim) {
            Some(op) if op.eq_ignore_ascii_case("toggle") => {
                let town: TownId = update
                    .town_id
                    .as_deref()
                    .ok_or_else(|| {
                        DomainError::Validation(r#"Toggle requires: { op: "toggle", town_id }"#.into())
                    })?
                    .parse()?;
                let mut next = current.cloned().or_else(Self::seed).unwrap_or(Self {
                    unlocked: Vec::new(),
                });
                next.toggle(town);
                Ok(next)
            }
            _ => Err(DomainError::Validation(
                r#"Unsupported operation. Use { unlocked: [...] } or { op: "toggle", town_id }"#.into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn replace(towns: &[&str]) -> MapUnlocksUpdate {
        MapUnlocksUpdate {
            unlocked: Some(towns.iter().map(|t| (*t).to_owned()).collect()),
            ..MapUnlocksUpdate::default()
        }
    }

    fn toggle(town: &str) -> MapUnlocksUpdate {
        MapUnlocksUpdate {
            op: Some("toggle".to_owned()),
            town_id: Some(town.to_owned()),
            ..MapUnlocksUpdate::default()
        }
    }

    #[test]
    fn test_seed_unlocks_three_starting_towns() {
        let seed = MapUnlocks::seed().unwrap();

        assert_eq!(
            seed.unlocked,
            vec![TownId::Stonecross, TownId::Stormwatch, TownId::Westhaven]
        );
    }

    #[test]
    fn test_replace_removes_duplicates_keeping_first() {
        let result =
            MapUnlocks::apply_update(None, replace(&["sunspire", "stonecross", "sunspire"]), now()).unwrap();

        assert_eq!(result.unlocked, vec![TownId::Sunspire, TownId::Stonecross]);
    }

    #[test]
    fn test_replace_rejects_unknown_town() {
        let result = MapUnlocks::apply_update(None, replace(&["stonecross", "atlantis"]), now());

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_toggle_unlocks_then_locks() {
        // Arrange
        let current = MapUnlocks::seed().unwrap();

        // Act
        let opened = MapUnlocks::apply_update(Some(&current), toggle("eldergate"), now()).unwrap();
        let closed = MapUnlocks::apply_update(Some(&opened), toggle("eldergate"), now()).unwrap();

        // Assert
        assert!(opened.is_unlocked(TownId::Eldergate));
        assert_eq!(closed, current);
    }

    #[test]
    fn test_toggle_without_town_is_rejected() {
        let update = MapUnlocksUpdate {
            op: Some("toggle".to_owned()),
            ..MapUnlocksUpdate::default()
        };

        assert!(MapUnlocks::apply_update(None, update, now()).is_err());
    }

    #[test]
    fn test_empty_update_is_rejected() {
        assert!(matches!(
            MapUnlocks::apply_update(None, MapUnlocksUpdate::default(), now()),
            Err(DomainError::Validation(_))
        ));
    }
}
