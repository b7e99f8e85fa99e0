//! The old gods known to the party.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stonecross_core::document::RoomDocument;
use stonecross_core::error::DomainError;
use uuid::Uuid;

/// One deity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OldGod {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub followers: String,
    /// What the party has done with or for this god.
    #[serde(default)]
    pub party_interactions: String,
}

/// The pantheon document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pantheon {
    pub gods: Vec<OldGod>,
}

/// A god as written by the operator; the id may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OldGodInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub followers: String,
    #[serde(default)]
    pub party_interactions: String,
}

/// Full replacement of the pantheon.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PantheonUpdate {
    pub gods: Vec<OldGodInput>,
}

impl RoomDocument for Pantheon {
    const NAMESPACE: &'static str = "stonecross.old-gods.v1";
    type Update = PantheonUpdate;

    fn apply_update(
        _current: Option<&Self>,
        update: Self::Update,
        _now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let gods = update
            .gods
            .into_iter()
            .enumerate()
            .map(|(index, god)| {
                let name = god.name.trim();
                if name.is_empty() {
                    return Err(DomainError::Validation(format!(
                        "god #{} requires a name",
                        index + 1
                    )));
                }
                let id = god
                    .id
                    .map(|id| id.trim().to_owned())
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                Ok(OldGod {
                    id,
                    name: name.to_owned(),
                    realm: god.realm.trim().to_owned(),
                    followers: god.followers.trim().to_owned(),
                    party_interactions: god.party_interactions.trim().to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { gods })
    }
}
