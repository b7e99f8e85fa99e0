//! The NPC directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stonecross_core::document::RoomDocument;
use stonecross_core::error::DomainError;
use uuid::Uuid;

use super::towns::TownId;

/// A non-player character the party has met.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub title: String,
    pub town_id: TownId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Loosely-typed NPC input. Anything can be missing; validation decides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NpcInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub town_id: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

impl NpcInput {
    fn trimmed_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Builds an NPC, carrying `created_at` and unchanged comments over from
    /// `existing`. Returns `None` if name, title or a known town is missing.
    fn normalize(self, existing: Option<&Npc>, now: DateTime<Utc>) -> Option<Npc> {
        let name = self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let title = self.title.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let town_id: TownId = self.town_id.as_deref()?.parse().ok()?;
        let id = self
            .trimmed_id()
            .map(str::to_owned)
            .or_else(|| existing.map(|npc| npc.id.clone()))
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let comments = match self.comments {
            Some(raw) => Some(raw.trim().to_owned()),
            None => existing.and_then(|npc| npc.comments.clone()),
        }
        .filter(|c| !c.is_empty());

        Some(Npc {
            id,
            name: name.to_owned(),
            title: title.to_owned(),
            town_id,
            comments,
            created_at: existing.map_or(now, |npc| npc.created_at),
            updated_at: now,
        })
    }
}

/// The NPC directory document, sorted by town then name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NpcDirectory {
    pub npcs: Vec<Npc>,
}

impl NpcDirectory {
    fn sort(&mut self) {
        self.npcs.sort_by(|a, b| {
            a.town_id
                .as_str()
                .cmp(b.town_id.as_str())
                .then_with(|| a.name.cmp(&b.name))
        });
    }

    fn find(&self, id: &str) -> Option<&Npc> {
        self.npcs.iter().find(|npc| npc.id == id)
    }
}

/// Request body for an NPC directory write.
///
/// One of `{ npcs: [...] }`, `{ op: "upsert", npc }`, `{ op: "delete", id }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NpcDirectoryUpdate {
    #[serde(default)]
    pub npcs: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default)]
    pub npc: Option<NpcInput>,
    #[serde(default)]
    pub id: Option<String>,
}

/// A decoded NPC directory write.
#[derive(Debug, Clone)]
pub enum NpcOperation {
    /// Replace the whole list; invalid entries are dropped.
    Replace(Vec<NpcInput>),
    /// Insert or replace one NPC by id.
    Upsert(NpcInput),
    /// Remove one NPC by id.
    Delete(String),
}

const UPSERT_USAGE: &str = "Upsert requires: npc { name, title, town_id } (and a known town_id).";
const DELETE_USAGE: &str = r#"Delete requires: { op: "delete", id: "..." }"#;
const SUPPORTED_SHAPES: &str =
    r#"Unsupported operation. Use { npcs: [...] }, or { op: "upsert", npc: {...} }, or { op: "delete", id: "..." }"#;

impl NpcDirectoryUpdate {
    /// Decides which operation this body describes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` naming the accepted shapes.
    pub fn into_operation(self) -> Result<NpcOperation, DomainError> {
        if let Some(raw) = self.npcs {
            let inputs = raw
                .into_iter()
                .filter_map(|value| serde_json::from_value::<NpcInput>(value).ok())
                .collect();
            return Ok(NpcOperation::Replace(inputs));
        }

        let op = self.op.unwrap_or_default().trim().to_lowercase();
        match op.as_str() {
            "upsert" => self
                .npc
                .map(NpcOperation::Upsert)
                .ok_or_else(|| DomainError::Validation(UPSERT_USAGE.into())),
            "delete" => self
                .id
                .map(|id| id.trim().to_owned())
                .filter(|id| !id.is_empty())
                .map(NpcOperation::Delete)
                .ok_or_else(|| DomainError::Validation(DELETE_USAGE.into())),
            _ => Err(DomainError::Validation(SUPPORTED_SHAPES.into())),
        }
    }
}

impl RoomDocument for NpcDirectory {
    const NAMESPACE: &'static str = "stonecross.npcs.v1";
    type Update = NpcDirectoryUpdate;

    fn seed() -> Option<Self> {
        Some(Self::default())
    }

    fn apply_update(
        current: Option<&Self>,
        update: Self::Update,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let current = current.cloned().unwrap_or_default();
        let mut next = match update.into_operation()? {
            NpcOperation::Replace(inputs) => Self {
                npcs: inputs
                    .into_iter()
                    .filter_map(|input| {
                        let existing = input.trimmed_id().and_then(|id| current.find(id));
                        input.normalize(existing, now)
                    })
                    .collect(),
            },
            NpcOperation::Upsert(input) => {
                let existing = input.trimmed_id().and_then(|id| current.find(id)).cloned();
                let npc = input
                    .normalize(existing.as_ref(), now)
                    .ok_or_else(|| DomainError::Validation(UPSERT_USAGE.into()))?;
                let mut next = current;
                match next.npcs.iter_mut().find(|n| n.id == npc.id) {
                    Some(slot) => *slot = npc,
                    None => next.npcs.push(npc),
                }
                next
            }
            NpcOperation::Delete(id) => {
                let mut next = current;
                next.npcs.retain(|npc| npc.id != id);
                next
            }
        };
        next.sort();
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn update(body: serde_json::Value) -> NpcDirectoryUpdate {
        serde_json::from_value(body).unwrap()
    }

    fn names(directory: &NpcDirectory) -> Vec<&str> {
        directory.npcs.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_replace_drops_invalid_entries() {
        // Arrange
        let body = update(json!({
            "npcs": [
                { "name": "Mira", "title": "Harbormaster", "town_id": "stormwatch" },
                { "name": "Nobody", "title": "", "town_id": "stormwatch" },
                { "name": "Lost", "title": "Wanderer", "town_id": "atlantis" },
                42
            ]
        }));

        // Act
        let result = NpcDirectory::apply_update(None, body, t0()).unwrap();

        // Assert
        assert_eq!(names(&result), vec!["Mira"]);
        assert_eq!(result.npcs[0].created_at, t0());
    }

    #[test]
    fn test_replace_keeps_created_at_for_existing_ids() {
        // Arrange
        let first = NpcDirectory::apply_update(
            None,
            update(json!({ "npcs": [{ "id": "n1", "name": "Mira", "title": "Harbormaster", "town_id": "stormwatch" }] })),
            t0(),
        )
        .unwrap();
        let later = t0() + Duration::hours(1);

        // Act
        let second = NpcDirectory::apply_update(
            Some(&first),
            update(json!({ "npcs": [{ "id": "n1", "name": "Mira", "title": "Dockmaster", "town_id": "stormwatch" }] })),
            later,
        )
        .unwrap();

        // Assert
        assert_eq!(second.npcs[0].created_at, t0());
        assert_eq!(second.npcs[0].updated_at, later);
        assert_eq!(second.npcs[0].title, "Dockmaster");
    }

    #[test]
    fn test_upsert_inserts_assigns_id_and_sorts_by_town_then_name() {
        // Arrange
        let current = NpcDirectory::apply_update(
            None,
            update(json!({ "npcs": [
                { "name": "Zed", "title": "Smith", "town_id": "westhaven" },
                { "name": "Orla", "title": "Archivist", "town_id": "stonecross" }
            ] })),
            t0(),
        )
        .unwrap();

        // Act
        let result = NpcDirectory::apply_update(
            Some(&current),
            update(json!({ "op": "upsert", "npc": { "name": "Bram", "title": "Captain", "town_id": "stonecross" } })),
            t0(),
        )
        .unwrap();

        // Assert
        assert_eq!(names(&result), vec!["Bram", "Orla", "Zed"]);
        assert!(!result.npcs[0].id.is_empty());
    }

    #[test]
    fn test_upsert_replaces_by_id_and_keeps_comments_when_absent() {
        let current = NpcDirectory::apply_update(
            None,
            update(json!({ "op": "upsert", "npc": {
                "id": "n1", "name": "Mira", "title": "Harbormaster",
                "town_id": "stormwatch", "comments": "Sees everything."
            } })),
            t0(),
        )
        .unwrap();

        let result = NpcDirectory::apply_update(
            Some(&current),
            update(json!({ "op": "upsert", "npc": { "id": "n1", "name": "Mira", "title": "Dockmaster", "town_id": "stormwatch" } })),
            t0(),
        )
        .unwrap();

        assert_eq!(result.npcs.len(), 1);
        assert_eq!(result.npcs[0].title, "Dockmaster");
        assert_eq!(result.npcs[0].comments.as_deref(), Some("Sees everything."));
    }

    #[test]
    fn test_upsert_with_unknown_town_names_required_fields() {
        let result = NpcDirectory::apply_update(
            None,
            update(json!({ "op": "upsert", "npc": { "name": "Mira", "title": "Harbormaster", "town_id": "atlantis" } })),
            t0(),
        );

        match result {
            Err(DomainError::Validation(message)) => assert!(message.contains("name, title, town_id")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_delete_removes_by_id() {
        let current = NpcDirectory::apply_update(
            None,
            update(json!({ "npcs": [{ "id": "n1", "name": "Mira", "title": "Harbormaster", "town_id": "stormwatch" }] })),
            t0(),
        )
        .unwrap();

        let result =
            NpcDirectory::apply_update(Some(&current), update(json!({ "op": "delete", "id": "n1" })), t0()).unwrap();

        assert!(result.npcs.is_empty());
    }

    #[test]
    fn test_delete_without_id_is_rejected() {
        let result = NpcDirectory::apply_update(None, update(json!({ "op": "delete", "id": "  " })), t0());

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_unknown_op_names_supported_shapes() {
        let result = NpcDirectory::apply_update(None, update(json!({ "op": "rename" })), t0());

        match result {
            Err(DomainError::Validation(message)) => assert!(message.starts_with("Unsupported operation")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
