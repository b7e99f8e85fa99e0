//! Shops, their inventory, and the normalization applied on every write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stonecross_core::document::RoomDocument;
use stonecross_core::error::DomainError;
use stonecross_world::domain::towns::TownId;
use uuid::Uuid;

/// One line of a shop's stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: String,
    pub name: String,
    pub qty: u32,
    /// Price in gold pieces; fractions are silver and copper.
    pub price_gp: f64,
    #[serde(default)]
    pub notes: String,
}

/// A shop in one town.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: String,
    pub city: TownId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub visible_to_players: bool,
    #[serde(default)]
    pub inventory: Vec<ShopItem>,
}

/// The shop ledger document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShopLedger {
    pub shops: Vec<Shop>,
}

impl ShopLedger {
    /// Orders shops by ledger town order, then name.
    pub fn sort(&mut self) {
        self.shops.sort_by(|a, b| {
            a.city
                .ledger_rank()
                .cmp(&b.city.ledger_rank())
                .then_with(|| a.name.cmp(&b.name))
        });
    }

    /// The ledger as a player sees it: only visible shops.
    #[must_use]
    pub fn visible_to_players(&self) -> Self {
        Self {
            shops: self
                .shops
                .iter()
                .filter(|shop| shop.visible_to_players)
                .cloned()
                .collect(),
        }
    }
}

/// An item as written by the operator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopItemInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub qty: i64,
    #[serde(default)]
    pub price_gp: f64,
    #[serde(default)]
    pub notes: String,
}

/// A shop as written by the operator. `city` takes a town id or display name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub visible_to_players: bool,
    #[serde(default)]
    pub inventory: Vec<ShopItemInput>,
}

/// Full replacement of the ledger.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopLedgerUpdate {
    pub shops: Vec<ShopInput>,
}

fn id_or_new(id: Option<String>) -> String {
    id.map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn required(value: &str, what: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DomainError::Validation(format!("{what} requires a name")))
    } else {
        Ok(trimmed.to_owned())
    }
}

impl ShopItemInput {
    fn normalize(self, shop_name: &str) -> Result<ShopItem, DomainError> {
        let name = required(&self.name, &format!("an item of {shop_name}"))?;
        if !self.price_gp.is_finite() || self.price_gp < 0.0 {
            return Err(DomainError::Validation(format!(
                "{name} in {shop_name} has an invalid price; prices must be non-negative"
            )));
        }
        let qty = u32::try_from(self.qty).map_err(|_| {
            DomainError::Validation(format!(
                "{name} in {shop_name} has an invalid quantity; quantities must be non-negative"
            ))
        })?;
        Ok(ShopItem {
            id: id_or_new(self.id),
            name,
            qty,
            price_gp: self.price_gp,
            notes: self.notes.trim().to_owned(),
        })
    }
}

impl ShopInput {
    fn normalize(self) -> Result<Shop, DomainError> {
        let name = required(&self.name, "every shop")?;
        let city: TownId = self.city.parse()?;
        let inventory = self
            .inventory
            .into_iter()
            .map(|item| item.normalize(&name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Shop {
            id: id_or_new(self.id),
            city,
            name,
            description: self.description.trim().to_owned(),
            visible_to_players: self.visible_to_players,
            inventory,
        })
    }
}

impl RoomDocument for ShopLedger {
    const NAMESPACE: &'static str = "stonecross.shops.v1";
    type Update = ShopLedgerUpdate;

    fn apply_update(
        _current: Option<&Self>,
        update: Self::Update,
        _now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let shops = update
            .shops
            .into_iter()
            .map(ShopInput::normalize)
            .collect::<Result<Vec<_>, _>>()?;
        let mut ledger = Self { shops };
        ledger.sort();
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn apply(body: serde_json::Value) -> Result<ShopLedger, DomainError> {
        ShopLedger::apply_update(None, serde_json::from_value(body).unwrap(), now())
    }

    #[test]
    fn test_normalizes_names_ids_and_city() {
        // Arrange
        let body = json!({ "shops": [{
            "city": "Stonecross",
            "name": "  Stonecross General Wares ",
            "visible_to_players": true,
            "inventory": [{ "name": " Torch ", "qty": 30, "price_gp": 0.01 }]
        }] });

        // Act
        let ledger = apply(body).unwrap();

        // Assert
        let shop = &ledger.shops[0];
        assert_eq!(shop.name, "Stonecross General Wares");
        assert_eq!(shop.city, TownId::Stonecross);
        assert!(!shop.id.is_empty());
        assert_eq!(shop.inventory[0].name, "Torch");
        assert_eq!(shop.inventory[0].qty, 30);
        assert!(!shop.inventory[0].id.is_empty());
    }

    #[test]
    fn test_sorts_by_ledger_town_order_then_name() {
        let ledger = apply(json!({ "shops": [
            { "city": "sunspire", "name": "Amber Lamps" },
            { "city": "shatteredisles", "name": "Wreck Salvage" },
            { "city": "stonecross", "name": "Tanner" },
            { "city": "stonecross", "name": "Apothecary" }
        ] }))
        .unwrap();

        let names: Vec<&str> = ledger.shops.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Apothecary", "Tanner", "Wreck Salvage", "Amber Lamps"]);
    }

    #[test]
    fn test_rejects_negative_price() {
        let result = apply(json!({ "shops": [{
            "city": "stonecross", "name": "Smith",
            "inventory": [{ "name": "Nails", "price_gp": -1.0 }]
        }] }));

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_rejects_negative_quantity() {
        let result = apply(json!({ "shops": [{
            "city": "stonecross", "name": "Smith",
            "inventory": [{ "name": "Nails", "qty": -3 }]
        }] }));

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_rejects_unnamed_shop_and_item() {
        assert!(apply(json!({ "shops": [{ "city": "stonecross", "name": " " }] })).is_err());
        assert!(
            apply(json!({ "shops": [{ "city": "stonecross", "name": "Smith", "inventory": [{ "qty": 1 }] }] }))
                .is_err()
        );
    }

    #[test]
    fn test_rejects_unknown_city() {
        assert!(apply(json!({ "shops": [{ "city": "Atlantis", "name": "Pearls" }] })).is_err());
    }

    #[test]
    fn test_player_view_hides_invisible_shops() {
        let ledger = apply(json!({ "shops": [
            { "city": "stonecross", "name": "Open", "visible_to_players": true },
            { "city": "stonecross", "name": "Secret" }
        ] }))
        .unwrap();

        let view = ledger.visible_to_players();

        assert_eq!(view.shops.len(), 1);
        assert_eq!(view.shops[0].name, "Open");
    }
}
