//! The towns of the campaign map.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stonecross_core::error::DomainError;

/// A known town.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TownId {
    Stonecross,
    Stormwatch,
    Westhaven,
    Eldergate,
    Sunspire,
    Ashenmoor,
    Shatteredisles,
    Greenshadow,
}

impl TownId {
    /// Every town, in map order.
    pub const ALL: [TownId; 8] = [
        TownId::Stonecross,
        TownId::Stormwatch,
        TownId::Westhaven,
        TownId::Eldergate,
        TownId::Sunspire,
        TownId::Ashenmoor,
        TownId::Shatteredisles,
        TownId::Greenshadow,
    ];

    /// Order in which the shop ledger groups towns.
    pub const LEDGER_ORDER: [TownId; 8] = [
        TownId::Stonecross,
        TownId::Stormwatch,
        TownId::Westhaven,
        TownId::Eldergate,
        TownId::Shatteredisles,
        TownId::Sunspire,
        TownId::Ashenmoor,
        TownId::Greenshadow,
    ];

    /// Wire identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stonecross => "stonecross",
            Self::Stormwatch => "stormwatch",
            Self::Westhaven => "westhaven",
            Self::Eldergate => "eldergate",
            Self::Sunspire => "sunspire",
            Self::Ashenmoor => "ashenmoor",
            Self::Shatteredisles => "shatteredisles",
            Self::Greenshadow => "greenshadow",
        }
    }

    /// Name shown to players.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Stonecross => "Stonecross",
            Self::Stormwatch => "Stormwatch",
            Self::Westhaven => "Westhaven",
            Self::Eldergate => "Eldergate",
            Self::Sunspire => "Sunspire",
            Self::Ashenmoor => "Ashen Moor",
            Self::Shatteredisles => "Shattered Isles",
            Self::Greenshadow => "Greenshadow Forest",
        }
    }

    /// Position in [`TownId::LEDGER_ORDER`].
    #[must_use]
    pub fn ledger_rank(self) -> usize {
        Self::LEDGER_ORDER
            .iter()
            .position(|town| *town == self)
            .unwrap_or(Self::LEDGER_ORDER.len())
    }
}

impl FromStr for TownId {
    type Err = DomainError;

    /// Accepts the wire identifier or the display name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|town| {
                town.as_str().eq_ignore_ascii_case(wanted)
                    || town.display_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| DomainError::Validation(format!("unknown town '{wanted}'")))
    }
}

impl fmt::Display for TownId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
