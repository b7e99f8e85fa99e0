//! Who may read an encounter.

use std::fmt;
use std::str::FromStr;

use stonecross_core::actor::Actor;
use stonecross_core::error::DomainError;

/// Read access to the encounter. Writes are always operator-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombatVisibility {
    /// Only the operator sees the tracker.
    #[default]
    Private,
    /// Every signed-in participant sees the tracker.
    Shared,
}

impl CombatVisibility {
    /// Fails with `Forbidden` if `actor` may not read the encounter.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Forbidden` for non-operators when private.
    pub fn authorize_read(self, actor: &Actor) -> Result<(), DomainError> {
        match self {
            Self::Shared => Ok(()),
            Self::Private => actor.require_operator(),
        }
    }
}

impl FromStr for CombatVisibility {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "private" => Ok(Self::Private),
            "shared" => Ok(Self::Shared),
            other => Err(DomainError::Validation(format!(
                "unknown combat visibility '{other}', expected private or shared"
            ))),
        }
    }
}

impl fmt::Display for CombatVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private => f.write_str("private"),
            Self::Shared => f.write_str("shared"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stonecross_core::actor::Operator;

    #[test]
    fn test_parses_case_insensitively() {
        assert_eq!(" Shared ".parse::<CombatVisibility>().unwrap(), CombatVisibility::Shared);
        assert_eq!("PRIVATE".parse::<CombatVisibility>().unwrap(), CombatVisibility::Private);
    }

    #[test]
    fn test_rejects_unknown_value() {
        assert!(matches!(
            "public".parse::<CombatVisibility>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_private_hides_encounter_from_players() {
        let operator = Operator::new("dm");
        let player = Actor::new("rodney", &operator);
        let dm = Actor::new("dm", &operator);

        assert!(matches!(
            CombatVisibility::Private.authorize_read(&player),
            Err(DomainError::Forbidden(_))
        ));
        assert!(CombatVisibility::Private.authorize_read(&dm).is_ok());
        assert!(CombatVisibility::Shared.authorize_read(&player).is_ok());
    }
}
