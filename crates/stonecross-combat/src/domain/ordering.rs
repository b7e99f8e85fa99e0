//! Initiative ordering.
//!
//! The order is always derived from the combatant list and never stored.

use std::cmp::Ordering;

use super::combatant::Combatant;

/// Initiative descending, then name ascending (byte-wise, case-sensitive).
#[must_use]
pub fn compare(a: &Combatant, b: &Combatant) -> Ordering {
    b.initiative
        .cmp(&a.initiative)
        .then_with(|| a.name.cmp(&b.name))
}

/// Returns the combatants in turn order. Ties on both keys keep list order.
#[must_use]
pub fn initiative_order(combatants: &[Combatant]) -> Vec<&Combatant> {
    let mut ordered: Vec<&Combatant> = combatants.iter().collect();
    ordered.sort_by(|a, b| compare(a, b));
    ordered
}
