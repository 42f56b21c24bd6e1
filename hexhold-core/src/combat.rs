//! Combat resolution

use crate::units::{get_unit_kind, UnitId, UnitRegistry};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of one attacker/victim resolution
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatOutcome {
    /// The victim survives at the given health
    VictimWounded { health: i32 },
    /// The victim's health reached zero; the caller removes it from the
    /// roster and clears its tile binding
    VictimDefeated,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CombatError {
    #[error("attacker {0} is not a live unit")]
    UnknownAttacker(UnitId),
    #[error("victim {0} is not a live unit")]
    UnknownVictim(UnitId),
    #[error("attacker and victim share an owner")]
    FriendlyFire,
}

/// Range eligibility for an attack.
///
/// Checked by callers before `resolve`, which never evaluates range itself,
/// so combat math and range rules stay independently testable.
pub fn in_attack_range(units: &UnitRegistry, attacker: UnitId, victim: UnitId) -> bool {
    match (units.get(attacker), units.get(victim)) {
        (Some(a), Some(v)) => a.pos.distance_to(v.pos) <= get_unit_kind(a.kind).attack_range,
        _ => false,
    }
}

/// Compute the outcome of one attack.
///
/// Pure over current unit health and the damage table; never mutates the
/// registry. Same-owner pairs and dead ids are rejected.
pub fn resolve(
    units: &UnitRegistry,
    attacker: UnitId,
    victim: UnitId,
) -> Result<CombatOutcome, CombatError> {
    let a = units
        .get(attacker)
        .ok_or(CombatError::UnknownAttacker(attacker))?;
    let v = units.get(victim).ok_or(CombatError::UnknownVictim(victim))?;
    if a.owner == v.owner {
        return Err(CombatError::FriendlyFire);
    }

    let health = v.health - get_unit_kind(a.kind).damage;
    if health <= 0 {
        Ok(CombatOutcome::VictimDefeated)
    } else {
        Ok(CombatOutcome::VictimWounded { health })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Hex;
    use crate::player::PlayerId;
    use crate::units::{unit_kind_index, WARRIOR};

    fn duel(victim_health: i32) -> (UnitRegistry, UnitId, UnitId) {
        let mut reg = UnitRegistry::default();
        let attacker = reg.spawn(WARRIOR, PlayerId::Human, Hex::new(0, 0)).unwrap();
        let victim = reg.spawn(WARRIOR, PlayerId::Ai(1), Hex::new(1, 0)).unwrap();
        reg.set_health(victim, victim_health);
        (reg, attacker, victim)
    }

    #[test]
    fn test_wound() {
        let (reg, a, v) = duel(10);
        // warrior deals 5
        assert_eq!(
            resolve(&reg, a, v),
            Ok(CombatOutcome::VictimWounded { health: 5 })
        );
    }

    #[test]
    fn test_defeat_at_or_below_damage() {
        for health in [5, 3, 1] {
            let (reg, a, v) = duel(health);
            assert_eq!(resolve(&reg, a, v), Ok(CombatOutcome::VictimDefeated));
        }
    }

    #[test]
    fn test_resolve_never_mutates() {
        let (reg, a, v) = duel(10);
        resolve(&reg, a, v).unwrap();
        assert_eq!(reg.get(v).unwrap().health, 10);
    }

    #[test]
    fn test_friendly_fire_rejected_regardless_of_health() {
        let mut reg = UnitRegistry::default();
        let a = reg.spawn(WARRIOR, PlayerId::Human, Hex::new(0, 0)).unwrap();
        let v = reg.spawn(WARRIOR, PlayerId::Human, Hex::new(1, 0)).unwrap();
        reg.set_health(v, 1);
        assert_eq!(resolve(&reg, a, v), Err(CombatError::FriendlyFire));
    }

    #[test]
    fn test_unknown_ids_rejected() {
        let (reg, a, v) = duel(10);
        assert_eq!(resolve(&reg, 99, v), Err(CombatError::UnknownAttacker(99)));
        assert_eq!(resolve(&reg, a, 99), Err(CombatError::UnknownVictim(99)));
    }

    #[test]
    fn test_range_predicate() {
        let mut reg = UnitRegistry::default();
        let archer = unit_kind_index("archer").unwrap();
        let a = reg.spawn(archer, PlayerId::Human, Hex::new(0, 0)).unwrap();
        let near = reg.spawn(WARRIOR, PlayerId::Ai(1), Hex::new(2, 0)).unwrap();
        let far = reg.spawn(WARRIOR, PlayerId::Ai(1), Hex::new(3, 0)).unwrap();
        // archer reaches 2 hexes
        assert!(in_attack_range(&reg, a, near));
        assert!(!in_attack_range(&reg, a, far));
        // warriors only reach adjacent hexes
        assert!(!in_attack_range(&reg, near, a));
        assert!(!in_attack_range(&reg, 99, a));
    }

    #[test]
    fn test_resolve_ignores_range() {
        let mut reg = UnitRegistry::default();
        let a = reg.spawn(WARRIOR, PlayerId::Human, Hex::new(0, 0)).unwrap();
        let v = reg.spawn(WARRIOR, PlayerId::Ai(1), Hex::new(5, 5)).unwrap();
        // miles apart, resolve still computes; range is the caller's gate
        assert!(resolve(&reg, a, v).is_ok());
    }
}
