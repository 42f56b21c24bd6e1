//! AI opponent decision policies
//!
//! Each archetype is its own type behind the [`AiOpponent`] capability; all
//! of them act through the same `GameState` operations a human action uses,
//! and every attack goes through the combat resolver.

use crate::board::Hex;
use crate::combat::in_attack_range;
use crate::game::{GameError, GameState};
use crate::player::PlayerId;
use crate::units::UnitId;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const WARRIOR_KIND: &str = "warrior";

/// Per-AI decision policy, invoked once per AI turn slot
pub trait AiOpponent: Send {
    fn id(&self) -> PlayerId;

    /// Per-round bookkeeping before acting
    fn new_turn(&mut self);

    /// Full decision-and-action sequence for one turn slot
    fn take_turn(&mut self, state: &mut GameState) -> Result<(), GameError>;
}

/// Build the AI roster for a level, alternating archetypes by index.
/// Each AI gets its own seeded rng so matches replay deterministically.
pub fn build_opponents(num_enemies: u8, seed: u64) -> Vec<Box<dyn AiOpponent>> {
    (1..=num_enemies)
        .map(|i| {
            let id = PlayerId::Ai(i);
            let rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
            if i % 2 == 1 {
                Box::new(Raider::new(id, rng)) as Box<dyn AiOpponent>
            } else {
                Box::new(Homesteader::new(id, rng)) as Box<dyn AiOpponent>
            }
        })
        .collect()
}

// ============================================================================
// SHARED HELPERS
// ============================================================================

fn own_unit_ids(state: &GameState, owner: PlayerId) -> Vec<UnitId> {
    state.units().owned_by(owner).map(|u| u.id).collect()
}

/// AI units are refreshed here, inside their own turn, never by the engine
fn refresh_own_units(state: &mut GameState, owner: PlayerId) {
    for id in own_unit_ids(state, owner) {
        state.units.refresh_moves(id);
    }
}

fn nearest_enemy(state: &GameState, owner: PlayerId, from: Hex) -> Option<UnitId> {
    state
        .units()
        .iter()
        .filter(|u| u.owner != owner)
        .min_by_key(|u| from.distance_to(u.pos))
        .map(|u| u.id)
}

/// First enemy the attacker can already reach
fn enemy_in_range(state: &GameState, owner: PlayerId, attacker: UnitId) -> Option<UnitId> {
    state
        .units()
        .iter()
        .filter(|u| u.owner != owner)
        .find(|u| in_attack_range(state.units(), attacker, u.id))
        .map(|u| u.id)
}

/// Adjacent tile strictly closer to the target: on the map and unoccupied.
/// Ties broken by rng so pathing does not rut.
fn step_toward(state: &GameState, from: Hex, target: Hex, rng: &mut ChaCha8Rng) -> Option<Hex> {
    let current = from.distance_to(target);
    let mut candidates: Vec<Hex> = from
        .neighbors()
        .into_iter()
        .filter(|hex| state.grid().contains(*hex))
        .filter(|hex| state.units().unit_at(*hex).is_none())
        .filter(|hex| hex.distance_to(target) < current)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let pick = rng.gen_range(0..candidates.len());
    Some(candidates.swap_remove(pick))
}

/// Adjacent tile not yet held by this AI: on the map and unoccupied
fn claimable_neighbor(
    state: &GameState,
    from: Hex,
    owner: PlayerId,
    rng: &mut ChaCha8Rng,
) -> Option<Hex> {
    let mut candidates: Vec<Hex> = from
        .neighbors()
        .into_iter()
        .filter(|hex| state.units().unit_at(*hex).is_none())
        .filter(|hex| match state.grid().get(*hex) {
            Some(tile) => tile.owner != Some(owner),
            None => false,
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let pick = rng.gen_range(0..candidates.len());
    Some(candidates.swap_remove(pick))
}

// ============================================================================
// RAIDER
// ============================================================================

/// Closes distance to the nearest enemy unit and attacks whatever ends up in
/// range, claiming tiles along the way.
pub struct Raider {
    id: PlayerId,
    rng: ChaCha8Rng,
}

impl Raider {
    pub fn new(id: PlayerId, rng: ChaCha8Rng) -> Self {
        Self { id, rng }
    }
}

impl AiOpponent for Raider {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn new_turn(&mut self) {}

    fn take_turn(&mut self, state: &mut GameState) -> Result<(), GameError> {
        refresh_own_units(state, self.id);

        for id in own_unit_ids(state, self.id) {
            loop {
                let Some(unit) = state.units().get(id) else { break };
                if unit.moves_left == 0 {
                    break;
                }
                let pos = unit.pos;

                let Some(target) = nearest_enemy(state, self.id, pos) else {
                    break;
                };
                if in_attack_range(state.units(), id, target) {
                    if state.attack(id, target).is_err() {
                        break;
                    }
                    continue;
                }

                let Some(target_pos) = state.units().get(target).map(|u| u.pos) else {
                    break;
                };
                match step_toward(state, pos, target_pos, &mut self.rng) {
                    Some(to) => {
                        if state.move_unit(id, to).is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// HOMESTEADER
// ============================================================================

/// Expands territory tile by tile and recruits once its holdings outgrow its
/// roster; fights only when an enemy is already in reach.
pub struct Homesteader {
    id: PlayerId,
    rng: ChaCha8Rng,
}

impl Homesteader {
    pub fn new(id: PlayerId, rng: ChaCha8Rng) -> Self {
        Self { id, rng }
    }

    fn try_recruit(&mut self, state: &mut GameState) {
        let owned = state.grid().owned_count(self.id);
        let roster = state.units().owned_by(self.id).count();
        if owned < 3 * (roster + 1) {
            return;
        }

        let mut spots: Vec<Hex> = state
            .grid()
            .tiles()
            .filter(|(hex, tile)| {
                tile.owner == Some(self.id) && state.units().unit_at(*hex).is_none()
            })
            .map(|(hex, _)| hex)
            .collect();
        if spots.is_empty() {
            return;
        }
        let pick = self.rng.gen_range(0..spots.len());
        let hex = spots.swap_remove(pick);
        if let Err(err) = state.recruit(WARRIOR_KIND, self.id, hex) {
            tracing::debug!("{} recruit at {hex} skipped: {err}", self.id);
        }
    }
}

impl AiOpponent for Homesteader {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn new_turn(&mut self) {}

    fn take_turn(&mut self, state: &mut GameState) -> Result<(), GameError> {
        refresh_own_units(state, self.id);

        for id in own_unit_ids(state, self.id) {
            loop {
                let Some(unit) = state.units().get(id) else { break };
                if unit.moves_left == 0 {
                    break;
                }
                let pos = unit.pos;

                if let Some(target) = enemy_in_range(state, self.id, id) {
                    if state.attack(id, target).is_err() {
                        break;
                    }
                    continue;
                }

                match claimable_neighbor(state, pos, self.id, &mut self.rng) {
                    Some(to) => {
                        if state.move_unit(id, to).is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }

        self.try_recruit(state);
        Ok(())
    }
}
