//! Game state and the shared action surface
//!
//! Human-initiated actions and AI turns go through the same operations here,
//! so movement budgets, occupancy, and combat invariants are enforced in one
//! place regardless of who is acting.

use crate::board::Hex;
use crate::combat::{self, CombatError, CombatOutcome};
use crate::grid::HexGrid;
use crate::level::LevelData;
use crate::player::{turn_order, PlayerId};
use crate::turn::TurnState;
use crate::units::{get_unit_kind, unit_kind_index, UnitError, UnitId, UnitRegistry, WARRIOR};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Match outcome, evaluated from tile ownership (never unit counts)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Ongoing,
    Victory,
    Defeat,
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("no tile at {0}")]
    NoSuchTile(Hex),
    #[error(transparent)]
    Unit(#[from] UnitError),
    #[error(transparent)]
    Combat(#[from] CombatError),
    #[error("unit {0} has no moves left")]
    NoMovesLeft(UnitId),
    #[error("destination is {dist} hexes away, {left} moves left")]
    TooFar { dist: i32, left: u32 },
    #[error("victim is out of attack range")]
    OutOfRange,
    #[error("unknown unit kind {0:?}")]
    UnknownKind(String),
    #[error("{kind} unlocks at round {unlock}, current round is {round}")]
    KindLocked {
        kind: &'static str,
        unlock: u32,
        round: u32,
    },
    #[error("not enough gold: need {need}, have {have}")]
    NotEnoughGold { need: i64, have: i64 },
    #[error("tile {0} is not owned by the recruiting player")]
    NotOwnedTile(Hex),
    #[error("unit {0} does not belong to the acting player")]
    NotYourUnit(UnitId),
    #[error("action is only available during the human turn")]
    NotYourTurn,
}

/// Full in-memory session state: grid, roster, and turn counters.
///
/// Mutation goes through the operations below; render and HUD collaborators
/// only read via the accessors.
#[derive(Clone, Debug)]
pub struct GameState {
    pub(crate) grid: HexGrid,
    pub(crate) units: UnitRegistry,
    pub(crate) turn: TurnState,
    pub(crate) roster: Vec<PlayerId>,
    pub(crate) outcome: MatchOutcome,
    pub(crate) selection: Vec<Hex>,
}

impl GameState {
    pub fn from_level(level: &LevelData) -> Self {
        Self {
            grid: HexGrid::from_level(level),
            units: UnitRegistry::default(),
            turn: TurnState::default(),
            roster: turn_order(level.num_enemies),
            outcome: MatchOutcome::Ongoing,
            selection: Vec::new(),
        }
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn roster(&self) -> &[PlayerId] {
        &self.roster
    }

    pub fn outcome(&self) -> MatchOutcome {
        self.outcome
    }

    pub fn selection(&self) -> &[Hex] {
        &self.selection
    }

    /// Give every player with territory but no units an opening warrior on
    /// their first owned tile
    pub fn ensure_starting_units(&mut self) {
        for player in self.roster.clone() {
            if self.units.owned_by(player).next().is_some() {
                continue;
            }
            let spot = self
                .grid
                .tiles()
                .find(|(hex, tile)| tile.owner == Some(player) && self.units.unit_at(*hex).is_none())
                .map(|(hex, _)| hex);
            if let Some(hex) = spot {
                let _ = self.units.spawn(WARRIOR, player, hex);
            }
        }
    }

    /// Move a unit to a tile within its remaining budget, claiming the
    /// destination for its owner
    pub fn move_unit(&mut self, id: UnitId, to: Hex) -> Result<(), GameError> {
        let unit = *self.units.get(id).ok_or(UnitError::UnknownUnit(id))?;
        if !self.grid.contains(to) {
            return Err(GameError::NoSuchTile(to));
        }
        let dist = unit.pos.distance_to(to);
        if dist == 0 {
            return Ok(());
        }
        if unit.moves_left == 0 {
            return Err(GameError::NoMovesLeft(id));
        }
        if dist > unit.moves_left as i32 {
            return Err(GameError::TooFar {
                dist,
                left: unit.moves_left,
            });
        }
        self.units.move_unit(id, to)?;
        if let Some(u) = self.units.get_mut(id) {
            u.moves_left -= dist as u32;
        }
        self.grid.claim(to, unit.owner);
        Ok(())
    }

    /// Attack a victim: range gate, then resolution, then defeat cleanup.
    /// Costs the attacker one move.
    pub fn attack(&mut self, attacker: UnitId, victim: UnitId) -> Result<CombatOutcome, GameError> {
        let moves_left = self
            .units
            .get(attacker)
            .ok_or(CombatError::UnknownAttacker(attacker))?
            .moves_left;
        if moves_left == 0 {
            return Err(GameError::NoMovesLeft(attacker));
        }
        if !combat::in_attack_range(&self.units, attacker, victim) {
            return Err(GameError::OutOfRange);
        }
        let outcome = combat::resolve(&self.units, attacker, victim)?;
        match outcome {
            CombatOutcome::VictimWounded { health } => self.units.set_health(victim, health),
            CombatOutcome::VictimDefeated => {
                self.units.remove(victim);
            }
        }
        if let Some(a) = self.units.get_mut(attacker) {
            a.moves_left -= 1;
        }
        Ok(outcome)
    }

    /// Recruit a unit onto an owned, empty tile. The human pays gold; AI
    /// economies are throttled by their own policies instead.
    pub fn recruit(&mut self, kind_id: &str, owner: PlayerId, pos: Hex) -> Result<UnitId, GameError> {
        let kind =
            unit_kind_index(kind_id).ok_or_else(|| GameError::UnknownKind(kind_id.to_string()))?;
        let stats = get_unit_kind(kind);
        if self.turn.round < stats.unlock_round {
            return Err(GameError::KindLocked {
                kind: stats.id,
                unlock: stats.unlock_round,
                round: self.turn.round,
            });
        }
        let tile = self.grid.get(pos).ok_or(GameError::NoSuchTile(pos))?;
        if tile.owner != Some(owner) {
            return Err(GameError::NotOwnedTile(pos));
        }
        if owner == PlayerId::Human && self.turn.gold < stats.cost {
            return Err(GameError::NotEnoughGold {
                need: stats.cost,
                have: self.turn.gold,
            });
        }
        let id = self.units.spawn(kind, owner, pos)?;
        if owner == PlayerId::Human {
            self.turn.gold -= stats.cost;
        }
        Ok(id)
    }

    /// Movement range for a unit: existing, unoccupied tiles within its
    /// remaining moves. Applies the highlight and returns the set.
    pub fn select_unit(&mut self, id: UnitId) -> Result<Vec<Hex>, GameError> {
        let unit = *self.units.get(id).ok_or(UnitError::UnknownUnit(id))?;
        self.clear_selection();

        let reach = unit.moves_left as i32;
        let units = &self.units;
        let hexes: Vec<Hex> = self
            .grid
            .tiles()
            .map(|(hex, _)| hex)
            .filter(|hex| {
                let dist = unit.pos.distance_to(*hex);
                dist > 0 && dist <= reach && units.unit_at(*hex).is_none()
            })
            .collect();

        self.grid.highlight(&hexes);
        self.selection = hexes.clone();
        Ok(hexes)
    }

    /// Drop the highlight set, restoring base tile colors
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.grid.clear_highlights();
    }

    /// Win/lose from current tile ownership. The match ends when the AIs
    /// hold nothing (Victory) or the human holds nothing (Defeat).
    pub fn evaluate_outcome(&mut self) -> MatchOutcome {
        let human = self.grid.owned_count(PlayerId::Human);
        let ai = self.grid.ai_owned_count();
        self.outcome = if human == 0 {
            MatchOutcome::Defeat
        } else if ai == 0 {
            MatchOutcome::Victory
        } else {
            MatchOutcome::Ongoing
        };
        self.outcome
    }

    /// Restore the opening position: round 1, human turn, starting gold,
    /// level colors and ownership, fresh opening units
    pub fn reset(&mut self, level: &LevelData) {
        self.grid = HexGrid::from_level(level);
        self.units.clear();
        self.turn = TurnState::default();
        self.outcome = MatchOutcome::Ongoing;
        self.selection.clear();
        self.ensure_starting_units();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{TileSpec, AI_COLORS, HUMAN_COLOR, NEUTRAL_COLOR};
    use crate::turn::STARTING_GOLD;

    /// 5x1 strip: human tile, three neutral, AI tile
    fn strip_level() -> LevelData {
        LevelData {
            cols: 5,
            rows: 1,
            num_enemies: 1,
            tiles: vec![
                TileSpec { q: 0, r: 0, color: HUMAN_COLOR },
                TileSpec { q: 1, r: 0, color: NEUTRAL_COLOR },
                TileSpec { q: 2, r: 0, color: NEUTRAL_COLOR },
                TileSpec { q: 3, r: 0, color: NEUTRAL_COLOR },
                TileSpec { q: 4, r: 0, color: AI_COLORS[0] },
            ],
        }
    }

    fn strip_state() -> GameState {
        let mut state = GameState::from_level(&strip_level());
        state.ensure_starting_units();
        state
    }

    fn human_unit(state: &GameState) -> UnitId {
        state.units.owned_by(PlayerId::Human).next().unwrap().id
    }

    fn ai_unit(state: &GameState) -> UnitId {
        state.units.owned_by(PlayerId::Ai(1)).next().unwrap().id
    }

    #[test]
    fn test_starting_units_on_first_owned_tile() {
        let state = strip_state();
        assert_eq!(state.units.len(), 2);
        assert_eq!(state.units.unit_at(Hex::new(0, 0)).unwrap().owner, PlayerId::Human);
        assert_eq!(state.units.unit_at(Hex::new(4, 0)).unwrap().owner, PlayerId::Ai(1));
    }

    #[test]
    fn test_move_claims_tile_and_spends_moves() {
        let mut state = strip_state();
        let id = human_unit(&state);
        state.move_unit(id, Hex::new(2, 0)).unwrap();
        let unit = state.units.get(id).unwrap();
        assert_eq!(unit.pos, Hex::new(2, 0));
        assert_eq!(unit.moves_left, 0); // warrior allotment is 2
        assert_eq!(state.grid.get(Hex::new(2, 0)).unwrap().owner, Some(PlayerId::Human));
        assert_eq!(state.grid.get(Hex::new(2, 0)).unwrap().base_color, HUMAN_COLOR);
    }

    #[test]
    fn test_move_beyond_budget_rejected() {
        let mut state = strip_state();
        let id = human_unit(&state);
        assert!(matches!(
            state.move_unit(id, Hex::new(3, 0)),
            Err(GameError::TooFar { dist: 3, left: 2 })
        ));
        // nothing changed
        assert_eq!(state.units.get(id).unwrap().pos, Hex::new(0, 0));
        assert_eq!(state.units.get(id).unwrap().moves_left, 2);
    }

    #[test]
    fn test_move_off_map_rejected() {
        let mut state = strip_state();
        let id = human_unit(&state);
        assert!(matches!(
            state.move_unit(id, Hex::new(0, 5)),
            Err(GameError::NoSuchTile(_))
        ));
    }

    #[test]
    fn test_attack_requires_range() {
        let mut state = strip_state();
        let (a, v) = (human_unit(&state), ai_unit(&state));
        // 4 hexes apart, warrior range is 1
        assert!(matches!(state.attack(a, v), Err(GameError::OutOfRange)));
    }

    #[test]
    fn test_attack_wounds_and_spends_a_move() {
        let mut state = strip_state();
        let (a, v) = (human_unit(&state), ai_unit(&state));
        state.move_unit(a, Hex::new(2, 0)).unwrap();
        state.units.refresh_moves(a);
        state.move_unit(a, Hex::new(3, 0)).unwrap();
        let outcome = state.attack(a, v).unwrap();
        assert_eq!(outcome, CombatOutcome::VictimWounded { health: 5 });
        assert_eq!(state.units.get(v).unwrap().health, 5);
        assert_eq!(state.units.get(a).unwrap().moves_left, 0);
    }

    #[test]
    fn test_defeat_removes_unit_and_frees_tile() {
        let mut state = strip_state();
        let (a, v) = (human_unit(&state), ai_unit(&state));
        state.units.get_mut(a).unwrap().pos = Hex::new(3, 0); // test shortcut
        state.units.set_health(v, 4);
        let outcome = state.attack(a, v).unwrap();
        assert_eq!(outcome, CombatOutcome::VictimDefeated);
        assert!(state.units.get(v).is_none());
        assert!(state.units.unit_at(Hex::new(4, 0)).is_none());
    }

    #[test]
    fn test_recruit_spends_gold() {
        let mut state = strip_state();
        state.move_unit(human_unit(&state), Hex::new(1, 0)).unwrap();
        let id = state.recruit("warrior", PlayerId::Human, Hex::new(0, 0)).unwrap();
        assert_eq!(state.turn.gold, STARTING_GOLD - 10);
        assert_eq!(state.units.get(id).unwrap().owner, PlayerId::Human);
    }

    #[test]
    fn test_recruit_rules() {
        let mut state = strip_state();
        // occupied tile
        assert!(state.recruit("warrior", PlayerId::Human, Hex::new(0, 0)).is_err());
        // unowned tile
        assert!(matches!(
            state.recruit("warrior", PlayerId::Human, Hex::new(2, 0)),
            Err(GameError::NotOwnedTile(_))
        ));
        // locked kind: knight unlocks at round 6
        state.move_unit(human_unit(&state), Hex::new(1, 0)).unwrap();
        assert!(matches!(
            state.recruit("knight", PlayerId::Human, Hex::new(0, 0)),
            Err(GameError::KindLocked { unlock: 6, .. })
        ));
        // unknown kind
        assert!(matches!(
            state.recruit("wizard", PlayerId::Human, Hex::new(0, 0)),
            Err(GameError::UnknownKind(_))
        ));
        // broke
        state.turn.gold = 3;
        assert!(matches!(
            state.recruit("warrior", PlayerId::Human, Hex::new(0, 0)),
            Err(GameError::NotEnoughGold { need: 10, have: 3 })
        ));
    }

    #[test]
    fn test_select_highlights_reachable_tiles() {
        let mut state = strip_state();
        let id = human_unit(&state);
        let hexes = state.select_unit(id).unwrap();
        // warrior at (0,0) with 2 moves reaches (1,0) and (2,0); (4,0) is
        // occupied and out of reach anyway
        assert_eq!(hexes.len(), 2);
        assert!(hexes.contains(&Hex::new(1, 0)));
        assert!(hexes.contains(&Hex::new(2, 0)));
        for hex in &hexes {
            assert_ne!(
                state.grid.get(*hex).unwrap().color,
                state.grid.get(*hex).unwrap().base_color
            );
        }
        state.clear_selection();
        assert!(state.selection().is_empty());
        assert_eq!(
            state.grid.get(Hex::new(1, 0)).unwrap().color,
            NEUTRAL_COLOR
        );
    }

    #[test]
    fn test_outcome_from_tile_counts() {
        let mut state = strip_state();
        assert_eq!(state.evaluate_outcome(), MatchOutcome::Ongoing);

        let mut win = strip_state();
        win.grid.set_owner(Hex::new(4, 0), None);
        assert_eq!(win.evaluate_outcome(), MatchOutcome::Victory);

        let mut lose = strip_state();
        lose.grid.set_owner(Hex::new(0, 0), Some(PlayerId::Ai(1)));
        assert_eq!(lose.evaluate_outcome(), MatchOutcome::Defeat);
    }

    #[test]
    fn test_outcome_ignores_unit_counts() {
        let mut state = strip_state();
        let v = ai_unit(&state);
        state.units.remove(v);
        // AI still owns a tile, so the match is not won
        assert_eq!(state.evaluate_outcome(), MatchOutcome::Ongoing);
    }

    #[test]
    fn test_reset_restores_opening_position() {
        let level = strip_level();
        let mut state = strip_state();
        let id = human_unit(&state);
        state.move_unit(id, Hex::new(2, 0)).unwrap();
        state.turn.gold = 7;
        state.turn.round = 9;
        state.turn.turn_index = 1;

        state.reset(&level);

        assert_eq!(state.turn.round, 1);
        assert_eq!(state.turn.turn_index, 0);
        assert_eq!(state.turn.gold, STARTING_GOLD);
        assert_eq!(state.outcome(), MatchOutcome::Ongoing);
        let tile = state.grid.get(Hex::new(2, 0)).unwrap();
        assert_eq!(tile.owner, None);
        assert_eq!(tile.base_color, NEUTRAL_COLOR);
        assert_eq!(state.units.len(), 2);
        assert!(state.units.unit_at(Hex::new(0, 0)).is_some());
    }
}
