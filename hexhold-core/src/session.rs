//! Session orchestration: the inbound event surface
//!
//! A [`GameSession`] owns the game state, the turn engine with its AI roster,
//! and the persistence gateway, and exposes the triggers the outside world
//! sends in: end turn, unit selected, reset, save, load, plus the human
//! action commands. All mutation funnels through `&mut self`, so no two
//! triggers can interleave with an in-flight round.

use crate::ai::build_opponents;
use crate::board::Hex;
use crate::combat::CombatOutcome;
use crate::game::{GameError, GameState, MatchOutcome};
use crate::level::LevelData;
use crate::persist::{
    apply_tile_rows, apply_turn_row, apply_unit_rows, PersistenceGateway, StateStore,
};
use crate::player::PlayerId;
use crate::turn::{TurnEngine, TurnPhase, TurnReport};
use crate::units::{UnitError, UnitId};

pub struct GameSession<S: StateStore> {
    level: LevelData,
    state: GameState,
    engine: TurnEngine,
    gateway: PersistenceGateway<S>,
}

impl<S: StateStore> GameSession<S> {
    /// Build a session for a level and restore any persisted state.
    ///
    /// Store failures fall back to a fresh start; a level with no tiles is a
    /// setup error and surfaces to the caller as a visible diagnostic.
    pub async fn start(
        level: LevelData,
        store: S,
        level_name: &str,
        seed: u64,
    ) -> anyhow::Result<Self> {
        if level.tiles.is_empty() {
            anyhow::bail!("level {level_name:?} has no tiles");
        }
        let engine = TurnEngine::new(build_opponents(level.num_enemies, seed));
        let mut state = GameState::from_level(&level);
        state.ensure_starting_units();
        let gateway = PersistenceGateway::new(store, level_name);
        let mut session = Self {
            level,
            state,
            engine,
            gateway,
        };
        session.restore().await;
        Ok(session)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn outcome(&self) -> MatchOutcome {
        self.state.outcome()
    }

    /// "End turn" trigger: run one full round through the engine
    pub async fn end_turn(&mut self) -> TurnReport {
        self.engine.advance_turn(&mut self.state, &self.gateway).await
    }

    /// "Unit selected" trigger: highlight the unit's movement range
    pub fn select_unit(&mut self, id: UnitId) -> Result<Vec<Hex>, GameError> {
        self.require_human_turn()?;
        self.require_own_unit(id)?;
        self.state.select_unit(id)
    }

    pub fn clear_selection(&mut self) {
        self.state.clear_selection();
    }

    pub fn move_unit(&mut self, id: UnitId, to: Hex) -> Result<(), GameError> {
        self.require_human_turn()?;
        self.require_own_unit(id)?;
        self.state.clear_selection();
        self.state.move_unit(id, to)
    }

    pub fn attack(&mut self, attacker: UnitId, victim: UnitId) -> Result<CombatOutcome, GameError> {
        self.require_human_turn()?;
        self.require_own_unit(attacker)?;
        self.state.clear_selection();
        self.state.attack(attacker, victim)
    }

    pub fn recruit(&mut self, kind: &str, pos: Hex) -> Result<UnitId, GameError> {
        self.require_human_turn()?;
        self.state.recruit(kind, PlayerId::Human, pos)
    }

    /// Manual checkpoint; failures are logged, never surfaced
    pub async fn save(&self) {
        self.gateway.save_snapshot(&self.state).await;
    }

    /// Manual reload from the store. If nothing can be loaded the in-memory
    /// state is left untouched.
    pub async fn load(&mut self) {
        self.restore().await;
    }

    /// "Reset" trigger: back to the opening position, persisted immediately
    pub async fn reset(&mut self) {
        self.state.reset(&self.level);
        self.gateway.save_snapshot(&self.state).await;
    }

    fn require_human_turn(&self) -> Result<(), GameError> {
        if self.state.turn().phase() != TurnPhase::HumanTurn {
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }

    fn require_own_unit(&self, id: UnitId) -> Result<(), GameError> {
        match self.state.units().get(id) {
            Some(unit) if unit.owner == PlayerId::Human => Ok(()),
            Some(_) => Err(GameError::NotYourUnit(id)),
            None => Err(UnitError::UnknownUnit(id).into()),
        }
    }

    /// Rebuild state from the store on top of the level defaults. Each table
    /// loads independently; if every load fails the previous in-memory state
    /// stays in place.
    async fn restore(&mut self) {
        let turn = self.gateway.load_turn_state().await;
        let tiles = self.gateway.load_tiles().await;
        let units = self.gateway.load_units().await;

        if turn.is_err() && tiles.is_err() && units.is_err() {
            tracing::warn!(
                "store unreachable for {}, keeping current state",
                self.gateway.level()
            );
            return;
        }

        let mut state = GameState::from_level(&self.level);
        match turn {
            Ok(Some(row)) => apply_turn_row(&mut state, row),
            Ok(None) => {}
            Err(err) => tracing::warn!("turn_state load failed, using defaults: {err}"),
        }
        match tiles {
            Ok(Some(rows)) => apply_tile_rows(&mut state, &rows),
            Ok(None) => {}
            Err(err) => tracing::warn!("tiles load failed, using level colors: {err}"),
        }
        match units {
            Ok(rows) if !rows.is_empty() => apply_unit_rows(&mut state, &rows),
            Ok(_) => state.ensure_starting_units(),
            Err(err) => {
                tracing::warn!("units_state load failed, spawning openers: {err}");
                state.ensure_starting_units();
            }
        }
        state.evaluate_outcome();
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{TileSpec, AI_COLORS, HUMAN_COLOR, NEUTRAL_COLOR};
    use crate::persist::{MemoryStore, StateStore, StoreError};
    use crate::turn::STARTING_GOLD;
    use async_trait::async_trait;
    use serde_json::Value;

    fn level() -> LevelData {
        LevelData {
            cols: 4,
            rows: 1,
            num_enemies: 1,
            tiles: vec![
                TileSpec { q: 0, r: 0, color: HUMAN_COLOR },
                TileSpec { q: 1, r: 0, color: NEUTRAL_COLOR },
                TileSpec { q: 2, r: 0, color: NEUTRAL_COLOR },
                TileSpec { q: 3, r: 0, color: AI_COLORS[0] },
            ],
        }
    }

    /// Store whose every call fails
    struct DeadStore;

    #[async_trait]
    impl StateStore for DeadStore {
        async fn load(&self, _level: &str, _table: &str) -> Result<Option<Value>, StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }
        async fn save(&self, _level: &str, _table: &str, _data: Value) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_fresh_session_spawns_openers() {
        let session = GameSession::start(level(), MemoryStore::default(), "alpha", 42)
            .await
            .unwrap();
        assert_eq!(session.state().units().len(), 2);
        assert_eq!(session.state().turn().gold, STARTING_GOLD);
        assert_eq!(session.outcome(), MatchOutcome::Ongoing);
    }

    #[tokio::test]
    async fn test_empty_level_is_a_setup_error() {
        let level = LevelData {
            cols: 0,
            rows: 0,
            num_enemies: 1,
            tiles: vec![],
        };
        assert!(GameSession::start(level, MemoryStore::default(), "broken", 42)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let mut session = GameSession::start(level(), MemoryStore::default(), "alpha", 42)
            .await
            .unwrap();
        let unit = session
            .state()
            .units()
            .owned_by(PlayerId::Human)
            .next()
            .unwrap()
            .id;
        session.move_unit(unit, Hex::new(1, 0)).unwrap();
        session.save().await;

        // scribble over the live state, then reload the checkpoint
        session.state.turn.gold = 1;
        session.state.units.clear();
        session.load().await;

        assert_eq!(session.state().turn().gold, STARTING_GOLD);
        assert_eq!(session.state().units().len(), 2);
        assert_eq!(
            session.state().units().unit_at(Hex::new(1, 0)).unwrap().owner,
            PlayerId::Human
        );
        assert_eq!(
            session.state().grid().get(Hex::new(1, 0)).unwrap().owner,
            Some(PlayerId::Human)
        );
    }

    #[tokio::test]
    async fn test_gameplay_continues_when_store_is_dead() {
        let mut session = GameSession::start(level(), DeadStore, "alpha", 42)
            .await
            .unwrap();
        assert_eq!(session.state().units().len(), 2);

        let report = session.end_turn().await;
        assert!(report.advanced);
        assert_eq!(session.state().turn().round, 2);

        // a manual load against a dead store leaves the state alone
        let gold = session.state().turn().gold;
        session.load().await;
        assert_eq!(session.state().turn().round, 2);
        assert_eq!(session.state().turn().gold, gold);
    }

    #[tokio::test]
    async fn test_reset_restores_and_persists_opening() {
        let mut session = GameSession::start(level(), MemoryStore::default(), "alpha", 42)
            .await
            .unwrap();
        session.end_turn().await;
        session.end_turn().await;
        assert!(session.state().turn().round > 1);

        session.reset().await;
        assert_eq!(session.state().turn().round, 1);
        assert_eq!(session.state().turn().turn_index, 0);
        assert_eq!(session.state().turn().gold, STARTING_GOLD);

        // the reset is what the store now holds
        session.load().await;
        assert_eq!(session.state().turn().round, 1);
        assert_eq!(session.state().turn().gold, STARTING_GOLD);
    }

    #[tokio::test]
    async fn test_actions_gated_to_human_units() {
        let mut session = GameSession::start(level(), MemoryStore::default(), "alpha", 42)
            .await
            .unwrap();
        let enemy = session
            .state()
            .units()
            .owned_by(PlayerId::Ai(1))
            .next()
            .unwrap()
            .id;
        assert!(matches!(
            session.move_unit(enemy, Hex::new(2, 0)),
            Err(GameError::NotYourUnit(_))
        ));
        assert!(matches!(
            session.select_unit(9999),
            Err(GameError::Unit(UnitError::UnknownUnit(9999)))
        ));
    }
}
