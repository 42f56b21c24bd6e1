//! Persistence gateway and the durable-store contract
//!
//! The store is a row-oriented backend addressed by level and table name.
//! Every call may fail on its own; callers treat failure as "state
//! unchanged, proceed with defaults" and log it. Loads are idempotent.

use crate::board::Hex;
use crate::game::GameState;
use crate::player::PlayerId;
use crate::turn::{TurnState, STARTING_GOLD};
use crate::units::{get_unit_kind, unit_kind_index, Unit};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

pub const TURN_STATE_TABLE: &str = "turn_state";
pub const TILES_TABLE: &str = "tiles";
pub const UNITS_TABLE: &str = "units_state";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend: {0}")]
    Backend(String),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// Durable key/value-by-table store reached over independently failable
/// calls. Backends live in their own crate; tests use [`MemoryStore`].
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self, level: &str, table: &str) -> Result<Option<Value>, StoreError>;
    async fn save(&self, level: &str, table: &str, data: Value) -> Result<(), StoreError>;
}

/// Wire row for the `turn_state` table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRow {
    pub round: u32,
    pub turn: usize,
    /// Older rows predate the gold column; they restore the opening purse
    #[serde(default = "starting_gold")]
    pub gold: i64,
}

fn starting_gold() -> i64 {
    STARTING_GOLD
}

/// Wire row for the `tiles` table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRow {
    pub q: i32,
    pub r: i32,
    pub color: u32,
    pub owner: Option<PlayerId>,
}

/// Wire row for the `units_state` table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRow {
    pub id: u64,
    pub unit_type: String,
    pub current_health: i32,
    pub owned_by: PlayerId,
    pub q_pos: i32,
    pub r_pos: i32,
    pub moves_left: u32,
}

/// Typed load/save over a [`StateStore`], bound to one level
pub struct PersistenceGateway<S> {
    store: S,
    level: String,
}

impl<S: StateStore> PersistenceGateway<S> {
    pub fn new(store: S, level: impl Into<String>) -> Self {
        Self {
            store,
            level: level.into(),
        }
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub async fn save_turn_state(&self, turn: &TurnState) -> Result<(), StoreError> {
        let row = TurnRow {
            round: turn.round,
            turn: turn.turn_index,
            gold: turn.gold,
        };
        self.store
            .save(&self.level, TURN_STATE_TABLE, serde_json::to_value(row)?)
            .await
    }

    pub async fn load_turn_state(&self) -> Result<Option<TurnRow>, StoreError> {
        match self.store.load(&self.level, TURN_STATE_TABLE).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn save_tiles(&self, rows: &[TileRow]) -> Result<(), StoreError> {
        self.store
            .save(&self.level, TILES_TABLE, serde_json::to_value(rows)?)
            .await
    }

    pub async fn load_tiles(&self) -> Result<Option<Vec<TileRow>>, StoreError> {
        match self.store.load(&self.level, TILES_TABLE).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn save_units(&self, rows: &[UnitRow]) -> Result<(), StoreError> {
        self.store
            .save(&self.level, UNITS_TABLE, serde_json::to_value(rows)?)
            .await
    }

    /// An absent table reads as an empty roster
    pub async fn load_units(&self) -> Result<Vec<UnitRow>, StoreError> {
        match self.store.load(&self.level, UNITS_TABLE).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    /// Durable snapshot of the whole session: turn counters, tile
    /// ownership/color, unit roster. Fire-and-log: every failure is logged
    /// and swallowed so gameplay never blocks on the store.
    pub async fn save_snapshot(&self, state: &GameState) {
        if let Err(err) = self.save_turn_state(state.turn()).await {
            tracing::warn!("turn_state save failed for {}: {err}", self.level);
        }
        if let Err(err) = self.save_tiles(&tile_rows(state)).await {
            tracing::warn!("tiles save failed for {}: {err}", self.level);
        }
        if let Err(err) = self.save_units(&unit_rows(state)).await {
            tracing::warn!("units_state save failed for {}: {err}", self.level);
        }
    }
}

// ============================================================================
// STATE <-> ROW TRANSLATION
// ============================================================================

/// Snapshot the grid as wire rows (persistent colors, never highlights)
pub fn tile_rows(state: &GameState) -> Vec<TileRow> {
    state
        .grid()
        .tiles()
        .map(|(hex, tile)| TileRow {
            q: hex.q,
            r: hex.r,
            color: tile.base_color,
            owner: tile.owner,
        })
        .collect()
}

pub fn unit_rows(state: &GameState) -> Vec<UnitRow> {
    state
        .units()
        .iter()
        .map(|u| UnitRow {
            id: u.id,
            unit_type: get_unit_kind(u.kind).id.to_string(),
            current_health: u.health,
            owned_by: u.owner,
            q_pos: u.pos.q,
            r_pos: u.pos.r,
            moves_left: u.moves_left,
        })
        .collect()
}

pub fn apply_turn_row(state: &mut GameState, row: TurnRow) {
    state.turn.round = row.round;
    state.turn.turn_index = row.turn;
    state.turn.gold = row.gold;
}

/// Rows for hexes missing from the grid are dropped quietly
pub fn apply_tile_rows(state: &mut GameState, rows: &[TileRow]) {
    for row in rows {
        let hex = Hex::new(row.q, row.r);
        state.grid.set_color(hex, row.color);
        state.grid.set_owner(hex, row.owner);
    }
}

/// Rebuild the roster from persisted rows. Rows with unknown kinds or
/// conflicting tiles are skipped with a warning rather than failing the load.
pub fn apply_unit_rows(state: &mut GameState, rows: &[UnitRow]) {
    state.units.clear();
    for row in rows {
        let Some(kind) = unit_kind_index(&row.unit_type) else {
            tracing::warn!("unknown unit type {:?} in units_state, skipping", row.unit_type);
            continue;
        };
        let unit = Unit {
            id: row.id,
            kind,
            owner: row.owned_by,
            health: row.current_health,
            pos: Hex::new(row.q_pos, row.r_pos),
            moves_left: row.moves_left,
        };
        if let Err(err) = state.units.add(unit) {
            tracing::warn!("skipping persisted unit {}: {err}", row.id);
        }
    }
}

// ============================================================================
// MEMORY STORE
// ============================================================================

/// In-memory store for tests and offline sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<(String, String), Value>>,
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self, level: &str, table: &str) -> Result<Option<Value>, StoreError> {
        let tables = self
            .tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))?;
        Ok(tables.get(&(level.to_string(), table.to_string())).cloned())
    }

    async fn save(&self, level: &str, table: &str, data: Value) -> Result<(), StoreError> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))?;
        tables.insert((level.to_string(), table.to_string()), data);
        Ok(())
    }
}
