//! HEXHOLD Core - deterministic hex-territory game engine
//!
//! This crate provides the core game logic for HEXHOLD:
//! - Hex grid with axial coordinates and tile ownership
//! - Unit roster, movement budgets, and combat resolution
//! - The round/turn state machine with territory income
//! - AI opponent decision policies
//! - The persistence gateway keeping state durable across sessions

pub mod ai;
pub mod board;
pub mod combat;
pub mod game;
pub mod grid;
pub mod level;
pub mod persist;
pub mod player;
pub mod session;
pub mod turn;
pub mod units;

// Re-exports for convenient access
pub use ai::{build_opponents, AiOpponent};
pub use board::{Hex, DIRECTIONS};
pub use combat::{in_attack_range, resolve, CombatError, CombatOutcome};
pub use game::{GameError, GameState, MatchOutcome};
pub use grid::{HexGrid, Tile};
pub use level::LevelData;
pub use persist::{
    MemoryStore, PersistenceGateway, StateStore, StoreError, TileRow, TurnRow, UnitRow,
};
pub use player::PlayerId;
pub use session::GameSession;
pub use turn::{
    Progression, TurnEngine, TurnPhase, TurnReport, TurnState, INCOME_PER_TILE, STARTING_GOLD,
};
pub use units::{get_unit_kind, unit_kind_index, Unit, UnitId, UnitRegistry, UNIT_KINDS};
