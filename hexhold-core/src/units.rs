//! Unit type definitions and the live roster

use crate::board::Hex;
use crate::player::PlayerId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unit identity, assigned by the persistence layer or allocated locally
pub type UnitId = u64;

/// Unit kind identifier (index into UNIT_KINDS)
pub type UnitKindId = u8;

/// Index of the basic warrior kind
pub const WARRIOR: UnitKindId = 0;

/// Unit kind definition
#[derive(Clone, Debug)]
pub struct UnitKind {
    pub id: &'static str,
    pub name: &'static str,
    pub max_health: i32,
    pub damage: i32,
    pub attack_range: i32,
    /// Per-round move allotment
    pub moves: u32,
    pub cost: i64,
    /// First round the kind can be recruited
    pub unlock_round: u32,
}

impl UnitKind {
    const fn new(
        id: &'static str,
        name: &'static str,
        max_health: i32,
        damage: i32,
        attack_range: i32,
        moves: u32,
        cost: i64,
        unlock_round: u32,
    ) -> Self {
        Self {
            id,
            name,
            max_health,
            damage,
            attack_range,
            moves,
            cost,
            unlock_round,
        }
    }
}

/// All unit kinds
pub static UNIT_KINDS: [UnitKind; 3] = [
    UnitKind::new("warrior", "Warrior", 10, 5, 1, 2, 10, 1),
    UnitKind::new("archer", "Archer", 8, 4, 2, 2, 25, 3),
    UnitKind::new("knight", "Knight", 16, 7, 1, 3, 40, 6),
];

/// Get unit kind index from string ID
pub fn unit_kind_index(id: &str) -> Option<UnitKindId> {
    UNIT_KINDS.iter().position(|k| k.id == id).map(|i| i as u8)
}

/// Get unit kind from index
pub fn get_unit_kind(idx: UnitKindId) -> &'static UnitKind {
    &UNIT_KINDS[idx as usize]
}

/// A unit on the map
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKindId,
    pub owner: PlayerId,
    pub health: i32,
    pub pos: Hex,
    pub moves_left: u32,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UnitError {
    #[error("unit {0} is not registered")]
    UnknownUnit(UnitId),
    #[error("unit id {0} is already registered")]
    DuplicateId(UnitId),
    #[error("tile {0} already hosts a unit")]
    TileOccupied(Hex),
}

/// Live roster of units, keyed by identity, with a tile index for occupancy.
///
/// The unit/tile relationship is held as two lookups (id -> unit with its
/// position, hex -> id) rather than cyclic references, so removal can never
/// leave a dangling tile lock.
#[derive(Clone, Debug, Default)]
pub struct UnitRegistry {
    units: FxHashMap<UnitId, Unit>,
    by_tile: FxHashMap<Hex, UnitId>,
    next_id: UnitId,
}

impl UnitRegistry {
    /// Register a unit with an externally assigned id (persisted rows)
    pub fn add(&mut self, unit: Unit) -> Result<(), UnitError> {
        if self.units.contains_key(&unit.id) {
            return Err(UnitError::DuplicateId(unit.id));
        }
        if self.by_tile.contains_key(&unit.pos) {
            return Err(UnitError::TileOccupied(unit.pos));
        }
        self.by_tile.insert(unit.pos, unit.id);
        self.next_id = self.next_id.max(unit.id + 1);
        self.units.insert(unit.id, unit);
        Ok(())
    }

    /// Create a fresh unit of a kind at a position, allocating the next id
    pub fn spawn(&mut self, kind: UnitKindId, owner: PlayerId, pos: Hex) -> Result<UnitId, UnitError> {
        let stats = get_unit_kind(kind);
        let unit = Unit {
            id: self.next_id,
            kind,
            owner,
            health: stats.max_health,
            pos,
            moves_left: stats.moves,
        };
        let id = unit.id;
        self.add(unit)?;
        Ok(id)
    }

    /// Remove a unit, clearing its tile binding
    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(&id)?;
        self.by_tile.remove(&unit.pos);
        Some(unit)
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Occupant of a tile, if any
    pub fn unit_at(&self, hex: Hex) -> Option<&Unit> {
        self.by_tile.get(&hex).and_then(|id| self.units.get(id))
    }

    pub fn owned_by(&self, owner: PlayerId) -> impl Iterator<Item = &Unit> + '_ {
        self.units.values().filter(move |u| u.owner == owner)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Rebind a unit to a new tile. Movement budget and grid membership are
    /// the caller's rules; this only keeps the two indexes consistent.
    pub fn move_unit(&mut self, id: UnitId, to: Hex) -> Result<(), UnitError> {
        if !self.units.contains_key(&id) {
            return Err(UnitError::UnknownUnit(id));
        }
        if let Some(&occupant) = self.by_tile.get(&to) {
            if occupant != id {
                return Err(UnitError::TileOccupied(to));
            }
            return Ok(());
        }
        let unit = self.units.get_mut(&id).ok_or(UnitError::UnknownUnit(id))?;
        self.by_tile.remove(&unit.pos);
        unit.pos = to;
        self.by_tile.insert(to, id);
        Ok(())
    }

    /// Restore a unit's move allotment for a new round. Callers invoke this
    /// only for units of the currently-active player.
    pub fn refresh_moves(&mut self, id: UnitId) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.moves_left = get_unit_kind(unit.kind).moves;
        }
    }

    pub fn set_health(&mut self, id: UnitId, health: i32) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.health = health;
        }
    }

    pub fn clear(&mut self) {
        self.units.clear();
        self.by_tile.clear();
        self.next_id = 0;
    }
}
