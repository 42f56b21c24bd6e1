//! Tile map and ownership state

use crate::board::Hex;
use crate::level::{color_for_owner, owner_for_color, LevelData, HIGHLIGHT_COLOR};
use crate::player::PlayerId;
use rustc_hash::FxHashMap;

/// A single map tile
#[derive(Clone, Debug)]
pub struct Tile {
    /// Persistent palette color, saved and restored across sessions
    pub base_color: u32,
    /// Display color; diverges from base only while highlighted
    pub color: u32,
    pub owner: Option<PlayerId>,
}

/// Canonical map of axial coordinates to tiles.
///
/// Iteration follows level-load insertion order. Writes to hexes that are not
/// in the map are no-ops, so sparse or malformed level data degrades quietly.
#[derive(Clone, Debug, Default)]
pub struct HexGrid {
    tiles: FxHashMap<Hex, Tile>,
    order: Vec<Hex>,
}

impl HexGrid {
    /// Build the grid from level data, auto-assigning owners for tiles
    /// painted in a player color
    pub fn from_level(level: &LevelData) -> Self {
        let mut grid = Self::default();
        for spec in &level.tiles {
            let hex = Hex::new(spec.q, spec.r);
            let tile = Tile {
                base_color: spec.color,
                color: spec.color,
                owner: owner_for_color(spec.color),
            };
            if grid.tiles.insert(hex, tile).is_none() {
                grid.order.push(hex);
            }
        }
        grid
    }

    pub fn get(&self, hex: Hex) -> Option<&Tile> {
        self.tiles.get(&hex)
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.tiles.contains_key(&hex)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ownership transfer: a bare state write with no other side effects.
    /// Deciding *when* ownership changes is the caller's responsibility.
    pub fn set_owner(&mut self, hex: Hex, owner: Option<PlayerId>) {
        if let Some(tile) = self.tiles.get_mut(&hex) {
            tile.owner = owner;
        }
    }

    /// Repaint a tile's persistent color
    pub fn set_color(&mut self, hex: Hex, color: u32) {
        if let Some(tile) = self.tiles.get_mut(&hex) {
            tile.base_color = color;
            tile.color = color;
        }
    }

    /// Ownership write plus the matching territory repaint
    pub fn claim(&mut self, hex: Hex, owner: PlayerId) {
        if let Some(tile) = self.tiles.get_mut(&hex) {
            tile.owner = Some(owner);
            let color = color_for_owner(owner);
            tile.base_color = color;
            tile.color = color;
        }
    }

    /// Tiles in level-load insertion order
    pub fn tiles(&self) -> impl Iterator<Item = (Hex, &Tile)> + '_ {
        self.order.iter().map(move |hex| (*hex, &self.tiles[hex]))
    }

    /// Count of tiles owned by the given player
    pub fn owned_count(&self, owner: PlayerId) -> usize {
        self.tiles
            .values()
            .filter(|t| t.owner == Some(owner))
            .count()
    }

    /// Count of tiles owned by any AI opponent
    pub fn ai_owned_count(&self) -> usize {
        self.tiles
            .values()
            .filter(|t| matches!(t.owner, Some(PlayerId::Ai(_))))
            .count()
    }

    /// Mark tiles with the transient highlight color
    pub fn highlight(&mut self, hexes: &[Hex]) {
        for &hex in hexes {
            if let Some(tile) = self.tiles.get_mut(&hex) {
                tile.color = HIGHLIGHT_COLOR;
            }
        }
    }

    /// Restore every tile's display color to its base color
    pub fn clear_highlights(&mut self) {
        for tile in self.tiles.values_mut() {
            tile.color = tile.base_color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{AI_COLORS, HUMAN_COLOR, NEUTRAL_COLOR, TileSpec};

    fn small_level() -> LevelData {
        LevelData {
            cols: 2,
            rows: 2,
            num_enemies: 1,
            tiles: vec![
                TileSpec { q: 0, r: 0, color: HUMAN_COLOR },
                TileSpec { q: 1, r: 0, color: NEUTRAL_COLOR },
                TileSpec { q: 0, r: 1, color: AI_COLORS[0] },
                TileSpec { q: 1, r: 1, color: NEUTRAL_COLOR },
            ],
        }
    }

    #[test]
    fn test_from_level_assigns_owners() {
        let grid = HexGrid::from_level(&small_level());
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.get(Hex::new(0, 0)).unwrap().owner, Some(PlayerId::Human));
        assert_eq!(grid.get(Hex::new(0, 1)).unwrap().owner, Some(PlayerId::Ai(1)));
        assert_eq!(grid.get(Hex::new(1, 0)).unwrap().owner, None);
    }

    #[test]
    fn test_insertion_order_is_level_order() {
        let grid = HexGrid::from_level(&small_level());
        let hexes: Vec<Hex> = grid.tiles().map(|(h, _)| h).collect();
        assert_eq!(
            hexes,
            vec![Hex::new(0, 0), Hex::new(1, 0), Hex::new(0, 1), Hex::new(1, 1)]
        );
    }

    #[test]
    fn test_absent_hex_writes_are_noops() {
        let mut grid = HexGrid::from_level(&small_level());
        grid.set_owner(Hex::new(9, 9), Some(PlayerId::Human));
        grid.set_color(Hex::new(9, 9), 0x123456);
        grid.claim(Hex::new(-3, 0), PlayerId::Ai(1));
        assert_eq!(grid.len(), 4);
        assert!(grid.get(Hex::new(9, 9)).is_none());
    }

    #[test]
    fn test_claim_repaints() {
        let mut grid = HexGrid::from_level(&small_level());
        grid.claim(Hex::new(1, 0), PlayerId::Human);
        let tile = grid.get(Hex::new(1, 0)).unwrap();
        assert_eq!(tile.owner, Some(PlayerId::Human));
        assert_eq!(tile.base_color, HUMAN_COLOR);
        assert_eq!(grid.owned_count(PlayerId::Human), 2);
    }

    #[test]
    fn test_highlight_and_clear() {
        let mut grid = HexGrid::from_level(&small_level());
        grid.highlight(&[Hex::new(1, 0), Hex::new(9, 9)]);
        assert_eq!(grid.get(Hex::new(1, 0)).unwrap().color, HIGHLIGHT_COLOR);
        assert_eq!(grid.get(Hex::new(1, 0)).unwrap().base_color, NEUTRAL_COLOR);
        grid.clear_highlights();
        assert_eq!(grid.get(Hex::new(1, 0)).unwrap().color, NEUTRAL_COLOR);
    }

    #[test]
    fn test_owned_counts() {
        let grid = HexGrid::from_level(&small_level());
        assert_eq!(grid.owned_count(PlayerId::Human), 1);
        assert_eq!(grid.owned_count(PlayerId::Ai(1)), 1);
        assert_eq!(grid.ai_owned_count(), 1);
    }
}
