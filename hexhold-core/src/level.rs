//! Level data and the palette-to-player mapping

use crate::player::PlayerId;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Terrain color for unowned tiles
pub const NEUTRAL_COLOR: u32 = 0x8a8a8a;

/// Territory color for the human player
pub const HUMAN_COLOR: u32 = 0x3cb371;

/// Territory colors for AI opponents, by AI index (1-based, wraps)
pub const AI_COLORS: [u32; 4] = [0xcd5c5c, 0x9370db, 0xdaa520, 0x4682b4];

/// Transient movement-range highlight color
pub const HIGHLIGHT_COLOR: u32 = 0xffd700;

/// A tile as it appears in level JSON
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TileSpec {
    pub q: i32,
    pub r: i32,
    pub color: u32,
}

/// Level definition loaded from JSON
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelData {
    pub cols: u32,
    pub rows: u32,
    pub num_enemies: u8,
    pub tiles: Vec<TileSpec>,
}

impl LevelData {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid level JSON")
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read level file: {}", path.display()))?;
        Self::from_json(&content)
    }
}

/// Owner auto-assigned at load time for tiles painted in a player color
pub fn owner_for_color(color: u32) -> Option<PlayerId> {
    if color == HUMAN_COLOR {
        return Some(PlayerId::Human);
    }
    AI_COLORS
        .iter()
        .position(|&c| c == color)
        .map(|i| PlayerId::Ai(i as u8 + 1))
}

/// Territory color for a player
pub fn color_for_owner(owner: PlayerId) -> u32 {
    match owner {
        PlayerId::Human => HUMAN_COLOR,
        PlayerId::Ai(n) => AI_COLORS[(n as usize - 1) % AI_COLORS.len()],
    }
}
