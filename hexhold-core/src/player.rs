//! Player identities and turn ordering

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Session-stable identity for the human player and each AI opponent.
///
/// This is the sole key linking tile ownership, unit ownership, and the turn
/// order. On the wire it is the string `"Player 1"` or `"AI n"` (1-indexed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerId {
    Human,
    Ai(u8),
}

impl PlayerId {
    pub fn is_ai(&self) -> bool {
        matches!(self, PlayerId::Ai(_))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::Human => write!(f, "Player 1"),
            PlayerId::Ai(n) => write!(f, "AI {n}"),
        }
    }
}

impl FromStr for PlayerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "Player 1" {
            return Ok(PlayerId::Human);
        }
        if let Some(n) = s.strip_prefix("AI ") {
            let n: u8 = n.parse().map_err(|_| format!("bad AI index in {s:?}"))?;
            if n == 0 {
                return Err("AI indices are 1-based".to_string());
            }
            return Ok(PlayerId::Ai(n));
        }
        Err(format!("unknown player identifier {s:?}"))
    }
}

impl Serialize for PlayerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Ordered turn roster for a session: the human first, then each AI
pub fn turn_order(num_enemies: u8) -> Vec<PlayerId> {
    let mut order = Vec::with_capacity(num_enemies as usize + 1);
    order.push(PlayerId::Human);
    for i in 1..=num_enemies {
        order.push(PlayerId::Ai(i));
    }
    order
}
