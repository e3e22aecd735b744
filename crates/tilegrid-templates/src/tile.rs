//! Tile type codes: the contract with the downstream solver.

use serde::{Deserialize, Serialize};

/// Semantic meaning of one grid cell.
///
/// The discriminant is the integer written to the output matrix. Codes
/// `0..=13` are the solver's original vocabulary; the variants above that
/// refine stones, characters and spikes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum TileType {
    Floor = 0,
    Wall = 1,
    Diamond = 2,
    Key = 3,
    Character = 4,
    Door = 5,
    Stone = 6,
    SpikesInside = 7,
    Exit = 8,
    Hole = 9,
    Lava = 10,
    Gate = 11,
    Button = 12,
    Statue = 13,
    CharacterOnButton = 14,
    CharacterWithKey = 15,
    StoneInHole = 16,
    StoneOnButton = 17,
    StoneOnSpikes = 18,
    SpikesOutside = 19,
}

impl TileType {
    pub const ALL: [TileType; 20] = [
        TileType::Floor,
        TileType::Wall,
        TileType::Diamond,
        TileType::Key,
        TileType::Character,
        TileType::Door,
        TileType::Stone,
        TileType::SpikesInside,
        TileType::Exit,
        TileType::Hole,
        TileType::Lava,
        TileType::Gate,
        TileType::Button,
        TileType::Statue,
        TileType::CharacterOnButton,
        TileType::CharacterWithKey,
        TileType::StoneInHole,
        TileType::StoneOnButton,
        TileType::StoneOnSpikes,
        TileType::SpikesOutside,
    ];

    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub fn is_character(self) -> bool {
        matches!(
            self,
            TileType::Character | TileType::CharacterOnButton | TileType::CharacterWithKey
        )
    }

    pub fn is_stone(self) -> bool {
        matches!(
            self,
            TileType::Stone
                | TileType::StoneInHole
                | TileType::StoneOnButton
                | TileType::StoneOnSpikes
        )
    }

    pub fn is_spikes(self) -> bool {
        matches!(self, TileType::SpikesInside | TileType::SpikesOutside)
    }
}

/// Final label of one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellLabel {
    /// A known tile type.
    Tile(TileType),
    /// Best-matching template id with no entry in the mapping table,
    /// emitted as its own number.
    Unmapped(u32),
    /// Nothing could be selected (empty template set).
    Unresolved,
}

impl CellLabel {
    /// Code emitted for this cell; `Unresolved` is `-1`.
    pub fn code(&self) -> i64 {
        match *self {
            CellLabel::Tile(t) => t.code() as i64,
            CellLabel::Unmapped(id) => id as i64,
            CellLabel::Unresolved => -1,
        }
    }

    #[inline]
    pub fn tile(&self) -> Option<TileType> {
        match *self {
            CellLabel::Tile(t) => Some(t),
            _ => None,
        }
    }
}

impl From<TileType> for CellLabel {
    fn from(t: TileType) -> Self {
        CellLabel::Tile(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_dense_and_round_trip() {
        for (i, t) in TileType::ALL.iter().enumerate() {
            assert_eq!(t.code(), i as i32);
            assert_eq!(TileType::from_code(i as i32), Some(*t));
        }
        assert_eq!(TileType::from_code(20), None);
        assert_eq!(TileType::from_code(-1), None);
    }

    #[test]
    fn label_codes() {
        assert_eq!(CellLabel::Tile(TileType::Wall).code(), 1);
        assert_eq!(CellLabel::Unmapped(41).code(), 41);
        assert_eq!(CellLabel::Unresolved.code(), -1);
    }

    #[test]
    fn families() {
        assert!(TileType::CharacterWithKey.is_character());
        assert!(TileType::StoneOnSpikes.is_stone());
        assert!(!TileType::SpikesInside.is_stone());
        assert!(TileType::SpikesOutside.is_spikes());
    }
}
