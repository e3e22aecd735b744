//! Template id → tile type table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tile::{CellLabel, TileType};

/// Explicit, immutable mapping from template ids to tile types.
///
/// Ids without an entry pass through as [`CellLabel::Unmapped`]; use
/// [`TileMapping::gaps`] to report them once per run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileMapping {
    entries: BTreeMap<u32, TileType>,
}

impl Default for TileMapping {
    fn default() -> Self {
        use TileType::*;
        let mut entries = BTreeMap::new();
        let mut put = |ids: &[u32], t: TileType| {
            for &id in ids {
                entries.insert(id, t);
            }
        };
        put(&[3, 4, 11, 12, 13, 14, 15, 16], Wall);
        put(&[7], Floor);
        put(&[0], Diamond);
        put(&[2], Key);
        put(&[5], Character);
        put(&[8], Door);
        put(&[6], Stone);
        put(&[9, 17, 25], SpikesInside);
        put(&[10], Exit);
        put(&[1], Hole);
        put(&[18, 19, 20, 21, 22, 23, 24], Lava);
        put(&[26], Gate);
        put(&[27], Button);
        put(&[28], Statue);
        put(&[29], CharacterOnButton);
        put(&[30], CharacterWithKey);
        put(&[31], StoneInHole);
        put(&[32], StoneOnButton);
        put(&[33], StoneOnSpikes);
        put(&[34], SpikesOutside);
        Self { entries }
    }
}

impl TileMapping {
    /// An empty table: every id passes through.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, TileType)>) -> Self {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, id: u32, tile: TileType) -> Option<TileType> {
        self.entries.insert(id, tile)
    }

    #[inline]
    pub fn get(&self, id: u32) -> Option<TileType> {
        self.entries.get(&id).copied()
    }

    /// Label for a best-match id.
    #[inline]
    pub fn label(&self, id: u32) -> CellLabel {
        match self.get(id) {
            Some(t) => CellLabel::Tile(t),
            None => CellLabel::Unmapped(id),
        }
    }

    /// Ids from `ids` that have no entry.
    pub fn gaps(&self, ids: impl IntoIterator<Item = u32>) -> Vec<u32> {
        ids.into_iter()
            .filter(|id| !self.entries.contains_key(id))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, TileType)> + '_ {
        self.entries.iter().map(|(&id, &t)| (id, t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_legacy_ids() {
        let m = TileMapping::default();
        assert_eq!(m.get(0), Some(TileType::Diamond));
        assert_eq!(m.get(7), Some(TileType::Floor));
        assert_eq!(m.get(16), Some(TileType::Wall));
        assert_eq!(m.get(25), Some(TileType::SpikesInside));
        assert_eq!(m.get(28), Some(TileType::Statue));
        assert!(m.gaps(0..=34).is_empty());
    }

    #[test]
    fn missing_id_passes_through() {
        let m = TileMapping::default();
        assert_eq!(m.label(40), CellLabel::Unmapped(40));
        assert_eq!(m.gaps([1, 40, 44]), vec![40, 44]);
    }

    #[test]
    fn json_round_trip_uses_string_keys() {
        let m = TileMapping::from_pairs([(3, TileType::Wall), (12, TileType::Lava)]);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"3":"wall","12":"lava"}"#);
        let back: TileMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
