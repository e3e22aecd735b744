use serde::{Deserialize, Serialize};
use tilegrid_core::GridSpec;
use tilegrid_templates::{MatcherParams, TileMapping};

use crate::color_rules::ColorRuleTable;
use crate::disambiguation::DisambiguationParams;

fn default_wall_rows() -> usize {
    2
}

fn default_parallel() -> bool {
    true
}

/// Configuration for [`TileClassifier`](super::TileClassifier).
///
/// Every stage is data: the rule table, both weight profiles, the
/// disambiguation rules and the id → tile table can be replaced from JSON
/// without touching the pipeline. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifierParams {
    /// Grid dimensions; serialized as top-level `rows` / `cols`.
    #[serde(flatten)]
    pub grid: GridSpec,
    /// Leading rows forced to wall before any extraction (UI chrome).
    #[serde(default = "default_wall_rows")]
    pub wall_rows: usize,
    /// Ordered heuristic color rules.
    #[serde(default)]
    pub rules: ColorRuleTable,
    #[serde(default)]
    pub matcher: MatcherParams,
    #[serde(default)]
    pub disambiguation: DisambiguationParams,
    /// Template id → tile type table.
    #[serde(default)]
    pub mapping: TileMapping,
    /// Run the main pass on the rayon pool. The sequential path yields the
    /// same matrix.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            wall_rows: default_wall_rows(),
            rules: ColorRuleTable::default(),
            matcher: MatcherParams::default(),
            disambiguation: DisambiguationParams::default(),
            mapping: TileMapping::default(),
            parallel: default_parallel(),
        }
    }
}

impl ClassifierParams {
    /// Defaults for a grid of the given size.
    pub fn for_grid(grid: GridSpec) -> Self {
        Self {
            grid,
            ..Self::default()
        }
    }
}
