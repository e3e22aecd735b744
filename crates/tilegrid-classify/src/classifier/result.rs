use serde::{Deserialize, Serialize};
use tilegrid_core::{CellCoords, CellGeometry, GridSpec};
use tilegrid_templates::{CellLabel, ProfileKind};

use crate::occlusion::OcclusionMask;

/// How a cell's label was decided.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellSource {
    /// Row below `wall_rows`; nothing was extracted.
    ForcedWall,
    /// A color rule fired.
    Heuristic { rule: String },
    /// Nearest template under the given weight profile.
    Template {
        id: u32,
        distance: f64,
        profile: ProfileKind,
    },
    /// No rule fired and the template set was empty.
    Unresolved,
}

/// Final decision for one cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellOutcome {
    pub coords: CellCoords,
    pub label: CellLabel,
    pub source: CellSource,
    /// Whether the occluded weight profile applied to this cell.
    pub occluded: bool,
    /// First-pass label when a disambiguation rule changed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disambiguated_from: Option<CellLabel>,
}

/// `rows × cols` labels in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationMatrix {
    pub grid: GridSpec,
    pub labels: Vec<CellLabel>,
}

impl ClassificationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<CellLabel> {
        if row >= self.grid.rows || col >= self.grid.cols {
            return None;
        }
        self.labels.get(row * self.grid.cols + col).copied()
    }

    /// Iterate rows as label slices.
    pub fn rows(&self) -> impl Iterator<Item = &[CellLabel]> + '_ {
        self.labels.chunks(self.grid.cols.max(1))
    }

    /// Emitted integer codes, one `Vec` per row.
    pub fn codes(&self) -> Vec<Vec<i64>> {
        self.rows()
            .map(|row| row.iter().map(CellLabel::code).collect())
            .collect()
    }

    /// Number of cells left unresolved.
    pub fn unresolved_count(&self) -> usize {
        self.labels
            .iter()
            .filter(|l| matches!(l, CellLabel::Unresolved))
            .count()
    }
}

/// Output of a classification run.
#[derive(Clone, Debug)]
pub struct ClassificationResult {
    pub geometry: CellGeometry,
    pub matrix: ClassificationMatrix,
    /// Per-cell provenance, row-major.
    pub cells: Vec<CellOutcome>,
    pub occlusion: OcclusionMask,
    /// Loaded template ids with no entry in the mapping table.
    pub mapping_gaps: Vec<u32>,
}

impl ClassificationResult {
    pub fn cell(&self, at: CellCoords) -> Option<&CellOutcome> {
        if at.row >= self.matrix.grid.rows || at.col >= self.matrix.grid.cols {
            return None;
        }
        self.cells.get(at.row * self.matrix.grid.cols + at.col)
    }
}
