//! Cells visually obstructed by the character sprite standing below them.

use serde::{Deserialize, Serialize};
use tilegrid_core::{CellCoords, CellGeometry, GridSpec, RgbImageView};

use crate::color_rules::ColorRuleTable;

/// `true` at `(row, col)` iff a character was detected at `(row + 1, col)`.
///
/// Built once per run, before the main pass, and read-only afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOcclusionMask")]
pub struct OcclusionMask {
    grid: GridSpec,
    flags: Vec<bool>,
    characters: Vec<CellCoords>,
}

#[derive(Deserialize)]
struct RawOcclusionMask {
    grid: GridSpec,
    flags: Vec<bool>,
    characters: Vec<CellCoords>,
}

impl TryFrom<RawOcclusionMask> for OcclusionMask {
    type Error = String;

    fn try_from(raw: RawOcclusionMask) -> Result<Self, Self::Error> {
        let expected = raw.grid.cell_count();
        if raw.flags.len() != expected {
            return Err(format!(
                "occlusion mask has {} flag(s), grid {}x{} needs {expected}",
                raw.flags.len(),
                raw.grid.rows,
                raw.grid.cols
            ));
        }
        Ok(Self {
            grid: raw.grid,
            flags: raw.flags,
            characters: raw.characters,
        })
    }
}

impl OcclusionMask {
    /// A mask with nothing occluded.
    pub fn clear(grid: GridSpec) -> Self {
        Self {
            grid,
            flags: vec![false; grid.cell_count()],
            characters: Vec::new(),
        }
    }

    /// Build from the cells where a character was detected.
    pub fn from_characters(grid: GridSpec, characters: Vec<CellCoords>) -> Self {
        let mut flags = vec![false; grid.cell_count()];
        for c in &characters {
            if c.row > 0 && c.row < grid.rows && c.col < grid.cols {
                flags[(c.row - 1) * grid.cols + c.col] = true;
            }
        }
        Self {
            grid,
            flags,
            characters,
        }
    }

    #[inline]
    pub fn is_occluded(&self, at: CellCoords) -> bool {
        at.row < self.grid.rows
            && at.col < self.grid.cols
            && self
                .flags
                .get(at.row * self.grid.cols + at.col)
                .copied()
                .unwrap_or(false)
    }

    /// Cells where a character was detected, row-major.
    pub fn characters(&self) -> &[CellCoords] {
        &self.characters
    }

    /// Occluded cells, row-major.
    pub fn occluded(&self) -> impl Iterator<Item = CellCoords> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, f)| **f)
            .map(|(i, _)| self.grid.coords(i))
    }
}

/// Run only the character rules over every cell and mark the cell above
/// each detection.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip_all, fields(rows = geometry.grid.rows, cols = geometry.grid.cols))
)]
pub fn build_occlusion_mask(
    image: &RgbImageView<'_>,
    geometry: &CellGeometry,
    rules: &ColorRuleTable,
) -> OcclusionMask {
    let grid = geometry.grid;
    let characters: Vec<CellCoords> = (0..grid.cell_count())
        .map(|i| grid.coords(i))
        .filter(|&at| {
            let cell = geometry.extract_cell(image, at);
            rules.detect_character(&cell.view()).is_some()
        })
        .collect();
    log::debug!("occlusion pass: {} character cell(s)", characters.len());
    OcclusionMask::from_characters(grid, characters)
}
