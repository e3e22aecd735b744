//! Fixed grid partitioning of a screenshot into cells.
//!
//! Cell size is `round(image_dim / grid_dim)`, so the grid may not tile the
//! image exactly: trailing pixels are ignored, and when rounding overshoots
//! the image the last row/column reads are clamped to the border (edge
//! replication). Both effects are accepted noise at the grid edges.

use serde::{Deserialize, Serialize};

use crate::image::{RgbImage, RgbImageView};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid must have at least one row and one column (rows={rows}, cols={cols})")]
    EmptyGrid { rows: usize, cols: usize },
    #[error("image {width}x{height} is too small for a {rows}x{cols} grid")]
    ImageTooSmall {
        width: usize,
        height: usize,
        rows: usize,
        cols: usize,
    },
}

/// Grid dimensions, fixed per game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
}

/// Cell coordinates `(row, col)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoords {
    pub row: usize,
    pub col: usize,
}

/// Derived cell geometry for one image size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellGeometry {
    pub grid: GridSpec,
    pub cell_w: usize,
    pub cell_h: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self { rows: 15, cols: 10 }
    }
}

impl GridSpec {
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyGrid { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Row-major flat index back to coordinates.
    #[inline]
    pub fn coords(&self, index: usize) -> CellCoords {
        CellCoords {
            row: index / self.cols,
            col: index % self.cols,
        }
    }

    /// Derive `cell_w = round(width / cols)` and `cell_h = round(height / rows)`.
    pub fn geometry(&self, width: usize, height: usize) -> Result<CellGeometry, GridError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GridError::EmptyGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let cell_w = (width as f64 / self.cols as f64).round() as usize;
        let cell_h = (height as f64 / self.rows as f64).round() as usize;
        if cell_w == 0 || cell_h == 0 {
            return Err(GridError::ImageTooSmall {
                width,
                height,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(CellGeometry {
            grid: *self,
            cell_w,
            cell_h,
        })
    }
}

impl CellGeometry {
    /// Copy the pixels of cell `at` into an independently owned buffer.
    ///
    /// The result is always `cell_w × cell_h`; reads past the image border
    /// repeat the last valid row/column.
    pub fn extract_cell(&self, image: &RgbImageView<'_>, at: CellCoords) -> RgbImage {
        let mut data = Vec::with_capacity(self.cell_w * self.cell_h * 3);
        if image.is_empty() {
            data.resize(self.cell_w * self.cell_h * 3, 0);
        } else {
            let x0 = at.col * self.cell_w;
            let y0 = at.row * self.cell_h;
            for y in 0..self.cell_h {
                for x in 0..self.cell_w {
                    data.extend_from_slice(&image.pixel_clamped(x0 + x, y0 + y));
                }
            }
        }
        RgbImage {
            width: self.cell_w,
            height: self.cell_h,
            data,
        }
    }

    /// Whether the cell rectangle at `at` lies fully inside the image.
    pub fn is_fully_inside(&self, width: usize, height: usize, at: CellCoords) -> bool {
        (at.col + 1) * self.cell_w <= width && (at.row + 1) * self.cell_h <= height
    }
}
