//! Sub-regions of a cell, expressed as fractions or pixel rectangles.

use serde::{Deserialize, Serialize};

use crate::image::{RgbImage, RgbImageView};

/// Rectangle in fractional cell coordinates, `0.0..=1.0` on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionFrac {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

/// Pixel rectangle `[x, x+width) × [y, y+height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl RegionFrac {
    /// The whole cell.
    pub const FULL: Self = Self {
        x0: 0.0,
        y0: 0.0,
        x1: 1.0,
        y1: 1.0,
    };

    /// The central 50% on both axes.
    pub const CENTRAL_HALF: Self = Self {
        x0: 0.25,
        y0: 0.25,
        x1: 0.75,
        y1: 0.75,
    };

    /// Resolve against a `width × height` cell. Edges are floored, so
    /// `CENTRAL_HALF` on a 30 px cell covers `[7, 22)`.
    pub fn to_rect(&self, width: usize, height: usize) -> PixelRect {
        let edge = |f: f32, n: usize| ((f.clamp(0.0, 1.0) * n as f32).floor() as usize).min(n);
        let x0 = edge(self.x0, width);
        let x1 = edge(self.x1, width);
        let y0 = edge(self.y0, height);
        let y1 = edge(self.y1, height);
        PixelRect {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }
}

impl PixelRect {
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Horizontally centered window of `width * width_frac`, anchored at the
    /// top and dropping `trim_bottom` pixel rows.
    pub fn top_centered(width: usize, height: usize, width_frac: f32, trim_bottom: usize) -> Self {
        let w = ((width as f32 * width_frac.clamp(0.0, 1.0)).round() as usize).min(width);
        Self {
            x: (width - w) / 2,
            y: 0,
            width: w,
            height: height.saturating_sub(trim_bottom),
        }
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// Intersect with a `width × height` buffer.
    pub fn clip(&self, width: usize, height: usize) -> Self {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Self {
            x,
            y,
            width: self.width.min(width - x),
            height: self.height.min(height - y),
        }
    }

    /// Copy the pixels inside this rectangle (clipped to the view).
    pub fn extract(&self, view: &RgbImageView<'_>) -> RgbImage {
        let r = self.clip(view.width, view.height);
        let mut data = Vec::with_capacity(r.area() * 3);
        for y in r.y..r.y + r.height {
            let start = (y * view.width + r.x) * 3;
            data.extend_from_slice(&view.data[start..start + r.width * 3]);
        }
        RgbImage {
            width: r.width,
            height: r.height,
            data,
        }
    }
}
