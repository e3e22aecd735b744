//! Core types and utilities for tile-grid screenshot classification.
//!
//! This crate is intentionally small and purely numeric. It does *not*
//! decode image files and knows nothing about tile semantics: it provides
//! an RGB buffer view, grid partitioning, per-cell feature extraction and
//! the distance metrics the template matcher is built from.

mod features;
mod grid;
mod image;
mod logger;
mod metrics;
mod region;

pub use features::{
    coarse_histogram, fine_histogram, ChannelRange, CoarseHistogram, CoarseThresholds,
    FineHistogram,
};
pub use grid::{CellCoords, CellGeometry, GridError, GridSpec};
pub use image::{Rgb, RgbImage, RgbImageView};
pub use metrics::{chi_square, mae, mae_in_rect, CHI_SQUARE_EPS, MAX_DISTANCE};
pub use region::{PixelRect, RegionFrac};

#[cfg(feature = "tracing")]
pub use logger::{init_tracing, tracing_directive, TracingFormat};

pub use logger::{init_with_level, verbosity_level, OWN_TARGET_PREFIX};
