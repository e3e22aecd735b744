//! High-level facade crate for the `tilegrid-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying crates
//! - (feature-gated) loaders that decode the screenshot and template PNGs
//!   with the `image` crate and run the whole classification end to end.
//!
//! ## Quickstart
//!
//! ```no_run
//! use tilegrid::load;
//! use tilegrid::classify::{format_matrix, ClassifierParams, TemplateSource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let templates = TemplateSource::Directory { dir: "tiles".into(), count: 35 };
//! let run = load::classify_screenshot("level.png", &templates, ClassifierParams::default())?;
//! print!("{}", format_matrix(&run.result.matrix));
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `tilegrid::core`: RGB views, grid geometry, histograms, distance metrics.
//! - `tilegrid::templates`: tile codes, id → tile table, template library, matcher.
//! - `tilegrid::classify`: color rules, occlusion, disambiguation, the pipeline,
//!   matrix text format, JSON config/report.
//! - `tilegrid::load` (feature `image`): file loaders and `classify_screenshot`.

pub use tilegrid_classify as classify;
pub use tilegrid_core as core;
pub use tilegrid_templates as templates;

pub use tilegrid_classify::{
    ClassificationMatrix, ClassificationResult, ClassifierParams, TileClassifier,
};
pub use tilegrid_core::{CellCoords, GridSpec};
pub use tilegrid_templates::{CellLabel, TemplateLibrary, TileMapping, TileType};

#[cfg(feature = "image")]
pub mod load;
