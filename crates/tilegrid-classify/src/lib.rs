//! Screenshot → tile-grid classification.
//!
//! The pipeline, per run:
//! - partition the screenshot into a fixed `rows × cols` grid,
//! - build the occlusion mask (cells directly above a character),
//! - per cell: try the ordered color-rule table, fall back to the
//!   occlusion-aware template matcher, then re-resolve ambiguous stone,
//!   character and spike outcomes,
//! - emit the matrix as plain text for the downstream solver.
//!
//! Template handling and tile codes live in `tilegrid-templates`; pixel
//! primitives in `tilegrid-core`.

mod classifier;
mod color_rules;
mod disambiguation;
mod emit;
mod io;
mod occlusion;

pub use classifier::{
    CellOutcome, CellSource, ClassificationMatrix, ClassificationResult, ClassifierParams,
    ClassifyError, TileClassifier,
};
pub use color_rules::{colors_present, palette, ColorRule, ColorRuleTable, ColorSpec};
pub use disambiguation::{
    resolve_stone, CharacterReference, DisambiguationParams, Disambiguator, SpikeReference,
    StoneProbe,
};
pub use emit::{format_matrix, parse_matrices, write_matrix, write_matrix_file};
pub use io::{ClassifyConfig, ClassifyIoError, ClassifyReport, TemplateSource};
pub use occlusion::{build_occlusion_mask, OcclusionMask};

pub use tilegrid_core::{CellCoords, CellGeometry, GridSpec};
pub use tilegrid_templates::{CellLabel, TileType};
