//! Classification pipeline.
//!
//! This module wires together grid partitioning, the occlusion pre-pass,
//! the color-rule table, the occlusion-aware template matcher and the
//! disambiguation rules into one configurable run.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::ClassifyError;
pub use params::ClassifierParams;
pub use pipeline::TileClassifier;
pub use result::{CellOutcome, CellSource, ClassificationMatrix, ClassificationResult};
