//! Tile semantics and template matching for tile-grid screenshots.
//!
//! This crate focuses on:
//! - the closed set of tile type codes emitted per cell,
//! - the configurable template-id → tile type table,
//! - the template library (with its optional precomputed manifest),
//! - nearest-template search under a context-dependent weight profile.
//!
//! It does **not** decode image files. Callers hand in RGB buffers (for
//! example through the `tilegrid` facade's `image` feature).

mod library;
mod manifest;
mod mapping;
mod matcher;
mod tile;

pub use library::{ExcludedTemplate, ExclusionReason, LibraryError, TemplateLibrary, TileTemplate};
pub use manifest::{load_manifest, parse_manifest, ManifestEntry, ManifestError};
pub use mapping::TileMapping;
pub use matcher::{Match, MatcherParams, ProfileKind, TemplateMatcher, WeightProfile};
pub use tile::{CellLabel, TileType};
