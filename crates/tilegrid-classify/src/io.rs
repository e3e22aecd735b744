//! JSON configuration and report helpers for tile-grid classification.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tilegrid_core::CellGeometry;
use tilegrid_templates::{ExcludedTemplate, TemplateLibrary};

use crate::classifier::{CellOutcome, ClassificationResult, ClassifierParams};
use crate::occlusion::OcclusionMask;

#[derive(thiserror::Error, Debug)]
pub enum ClassifyIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_template_count() -> u32 {
    35
}

/// Where template images come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateSource {
    /// `dir/tile{i}.png` for `i` in `0..count`; missing indices are skipped.
    Directory {
        dir: String,
        #[serde(default = "default_template_count")]
        count: u32,
    },
    /// Manifest of `file width height black brown white other` lines,
    /// file names relative to the manifest.
    Manifest { path: String },
}

impl Default for TemplateSource {
    fn default() -> Self {
        Self::Directory {
            dir: "tiles".to_string(),
            count: default_template_count(),
        }
    }
}

/// Configuration of one classification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyConfig {
    pub image_path: String,
    #[serde(default)]
    pub templates: TemplateSource,
    /// Matrix text output; stdout when absent.
    #[serde(default)]
    pub output_path: Option<String>,
    /// Append to `output_path` instead of overwriting it.
    #[serde(default)]
    pub append: bool,
    #[serde(default)]
    pub report_path: Option<String>,
    #[serde(default)]
    pub params: ClassifierParams,
}

impl ClassifyConfig {
    pub fn new(image_path: impl Into<String>, templates: TemplateSource) -> Self {
        Self {
            image_path: image_path.into(),
            templates,
            output_path: None,
            append: false,
            report_path: None,
            params: ClassifierParams::default(),
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ClassifyIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ClassifyIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.output_path.as_ref().map(PathBuf::from)
    }

    pub fn report_path(&self) -> Option<PathBuf> {
        self.report_path.as_ref().map(PathBuf::from)
    }
}

/// Everything a run decided, for offline inspection and calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyReport {
    pub image_path: String,
    pub image_width: usize,
    pub image_height: usize,
    pub geometry: CellGeometry,
    pub num_templates: usize,
    #[serde(default)]
    pub excluded_templates: Vec<ExcludedTemplate>,
    /// Emitted codes, one row per grid row.
    pub matrix: Vec<Vec<i64>>,
    pub cells: Vec<CellOutcome>,
    pub occlusion: OcclusionMask,
    #[serde(default)]
    pub mapping_gaps: Vec<u32>,
}

impl ClassifyReport {
    /// Build a report from a finished run.
    pub fn from_result(
        image_path: impl Into<String>,
        image_size: (usize, usize),
        library: &TemplateLibrary,
        result: &ClassificationResult,
    ) -> Self {
        Self {
            image_path: image_path.into(),
            image_width: image_size.0,
            image_height: image_size.1,
            geometry: result.geometry,
            num_templates: library.len(),
            excluded_templates: library.excluded().to_vec(),
            matrix: result.matrix.codes(),
            cells: result.cells.clone(),
            occlusion: result.occlusion.clone(),
            mapping_gaps: result.mapping_gaps.clone(),
        }
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ClassifyIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ClassifyIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
