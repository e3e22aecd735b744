//! Precomputed template manifest.
//!
//! One line per template:
//!
//! ```text
//! filename width height coarse_black coarse_brown coarse_white coarse_other
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Pixel data is
//! loaded separately by file name.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tilegrid_core::CoarseHistogram;

#[derive(thiserror::Error, Debug)]
pub enum ManifestError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("manifest line {line}: expected 7 fields, found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("manifest line {line}: invalid number {value:?}")]
    BadNumber { line: usize, value: String },
}

/// One manifest record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub file: String,
    /// Template id: trailing digits of the file stem (`tile12.png` → 12),
    /// or the record's position when the name carries none.
    pub id: u32,
    pub width: usize,
    pub height: usize,
    pub coarse: CoarseHistogram,
}

/// Parse manifest text.
pub fn parse_manifest(text: &str) -> Result<Vec<ManifestEntry>, ManifestError> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() != 7 {
            return Err(ManifestError::FieldCount {
                line,
                found: fields.len(),
            });
        }
        let num = |s: &str| {
            s.parse::<u32>().map_err(|_| ManifestError::BadNumber {
                line,
                value: s.to_string(),
            })
        };
        let file = fields[0].to_string();
        let id = id_from_file_name(&file).unwrap_or(out.len() as u32);
        out.push(ManifestEntry {
            id,
            width: num(fields[1])? as usize,
            height: num(fields[2])? as usize,
            coarse: CoarseHistogram {
                black: num(fields[3])?,
                brown: num(fields[4])?,
                white: num(fields[5])?,
                other: num(fields[6])?,
            },
            file,
        });
    }
    Ok(out)
}

/// Read and parse a manifest file.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<ManifestEntry>, ManifestError> {
    let raw = fs::read_to_string(path)?;
    parse_manifest(&raw)
}

fn id_from_file_name(file: &str) -> Option<u32> {
    let stem = Path::new(file).file_stem()?.to_str()?;
    let digits_at = stem
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()?
        .0;
    stem[digits_at..].parse().ok()
}
