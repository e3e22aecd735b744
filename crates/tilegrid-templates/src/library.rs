//! Reference tile images with their precomputed coarse histograms.

use serde::{Deserialize, Serialize};
use tilegrid_core::{coarse_histogram, CoarseHistogram, CoarseThresholds, RgbImage};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("template id {0} registered twice")]
    DuplicateId(u32),
    #[error("template {id} pixel buffer has {got} bytes, expected {expected}")]
    BadBuffer { id: u32, expected: usize, got: usize },
}

/// One reference tile.
#[derive(Clone, Debug)]
pub struct TileTemplate {
    /// Stable id; the key into the tile mapping table.
    pub id: u32,
    /// Source name (file name) for diagnostics.
    pub name: String,
    pub image: RgbImage,
    pub coarse: CoarseHistogram,
}

/// Why a template is not part of the candidate set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// File missing or not decodable.
    Unreadable { message: String },
    /// Template size differs from the computed cell size.
    SizeMismatch {
        width: usize,
        height: usize,
        cell_w: usize,
        cell_h: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedTemplate {
    pub id: u32,
    pub name: String,
    pub reason: ExclusionReason,
}

/// Ordered set of templates usable for pixel-aligned comparison.
///
/// Only templates exactly `cell_w × cell_h` are accepted; everything else
/// is recorded in [`TemplateLibrary::excluded`] and otherwise ignored.
/// Templates are kept sorted by id, which is the matcher's tie-break order.
#[derive(Clone, Debug)]
pub struct TemplateLibrary {
    cell_w: usize,
    cell_h: usize,
    thresholds: CoarseThresholds,
    templates: Vec<TileTemplate>,
    excluded: Vec<ExcludedTemplate>,
}

impl TemplateLibrary {
    pub fn new(cell_w: usize, cell_h: usize) -> Self {
        Self::with_thresholds(cell_w, cell_h, CoarseThresholds::default())
    }

    pub fn with_thresholds(cell_w: usize, cell_h: usize, thresholds: CoarseThresholds) -> Self {
        Self {
            cell_w,
            cell_h,
            thresholds,
            templates: Vec::new(),
            excluded: Vec::new(),
        }
    }

    /// Add a template, computing its coarse histogram unless `coarse` is
    /// supplied (e.g. from a manifest).
    ///
    /// Returns `Ok(false)` when the template was excluded for its size.
    pub fn insert(
        &mut self,
        id: u32,
        name: impl Into<String>,
        image: RgbImage,
        coarse: Option<CoarseHistogram>,
    ) -> Result<bool, LibraryError> {
        let name = name.into();
        let expected = image.width * image.height * 3;
        if image.data.len() != expected {
            return Err(LibraryError::BadBuffer {
                id,
                expected,
                got: image.data.len(),
            });
        }
        if self.contains(id) {
            return Err(LibraryError::DuplicateId(id));
        }
        if image.width != self.cell_w || image.height != self.cell_h {
            self.exclude(
                id,
                name,
                ExclusionReason::SizeMismatch {
                    width: image.width,
                    height: image.height,
                    cell_w: self.cell_w,
                    cell_h: self.cell_h,
                },
            );
            return Ok(false);
        }

        let coarse = coarse.unwrap_or_else(|| coarse_histogram(&image.view(), &self.thresholds));
        let at = self.templates.partition_point(|t| t.id < id);
        self.templates.insert(
            at,
            TileTemplate {
                id,
                name,
                image,
                coarse,
            },
        );
        Ok(true)
    }

    /// Record a template that could not be used.
    pub fn exclude(&mut self, id: u32, name: impl Into<String>, reason: ExclusionReason) {
        let name = name.into();
        log::warn!("template {id} ({name}) excluded: {reason:?}");
        self.excluded.push(ExcludedTemplate { id, name, reason });
    }

    #[inline]
    pub fn cell_size(&self) -> (usize, usize) {
        (self.cell_w, self.cell_h)
    }

    #[inline]
    pub fn thresholds(&self) -> &CoarseThresholds {
        &self.thresholds
    }

    pub fn contains(&self, id: u32) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.templates.binary_search_by_key(&id, |t| t.id).ok()
    }

    pub fn get(&self, id: u32) -> Option<&TileTemplate> {
        self.index_of(id).map(|i| &self.templates[i])
    }

    pub fn templates(&self) -> &[TileTemplate] {
        &self.templates
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.templates.iter().map(|t| t.id)
    }

    pub fn excluded(&self) -> &[ExcludedTemplate] {
        &self.excluded
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_templates_sorted_by_id() {
        let mut lib = TemplateLibrary::new(4, 4);
        for id in [7u32, 2, 5] {
            let ok = lib
                .insert(id, format!("tile{id}.png"), RgbImage::filled(4, 4, [0, 0, 0]), None)
                .unwrap();
            assert!(ok);
        }
        assert_eq!(lib.ids().collect::<Vec<_>>(), vec![2, 5, 7]);
        assert_eq!(lib.get(5).map(|t| t.name.as_str()), Some("tile5.png"));
        assert_eq!(lib.get(5).unwrap().coarse.black, 16);
    }

    #[test]
    fn size_mismatch_is_excluded_not_fatal() {
        let mut lib = TemplateLibrary::new(4, 4);
        let ok = lib
            .insert(3, "tile3.png", RgbImage::filled(5, 4, [0, 0, 0]), None)
            .unwrap();
        assert!(!ok);
        assert!(lib.is_empty());
        assert_eq!(lib.excluded().len(), 1);
        assert!(matches!(
            lib.excluded()[0].reason,
            ExclusionReason::SizeMismatch { width: 5, .. }
        ));
    }

    #[test]
    fn duplicate_id_is_an_error() {
        let mut lib = TemplateLibrary::new(2, 2);
        lib.insert(1, "a", RgbImage::filled(2, 2, [0, 0, 0]), None)
            .unwrap();
        let err = lib
            .insert(1, "b", RgbImage::filled(2, 2, [0, 0, 0]), None)
            .unwrap_err();
        assert_eq!(err, LibraryError::DuplicateId(1));
    }

    #[test]
    fn precomputed_histogram_is_kept() {
        let mut lib = TemplateLibrary::new(2, 2);
        let pre = CoarseHistogram {
            black: 0,
            brown: 4,
            white: 0,
            other: 0,
        };
        lib.insert(0, "a", RgbImage::filled(2, 2, [0, 0, 0]), Some(pre))
            .unwrap();
        assert_eq!(lib.get(0).unwrap().coarse, pre);
    }
}
