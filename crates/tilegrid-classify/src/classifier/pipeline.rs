use rayon::prelude::*;
use tilegrid_core::{CellCoords, CellGeometry, RgbImageView};
use tilegrid_templates::{CellLabel, ProfileKind, TemplateLibrary, TemplateMatcher, TileType};

use super::{
    CellOutcome, CellSource, ClassificationMatrix, ClassificationResult, ClassifierParams,
    ClassifyError,
};
use crate::disambiguation::Disambiguator;
use crate::occlusion::{build_occlusion_mask, OcclusionMask};

/// Screenshot → tile grid classifier over a fixed template library.
///
/// The library and the matcher's template-side features are shared,
/// read-only state; a classifier can be reused across screenshots of the
/// same resolution.
pub struct TileClassifier<'a> {
    params: ClassifierParams,
    matcher: TemplateMatcher<'a>,
    mapping_gaps: Vec<u32>,
}

impl<'a> TileClassifier<'a> {
    /// Create a classifier for a library and parameters.
    ///
    /// Loaded template ids missing from the mapping table are logged once
    /// here and reported with every result.
    pub fn new(library: &'a TemplateLibrary, params: ClassifierParams) -> Self {
        let mapping_gaps = params.mapping.gaps(library.ids());
        if !mapping_gaps.is_empty() {
            log::warn!(
                "template ids {:?} have no tile mapping; they are emitted as their own value",
                mapping_gaps
            );
        }
        let matcher = TemplateMatcher::new(library, params.matcher.clone());
        Self {
            params,
            matcher,
            mapping_gaps,
        }
    }

    #[inline]
    pub fn params(&self) -> &ClassifierParams {
        &self.params
    }

    #[inline]
    pub fn library(&self) -> &'a TemplateLibrary {
        self.matcher.library()
    }

    /// Classify a raw row-major RGB buffer.
    pub fn classify_rgb(
        &self,
        width: usize,
        height: usize,
        data: &[u8],
    ) -> Result<ClassificationResult, ClassifyError> {
        let image = RgbImageView::from_raw(width, height, data).ok_or(
            ClassifyError::InvalidImageBuffer {
                expected: width * height * 3,
                got: data.len(),
            },
        )?;
        self.classify(&image)
    }

    /// Classify every cell of `image`.
    ///
    /// The occlusion pass over the whole grid completes before any cell is
    /// matched. Cells are then independent and run on the rayon pool
    /// unless `params.parallel` is off; both paths give the same result.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "info",
            skip(self, image),
            fields(width = image.width, height = image.height, templates = self.library().len())
        )
    )]
    pub fn classify(&self, image: &RgbImageView<'_>) -> Result<ClassificationResult, ClassifyError> {
        let geometry = self.params.grid.geometry(image.width, image.height)?;
        let (library_w, library_h) = self.library().cell_size();
        if (library_w, library_h) != (geometry.cell_w, geometry.cell_h) {
            return Err(ClassifyError::CellSizeMismatch {
                library_w,
                library_h,
                cell_w: geometry.cell_w,
                cell_h: geometry.cell_h,
            });
        }
        log::debug!(
            "grid {}x{} on {}x{} image, cells {}x{}, {} template(s)",
            geometry.grid.rows,
            geometry.grid.cols,
            image.width,
            image.height,
            geometry.cell_w,
            geometry.cell_h,
            self.library().len()
        );

        let occlusion = build_occlusion_mask(image, &geometry, &self.params.rules);

        let count = geometry.grid.cell_count();
        let classify_at =
            |i: usize| self.classify_cell(image, &geometry, &occlusion, geometry.grid.coords(i));
        let cells: Vec<CellOutcome> = if self.params.parallel {
            (0..count).into_par_iter().map(classify_at).collect()
        } else {
            (0..count).map(classify_at).collect()
        };

        let matrix = ClassificationMatrix {
            grid: geometry.grid,
            labels: cells.iter().map(|c| c.label).collect(),
        };
        let unresolved = matrix.unresolved_count();
        if unresolved > 0 {
            log::warn!("{unresolved} cell(s) unresolved: no rule fired and no template matched");
        }
        log::debug!(
            "classified {} cells, {} disambiguated",
            cells.len(),
            cells.iter().filter(|c| c.disambiguated_from.is_some()).count()
        );

        Ok(ClassificationResult {
            geometry,
            matrix,
            cells,
            occlusion,
            mapping_gaps: self.mapping_gaps.clone(),
        })
    }

    /// Decide one cell against a finished occlusion mask.
    pub fn classify_cell(
        &self,
        image: &RgbImageView<'_>,
        geometry: &CellGeometry,
        occlusion: &OcclusionMask,
        at: CellCoords,
    ) -> CellOutcome {
        let occluded = occlusion.is_occluded(at);
        if at.row < self.params.wall_rows {
            return CellOutcome {
                coords: at,
                label: TileType::Wall.into(),
                source: CellSource::ForcedWall,
                occluded,
                disambiguated_from: None,
            };
        }

        let cell = geometry.extract_cell(image, at);
        let view = cell.view();

        if let Some(rule) = self.params.rules.classify(&view) {
            return CellOutcome {
                coords: at,
                label: rule.tile.into(),
                source: CellSource::Heuristic {
                    rule: rule.name.clone(),
                },
                occluded,
                disambiguated_from: None,
            };
        }

        let profile = if occluded {
            ProfileKind::Occluded
        } else {
            ProfileKind::Default
        };
        let Some(best) = self.matcher.best_match(&view, profile) else {
            return CellOutcome {
                coords: at,
                label: CellLabel::Unresolved,
                source: CellSource::Unresolved,
                occluded,
                disambiguated_from: None,
            };
        };

        let first = self.params.mapping.label(best.id);
        let disambiguator = Disambiguator::new(
            &self.params.disambiguation,
            &self.matcher,
            &self.params.mapping,
        );
        let (label, disambiguated_from) = match disambiguator.resolve(first, &view) {
            Some(resolved) => (resolved, Some(first)),
            None => (first, None),
        };

        CellOutcome {
            coords: at,
            label,
            source: CellSource::Template {
                id: best.id,
                distance: best.distance,
                profile,
            },
            occluded,
            disambiguated_from,
        }
    }
}
