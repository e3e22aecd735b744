//! Nearest-template search with context-dependent weight profiles.

use serde::{Deserialize, Serialize};
use tilegrid_core::{
    chi_square, coarse_histogram, fine_histogram, mae, mae_in_rect, CoarseHistogram,
    FineHistogram, PixelRect, RegionFrac, RgbImageView, MAX_DISTANCE,
};

use crate::library::TemplateLibrary;

/// Weights of the individual distance terms, plus the region of interest
/// used by the region-restricted terms.
///
/// `distance = w_hist_fine · χ²(fine(cell∩roi), fine(tpl∩roi))
///           + w_mae_full · MAE(cell, tpl)
///           + w_mae_region · MAE(cell∩roi, tpl∩roi)
///           + w_hist_coarse · L1(coarse(cell), coarse(tpl))`
///
/// Terms with a zero weight are not computed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightProfile {
    pub region: RegionFrac,
    pub w_hist_fine: f64,
    pub w_mae_full: f64,
    pub w_mae_region: f64,
    pub w_hist_coarse: f64,
}

impl WeightProfile {
    /// Histogram-only comparison over the central half of the cell.
    pub fn histogram_default() -> Self {
        Self {
            region: RegionFrac::CENTRAL_HALF,
            w_hist_fine: 1.0,
            w_mae_full: 0.0,
            w_mae_region: 0.0,
            w_hist_coarse: 0.0,
        }
    }

    /// Profile for cells whose lower part is covered by the character
    /// sprite standing below: whole-cell MAE dominates, the region term
    /// looks at the upper-central part.
    pub fn occluded_default() -> Self {
        Self {
            region: RegionFrac {
                x0: 0.25,
                y0: 0.1,
                x1: 0.75,
                y1: 0.5,
            },
            w_hist_fine: 0.0,
            w_mae_full: 2.0,
            w_mae_region: 1.0,
            w_hist_coarse: 0.079,
        }
    }
}

/// Which weight profile to apply to a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Default,
    Occluded,
}

/// Matcher configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatcherParams {
    /// Bins per channel of the fine histogram.
    pub bins: usize,
    /// Rescale fine histograms to this total; `None` keeps raw counts.
    pub normalize_to: Option<f64>,
    pub default_profile: WeightProfile,
    pub occluded_profile: WeightProfile,
}

impl Default for MatcherParams {
    fn default() -> Self {
        Self {
            bins: 4,
            normalize_to: Some(1000.0),
            default_profile: WeightProfile::histogram_default(),
            occluded_profile: WeightProfile::occluded_default(),
        }
    }
}

impl MatcherParams {
    pub fn profile(&self, kind: ProfileKind) -> &WeightProfile {
        match kind {
            ProfileKind::Default => &self.default_profile,
            ProfileKind::Occluded => &self.occluded_profile,
        }
    }
}

/// Winning template of a search.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: u32,
    pub distance: f64,
}

/// Per-template fine histograms, one per profile region.
#[derive(Clone, Debug)]
struct TemplateFeatures {
    fine_default: Option<FineHistogram>,
    fine_occluded: Option<FineHistogram>,
}

/// Per-cell features for one profile.
struct CellProbe {
    rect: PixelRect,
    fine: Option<FineHistogram>,
    coarse: Option<CoarseHistogram>,
}

/// Brute-force nearest-template matcher over a [`TemplateLibrary`].
///
/// The library is small (tens of templates), so every candidate is scored.
/// Ties on distance keep the lowest template id.
#[derive(Clone, Debug)]
pub struct TemplateMatcher<'a> {
    library: &'a TemplateLibrary,
    params: MatcherParams,
    features: Vec<TemplateFeatures>,
}

impl<'a> TemplateMatcher<'a> {
    /// Precompute the template-side fine histograms for both profiles.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip_all, fields(templates = library.len()))
    )]
    pub fn new(library: &'a TemplateLibrary, params: MatcherParams) -> Self {
        let (cell_w, cell_h) = library.cell_size();
        let fine_for = |profile: &WeightProfile, view: &RgbImageView<'_>| {
            (profile.w_hist_fine != 0.0).then(|| {
                let rect = profile.region.to_rect(cell_w, cell_h);
                fine_histogram(&rect.extract(view).view(), params.bins, params.normalize_to)
            })
        };
        let features = library
            .templates()
            .iter()
            .map(|t| {
                let view = t.image.view();
                TemplateFeatures {
                    fine_default: fine_for(&params.default_profile, &view),
                    fine_occluded: fine_for(&params.occluded_profile, &view),
                }
            })
            .collect();

        Self {
            library,
            params,
            features,
        }
    }

    #[inline]
    pub fn library(&self) -> &'a TemplateLibrary {
        self.library
    }

    #[inline]
    pub fn params(&self) -> &MatcherParams {
        &self.params
    }

    /// Best template over the whole library; `None` when it is empty.
    pub fn best_match(&self, cell: &RgbImageView<'_>, kind: ProfileKind) -> Option<Match> {
        let probe = self.probe(cell, kind);
        self.search(cell, kind, &probe, 0..self.features.len())
    }

    /// Best template restricted to `ids`; unknown ids are skipped.
    pub fn best_match_among(
        &self,
        cell: &RgbImageView<'_>,
        kind: ProfileKind,
        ids: &[u32],
    ) -> Option<Match> {
        let mut idx: Vec<usize> = ids
            .iter()
            .filter_map(|&id| self.library.index_of(id))
            .collect();
        idx.sort_unstable();
        idx.dedup();
        let probe = self.probe(cell, kind);
        self.search(cell, kind, &probe, idx)
    }

    /// Nearest template among `ids` by fine-histogram chi-square alone,
    /// over the default profile's region and independent of its weights.
    pub fn histogram_match_among(&self, cell: &RgbImageView<'_>, ids: &[u32]) -> Option<Match> {
        let region = self.params.default_profile.region;
        let hist = |view: &RgbImageView<'_>| {
            let rect = region.to_rect(view.width, view.height);
            fine_histogram(
                &rect.extract(view).view(),
                self.params.bins,
                self.params.normalize_to,
            )
        };
        let cell_fine = hist(cell);

        let mut idx: Vec<usize> = ids
            .iter()
            .filter_map(|&id| self.library.index_of(id))
            .collect();
        idx.sort_unstable();
        idx.dedup();

        let templates = self.library.templates();
        let mut best: Option<Match> = None;
        for i in idx {
            let d = match &self.features[i].fine_default {
                Some(cached) => chi_square(&cell_fine, cached),
                None => chi_square(&cell_fine, &hist(&templates[i].image.view())),
            };
            if best.map_or(true, |b| d < b.distance) {
                best = Some(Match {
                    id: templates[i].id,
                    distance: d,
                });
            }
        }
        best
    }

    /// Weighted distance between `cell` and template `id`.
    pub fn distance(&self, cell: &RgbImageView<'_>, kind: ProfileKind, id: u32) -> Option<f64> {
        let idx = self.library.index_of(id)?;
        let probe = self.probe(cell, kind);
        Some(self.score(cell, kind, &probe, idx))
    }

    fn search(
        &self,
        cell: &RgbImageView<'_>,
        kind: ProfileKind,
        probe: &CellProbe,
        candidates: impl IntoIterator<Item = usize>,
    ) -> Option<Match> {
        let templates = self.library.templates();
        let mut best: Option<Match> = None;
        // Candidates arrive in ascending id order; strict `<` keeps the
        // lowest id on exact ties.
        for idx in candidates {
            let d = self.score(cell, kind, probe, idx);
            let better = match best {
                None => true,
                Some(b) => d < b.distance || (b.distance.is_nan() && !d.is_nan()),
            };
            if better {
                best = Some(Match {
                    id: templates[idx].id,
                    distance: d,
                });
            }
        }
        best
    }

    fn probe(&self, cell: &RgbImageView<'_>, kind: ProfileKind) -> CellProbe {
        let profile = self.params.profile(kind);
        let rect = profile.region.to_rect(cell.width, cell.height);
        let fine = (profile.w_hist_fine != 0.0).then(|| {
            fine_histogram(
                &rect.extract(cell).view(),
                self.params.bins,
                self.params.normalize_to,
            )
        });
        let coarse = (profile.w_hist_coarse != 0.0)
            .then(|| coarse_histogram(cell, self.library.thresholds()));
        CellProbe { rect, fine, coarse }
    }

    fn score(
        &self,
        cell: &RgbImageView<'_>,
        kind: ProfileKind,
        probe: &CellProbe,
        idx: usize,
    ) -> f64 {
        let profile = self.params.profile(kind);
        let template = &self.library.templates()[idx];
        let tview = template.image.view();
        let mut terms = [0.0f64; 4];

        if let Some(cell_fine) = &probe.fine {
            let tpl_fine = match kind {
                ProfileKind::Default => &self.features[idx].fine_default,
                ProfileKind::Occluded => &self.features[idx].fine_occluded,
            };
            if let Some(tpl_fine) = tpl_fine {
                terms[0] = chi_square(cell_fine, tpl_fine);
            }
        }
        if profile.w_mae_full != 0.0 {
            terms[1] = mae(cell, &tview);
        }
        if profile.w_mae_region != 0.0 {
            terms[2] = mae_in_rect(cell, &tview, &probe.rect);
        }
        if let Some(coarse) = &probe.coarse {
            terms[3] = coarse.l1_distance(&template.coarse);
        }

        // A sentinel term poisons the whole score regardless of its weight.
        if terms.contains(&MAX_DISTANCE) {
            return MAX_DISTANCE;
        }
        profile.w_hist_fine * terms[0]
            + profile.w_mae_full * terms[1]
            + profile.w_mae_region * terms[2]
            + profile.w_hist_coarse * terms[3]
    }
}
