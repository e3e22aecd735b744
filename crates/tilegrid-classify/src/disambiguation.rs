//! Second-stage resolution of outcome classes a single distance search
//! cannot separate: stone variants, plain vs. on-button character, and
//! inside vs. outside spikes.

use serde::{Deserialize, Serialize};
use tilegrid_core::{coarse_histogram, PixelRect, RgbImageView};
use tilegrid_templates::{CellLabel, TemplateMatcher, TileMapping, TileType};

use crate::color_rules::{colors_present, palette, ColorSpec};

/// Stone variants are told apart by two marker colors inside a narrow
/// top-centered window (`width * width_frac`, `height - trim_bottom_px`).
///
/// Both markers → on button; black only → on spikes; otherwise plain.
/// In-hole stones are not distinguished here.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoneProbe {
    pub width_frac: f32,
    pub trim_bottom_px: usize,
    pub black_marker: ColorSpec,
    pub brown_marker: ColorSpec,
}

impl Default for StoneProbe {
    fn default() -> Self {
        Self {
            width_frac: 0.8,
            trim_bottom_px: 15,
            black_marker: ColorSpec::exact(palette::STONE_BLACK_MARKER),
            brown_marker: ColorSpec::exact(palette::STONE_BROWN_MARKER),
        }
    }
}

/// Templates whose near-black pixel counts anchor plain vs. on-button
/// character cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterReference {
    pub plain_template: u32,
    pub on_button_template: u32,
}

impl Default for CharacterReference {
    fn default() -> Self {
        Self {
            plain_template: 5,
            on_button_template: 29,
        }
    }
}

/// The two spike templates a spike outcome is re-matched against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpikeReference {
    pub inside_template: u32,
    pub outside_template: u32,
}

impl Default for SpikeReference {
    fn default() -> Self {
        Self {
            inside_template: 9,
            outside_template: 34,
        }
    }
}

/// Which disambiguation rules run. `None` disables a rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisambiguationParams {
    pub stone: Option<StoneProbe>,
    pub character: Option<CharacterReference>,
    pub spikes: Option<SpikeReference>,
}

impl Default for DisambiguationParams {
    fn default() -> Self {
        Self {
            stone: Some(StoneProbe::default()),
            character: Some(CharacterReference::default()),
            spikes: Some(SpikeReference::default()),
        }
    }
}

impl DisambiguationParams {
    /// All rules off.
    pub fn disabled() -> Self {
        Self {
            stone: None,
            character: None,
            spikes: None,
        }
    }
}

/// Applies [`DisambiguationParams`] to first-pass labels.
pub struct Disambiguator<'m, 'a> {
    params: &'m DisambiguationParams,
    matcher: &'m TemplateMatcher<'a>,
    mapping: &'m TileMapping,
}

impl<'m, 'a> Disambiguator<'m, 'a> {
    pub fn new(
        params: &'m DisambiguationParams,
        matcher: &'m TemplateMatcher<'a>,
        mapping: &'m TileMapping,
    ) -> Self {
        Self {
            params,
            matcher,
            mapping,
        }
    }

    /// Re-resolve `label` if it belongs to an ambiguous family.
    ///
    /// Returns `None` when the label is left as is (not ambiguous, rule
    /// disabled, or reference templates missing from the library).
    pub fn resolve(&self, label: CellLabel, cell: &RgbImageView<'_>) -> Option<CellLabel> {
        let tile = label.tile()?;
        let resolved = if tile.is_stone() {
            self.params
                .stone
                .map(|probe| CellLabel::Tile(resolve_stone(&probe, cell)))
        } else if matches!(tile, TileType::Character | TileType::CharacterOnButton) {
            self.params
                .character
                .and_then(|r| self.resolve_character(&r, cell))
                .map(CellLabel::Tile)
        } else if tile.is_spikes() {
            self.params.spikes.and_then(|r| self.resolve_spikes(&r, cell))
        } else {
            None
        };
        resolved.filter(|&new| new != label)
    }

    fn resolve_character(
        &self,
        reference: &CharacterReference,
        cell: &RgbImageView<'_>,
    ) -> Option<TileType> {
        let library = self.matcher.library();
        let plain = library.get(reference.plain_template)?.coarse.black;
        let on_button = library.get(reference.on_button_template)?.coarse.black;
        let black = coarse_histogram(cell, library.thresholds()).black;
        // Equal distances stay plain.
        if black.abs_diff(on_button) < black.abs_diff(plain) {
            Some(TileType::CharacterOnButton)
        } else {
            Some(TileType::Character)
        }
    }

    fn resolve_spikes(
        &self,
        reference: &SpikeReference,
        cell: &RgbImageView<'_>,
    ) -> Option<CellLabel> {
        let m = self.matcher.histogram_match_among(
            cell,
            &[reference.inside_template, reference.outside_template],
        )?;
        Some(self.mapping.label(m.id))
    }
}

/// Stone variant from the marker colors inside the probe window.
pub fn resolve_stone(probe: &StoneProbe, cell: &RgbImageView<'_>) -> TileType {
    let window = PixelRect::top_centered(
        cell.width,
        cell.height,
        probe.width_frac,
        probe.trim_bottom_px,
    )
    .extract(cell);
    let found = colors_present(&window.view(), &[probe.black_marker, probe.brown_marker]);
    match (found[0], found[1]) {
        (true, true) => TileType::StoneOnButton,
        (true, false) => TileType::StoneOnSpikes,
        _ => TileType::Stone,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilegrid_core::RgbImage;
    use tilegrid_templates::{MatcherParams, TemplateLibrary};

    const GRAY: [u8; 3] = [120, 120, 130];

    fn stone_cell(markers: &[(usize, usize, [u8; 3])]) -> RgbImage {
        let mut img = RgbImage::filled(40, 40, GRAY);
        for &(x, y, rgb) in markers {
            img.put_pixel(x, y, rgb);
        }
        img
    }

    #[test]
    fn stone_variants_from_markers() {
        let probe = StoneProbe::default();
        let black = palette::STONE_BLACK_MARKER;
        let brown = palette::STONE_BROWN_MARKER;

        let plain = stone_cell(&[]);
        assert_eq!(resolve_stone(&probe, &plain.view()), TileType::Stone);

        let spikes = stone_cell(&[(20, 10, black)]);
        assert_eq!(resolve_stone(&probe, &spikes.view()), TileType::StoneOnSpikes);

        let button = stone_cell(&[(20, 10, black), (10, 20, brown)]);
        assert_eq!(resolve_stone(&probe, &button.view()), TileType::StoneOnButton);

        let brown_only = stone_cell(&[(10, 20, brown)]);
        assert_eq!(resolve_stone(&probe, &brown_only.view()), TileType::Stone);
    }

    #[test]
    fn stone_markers_outside_probe_are_ignored() {
        let probe = StoneProbe::default();
        // x = 1 is left of the 80% window; y = 30 is in the trimmed bottom.
        let cell = stone_cell(&[
            (1, 10, palette::STONE_BLACK_MARKER),
            (20, 30, palette::STONE_BLACK_MARKER),
        ]);
        assert_eq!(resolve_stone(&probe, &cell.view()), TileType::Stone);
    }

    fn character_library() -> TemplateLibrary {
        let mut lib = TemplateLibrary::new(10, 10);
        let mut plain = RgbImage::filled(10, 10, GRAY);
        plain.fill_rect(0, 0, 10, 2, [0, 0, 0]); // 20 near-black px
        let mut on_button = RgbImage::filled(10, 10, GRAY);
        on_button.fill_rect(0, 0, 10, 6, [0, 0, 0]); // 60 near-black px
        lib.insert(5, "tile5.png", plain, None).unwrap();
        lib.insert(29, "tile29.png", on_button, None).unwrap();
        lib
    }

    #[test]
    fn character_variant_by_black_count() {
        let lib = character_library();
        let matcher = TemplateMatcher::new(&lib, MatcherParams::default());
        let params = DisambiguationParams::default();
        let mapping = TileMapping::default();
        let d = Disambiguator::new(&params, &matcher, &mapping);

        let mut cell = RgbImage::filled(10, 10, GRAY);
        cell.fill_rect(0, 0, 10, 5, [5, 5, 5]); // 50 near-black px
        assert_eq!(
            d.resolve(TileType::Character.into(), &cell.view()),
            Some(TileType::CharacterOnButton.into())
        );

        let mut cell = RgbImage::filled(10, 10, GRAY);
        cell.fill_rect(0, 0, 10, 3, [5, 5, 5]); // 30 near-black px
        assert_eq!(d.resolve(TileType::Character.into(), &cell.view()), None);
        assert_eq!(
            d.resolve(TileType::CharacterOnButton.into(), &cell.view()),
            Some(TileType::Character.into())
        );
    }

    #[test]
    fn character_rule_needs_both_reference_templates() {
        let mut lib = TemplateLibrary::new(10, 10);
        lib.insert(5, "tile5.png", RgbImage::filled(10, 10, GRAY), None)
            .unwrap();
        let matcher = TemplateMatcher::new(&lib, MatcherParams::default());
        let params = DisambiguationParams::default();
        let mapping = TileMapping::default();
        let d = Disambiguator::new(&params, &matcher, &mapping);
        let cell = RgbImage::filled(10, 10, [0, 0, 0]);
        assert_eq!(d.resolve(TileType::Character.into(), &cell.view()), None);
    }

    #[test]
    fn spikes_rematched_against_the_two_references() {
        let mut lib = TemplateLibrary::new(20, 20);
        lib.insert(9, "tile9.png", RgbImage::filled(20, 20, [200, 200, 200]), None)
            .unwrap();
        // Same fine-histogram bin as the cell.
        lib.insert(34, "tile34.png", RgbImage::filled(20, 20, [75, 75, 75]), None)
            .unwrap();
        lib.insert(17, "tile17.png", RgbImage::filled(20, 20, [70, 70, 70]), None)
            .unwrap();
        let matcher = TemplateMatcher::new(&lib, MatcherParams::default());
        let params = DisambiguationParams::default();
        let mapping = TileMapping::default();
        let d = Disambiguator::new(&params, &matcher, &mapping);

        let cell = RgbImage::filled(20, 20, [70, 70, 70]);
        assert_eq!(
            d.resolve(TileType::SpikesInside.into(), &cell.view()),
            Some(TileType::SpikesOutside.into())
        );
        assert_eq!(d.resolve(TileType::SpikesOutside.into(), &cell.view()), None);
    }

    #[test]
    fn other_labels_are_untouched() {
        let lib = TemplateLibrary::new(10, 10);
        let matcher = TemplateMatcher::new(&lib, MatcherParams::default());
        let params = DisambiguationParams::default();
        let mapping = TileMapping::default();
        let d = Disambiguator::new(&params, &matcher, &mapping);
        let cell = RgbImage::filled(10, 10, palette::STONE_BLACK_MARKER);
        assert_eq!(d.resolve(TileType::Lava.into(), &cell.view()), None);
        assert_eq!(d.resolve(CellLabel::Unmapped(40), &cell.view()), None);
        assert_eq!(d.resolve(CellLabel::Unresolved, &cell.view()), None);

        let off = DisambiguationParams::disabled();
        let d = Disambiguator::new(&off, &matcher, &mapping);
        assert_eq!(d.resolve(TileType::Stone.into(), &cell.view()), None);
    }
}
