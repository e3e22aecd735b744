//! Ordered color-presence rules that short-circuit template matching.
//!
//! Each rule names one or more reference colors; it fires when every one of
//! them occurs somewhere in the cell (optionally inside a window). Rules run
//! in table order and the first one to fire decides the cell. The order
//! matters: the diamond sparkle must be checked before the broader wall and
//! floor colors, which also occur on diamond tiles.

use serde::{Deserialize, Serialize};
use tilegrid_core::{RegionFrac, Rgb, RgbImageView};
use tilegrid_templates::TileType;

/// Reference colors observed on the game's tiles.
pub mod palette {
    use tilegrid_core::Rgb;

    pub const DIAMOND_SPARKLE: Rgb = [88, 212, 252];
    pub const KEY_MARKER: Rgb = [255, 216, 0];
    pub const WALL_GRAY: Rgb = [112, 112, 120];
    pub const FLOOR_UNDER_WALL: Rgb = [74, 50, 36];
    pub const CHARACTER_SKIN: Rgb = [247, 190, 140];
    pub const CHARACTER_CLOTHING: Rgb = [40, 96, 200];
    pub const BUTTON_PLATE: Rgb = [150, 118, 62];
    pub const CARRIED_KEY: Rgb = [232, 180, 24];
    pub const EXIT_GRAY: Rgb = [150, 150, 150];
    pub const EXIT_BROWN: Rgb = [96, 64, 32];
    pub const STONE_BLACK_MARKER: Rgb = [0, 0, 0];
    pub const STONE_BROWN_MARKER: Rgb = [99, 66, 33];
}

/// A reference color with a per-channel tolerance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSpec {
    pub rgb: Rgb,
    /// Maximum absolute difference allowed on each channel.
    #[serde(default)]
    pub tolerance: u8,
}

impl ColorSpec {
    pub const fn exact(rgb: Rgb) -> Self {
        Self { rgb, tolerance: 0 }
    }

    pub const fn within(rgb: Rgb, tolerance: u8) -> Self {
        Self { rgb, tolerance }
    }

    #[inline]
    pub fn matches(&self, px: Rgb) -> bool {
        self.rgb
            .iter()
            .zip(px)
            .all(|(&c, p)| c.abs_diff(p) <= self.tolerance)
    }
}

/// Which of `specs` occur in `view`.
///
/// Scanning stops as soon as every color has been seen, so a single-color
/// query returns on its first matching pixel.
pub fn colors_present(view: &RgbImageView<'_>, specs: &[ColorSpec]) -> Vec<bool> {
    let mut found = vec![false; specs.len()];
    let mut missing = specs.len();
    if missing == 0 {
        return found;
    }
    for px in view.pixels() {
        for (spec, flag) in specs.iter().zip(found.iter_mut()) {
            if !*flag && spec.matches(px) {
                *flag = true;
                missing -= 1;
            }
        }
        if missing == 0 {
            break;
        }
    }
    found
}

/// One named rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorRule {
    pub name: String,
    pub tile: TileType,
    /// All of these must be present.
    pub colors: Vec<ColorSpec>,
    /// Restrict the search to this part of the cell.
    #[serde(default)]
    pub window: Option<RegionFrac>,
}

impl ColorRule {
    pub fn new(name: impl Into<String>, tile: TileType, colors: Vec<ColorSpec>) -> Self {
        Self {
            name: name.into(),
            tile,
            colors,
            window: None,
        }
    }

    /// Whether every color of the rule occurs in `cell`. A rule without
    /// colors never fires.
    pub fn fires(&self, cell: &RgbImageView<'_>) -> bool {
        if self.colors.is_empty() {
            return false;
        }
        match self.window {
            None => colors_present(cell, &self.colors).iter().all(|&f| f),
            Some(w) => {
                let sub = w.to_rect(cell.width, cell.height).extract(cell);
                colors_present(&sub.view(), &self.colors).iter().all(|&f| f)
            }
        }
    }
}

/// Priority-ordered rule table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorRuleTable {
    rules: Vec<ColorRule>,
}

impl Default for ColorRuleTable {
    fn default() -> Self {
        use palette::*;
        Self::new(vec![
            ColorRule::new(
                "diamond_sparkle",
                TileType::Diamond,
                vec![ColorSpec::exact(DIAMOND_SPARKLE)],
            ),
            ColorRule::new("key_marker", TileType::Key, vec![ColorSpec::exact(KEY_MARKER)]),
            ColorRule::new(
                "wall_gray",
                TileType::Wall,
                vec![ColorSpec::within(WALL_GRAY, 2)],
            ),
            ColorRule::new(
                "floor_under_wall",
                TileType::Floor,
                vec![ColorSpec::exact(FLOOR_UNDER_WALL)],
            ),
            ColorRule::new(
                "character",
                TileType::Character,
                vec![
                    ColorSpec::within(CHARACTER_SKIN, 3),
                    ColorSpec::within(CHARACTER_CLOTHING, 3),
                ],
            ),
            ColorRule::new(
                "character_on_button",
                TileType::CharacterOnButton,
                vec![
                    ColorSpec::within(CHARACTER_SKIN, 3),
                    ColorSpec::exact(BUTTON_PLATE),
                ],
            ),
            ColorRule::new(
                "character_with_key",
                TileType::CharacterWithKey,
                vec![
                    ColorSpec::within(CHARACTER_SKIN, 3),
                    ColorSpec::exact(CARRIED_KEY),
                ],
            ),
            ColorRule::new(
                "exit",
                TileType::Exit,
                vec![ColorSpec::exact(EXIT_GRAY), ColorSpec::exact(EXIT_BROWN)],
            ),
        ])
    }
}

impl ColorRuleTable {
    pub fn new(rules: Vec<ColorRule>) -> Self {
        Self { rules }
    }

    /// A table with no rules: every cell goes to the template matcher.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[ColorRule] {
        &self.rules
    }

    /// First rule that fires, in table order.
    pub fn classify(&self, cell: &RgbImageView<'_>) -> Option<&ColorRule> {
        self.rules.iter().find(|r| r.fires(cell))
    }

    /// First character rule that fires; other rules are not evaluated.
    pub fn detect_character(&self, cell: &RgbImageView<'_>) -> Option<&ColorRule> {
        self.rules
            .iter()
            .filter(|r| r.tile.is_character())
            .find(|r| r.fires(cell))
    }
}
