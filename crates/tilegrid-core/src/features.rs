//! Per-region color features: the 4-bucket coarse histogram and the
//! per-channel binned fine histogram.

use serde::{Deserialize, Serialize};

use crate::image::{Rgb, RgbImageView};

/// Inclusive per-channel range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub r: [u8; 2],
    pub g: [u8; 2],
    pub b: [u8; 2],
}

impl ChannelRange {
    #[inline]
    pub fn contains(&self, [r, g, b]: Rgb) -> bool {
        (self.r[0]..=self.r[1]).contains(&r)
            && (self.g[0]..=self.g[1]).contains(&g)
            && (self.b[0]..=self.b[1]).contains(&b)
    }
}

/// Bucket boundaries of the coarse histogram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoarseThresholds {
    /// Near-black: every channel strictly below this value.
    pub black_below: u8,
    /// Brown: every channel inside its range.
    pub brown: ChannelRange,
    /// Near-white: every channel strictly above this value.
    pub white_above: u8,
}

impl Default for CoarseThresholds {
    fn default() -> Self {
        Self {
            black_below: 40,
            brown: ChannelRange {
                r: [40, 90],
                g: [25, 65],
                b: [20, 50],
            },
            white_above: 220,
        }
    }
}

impl CoarseThresholds {
    #[inline]
    pub fn is_black(&self, [r, g, b]: Rgb) -> bool {
        r < self.black_below && g < self.black_below && b < self.black_below
    }

    #[inline]
    pub fn is_white(&self, [r, g, b]: Rgb) -> bool {
        r > self.white_above && g > self.white_above && b > self.white_above
    }
}

/// Pixel counts in the near-black / brown / near-white / other buckets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoarseHistogram {
    pub black: u32,
    pub brown: u32,
    pub white: u32,
    pub other: u32,
}

impl CoarseHistogram {
    #[inline]
    pub fn total(&self) -> u32 {
        self.black + self.brown + self.white + self.other
    }

    /// Sum of absolute bucket differences.
    pub fn l1_distance(&self, other: &Self) -> f64 {
        (self.black.abs_diff(other.black)
            + self.brown.abs_diff(other.brown)
            + self.white.abs_diff(other.white)
            + self.other.abs_diff(other.other)) as f64
    }
}

/// Classify every pixel into one coarse bucket. Buckets are tested in the
/// order black, brown, white; the first hit wins.
pub fn coarse_histogram(view: &RgbImageView<'_>, thr: &CoarseThresholds) -> CoarseHistogram {
    let mut h = CoarseHistogram::default();
    for px in view.pixels() {
        if thr.is_black(px) {
            h.black += 1;
        } else if thr.brown.contains(px) {
            h.brown += 1;
        } else if thr.is_white(px) {
            h.white += 1;
        } else {
            h.other += 1;
        }
    }
    h
}

/// `bins³` bucket counts, indexed `(r_bin * bins + g_bin) * bins + b_bin`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FineHistogram {
    pub bins: usize,
    pub counts: Vec<f64>,
    /// Pixels sampled before normalization.
    #[serde(default)]
    pub samples: usize,
}

impl FineHistogram {
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }
}

/// Quantize each channel into `bins` equal bins over `0..=255`.
///
/// With `normalize_to = Some(t)` the counts are rescaled to sum to `t`, so
/// regions of different size are comparable. An empty region yields all
/// zeros either way and reports `samples == 0`.
pub fn fine_histogram(
    view: &RgbImageView<'_>,
    bins: usize,
    normalize_to: Option<f64>,
) -> FineHistogram {
    let bins = bins.clamp(1, 256);
    let mut counts = vec![0.0f64; bins * bins * bins];
    let q = |v: u8| v as usize * bins / 256;
    let mut n = 0usize;
    for [r, g, b] in view.pixels() {
        counts[(q(r) * bins + q(g)) * bins + q(b)] += 1.0;
        n += 1;
    }
    if let Some(total) = normalize_to {
        if n > 0 {
            let s = total / n as f64;
            for c in &mut counts {
                *c *= s;
            }
        }
    }
    FineHistogram {
        bins,
        counts,
        samples: n,
    }
}
