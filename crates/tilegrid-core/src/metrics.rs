//! Distance metrics between cells, templates and histograms.
//!
//! Every metric returns [`MAX_DISTANCE`] when there is nothing to compare
//! (empty region, mismatched sizes) instead of dividing by zero.

use crate::features::FineHistogram;
use crate::image::RgbImageView;
use crate::region::PixelRect;

/// Sentinel distance for incomparable inputs.
pub const MAX_DISTANCE: f64 = f64::MAX;

/// Denominator guard for [`chi_square`].
pub const CHI_SQUARE_EPS: f64 = 1e-10;

/// Mean absolute error over all pixels and channels of two equal-sized buffers.
pub fn mae(a: &RgbImageView<'_>, b: &RgbImageView<'_>) -> f64 {
    mae_in_rect(a, b, &PixelRect::full(a.width, a.height))
}

/// Mean absolute error restricted to `rect`, which addresses both buffers.
pub fn mae_in_rect(a: &RgbImageView<'_>, b: &RgbImageView<'_>, rect: &PixelRect) -> f64 {
    if a.width != b.width || a.height != b.height {
        return MAX_DISTANCE;
    }
    let r = rect.clip(a.width, a.height);
    if r.is_empty() {
        return MAX_DISTANCE;
    }

    let mut sum = 0u64;
    for y in r.y..r.y + r.height {
        let start = (y * a.width + r.x) * 3;
        let end = start + r.width * 3;
        sum += a.data[start..end]
            .iter()
            .zip(&b.data[start..end])
            .map(|(&p, &q)| p.abs_diff(q) as u64)
            .sum::<u64>();
    }
    sum as f64 / (r.area() * 3) as f64
}

/// Chi-square histogram distance `Σ (h1-h2)² / (h1+h2+ε)`.
///
/// Either histogram built from an empty region scores [`MAX_DISTANCE`].
pub fn chi_square(h1: &FineHistogram, h2: &FineHistogram) -> f64 {
    if h1.counts.len() != h2.counts.len()
        || h1.counts.is_empty()
        || h1.is_empty()
        || h2.is_empty()
    {
        return MAX_DISTANCE;
    }
    h1.counts
        .iter()
        .zip(&h2.counts)
        .map(|(&a, &b)| {
            let d = a - b;
            d * d / (a + b + CHI_SQUARE_EPS)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::fine_histogram;
    use crate::image::RgbImage;
    use approx::assert_relative_eq;

    fn noisy(width: usize, height: usize, seed: u32) -> RgbImage {
        let mut img = RgbImage::filled(width, height, [0, 0, 0]);
        let mut s = seed;
        for y in 0..height {
            for x in 0..width {
                s = s.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let [a, b, c, _] = s.to_le_bytes();
                img.put_pixel(x, y, [a, b, c]);
            }
        }
        img
    }

    #[test]
    fn mae_of_solid_blocks() {
        let a = RgbImage::filled(5, 5, [10, 20, 30]);
        let b = RgbImage::filled(5, 5, [13, 14, 30]);
        assert_relative_eq!(mae(&a.view(), &b.view()), 3.0);
        assert_relative_eq!(mae(&b.view(), &a.view()), 3.0);
    }

    #[test]
    fn mae_in_rect_only_looks_inside() {
        let a = RgbImage::filled(4, 4, [0, 0, 0]);
        let mut b = a.clone();
        b.fill_rect(0, 0, 2, 4, [90, 90, 90]);
        let right = PixelRect {
            x: 2,
            y: 0,
            width: 2,
            height: 4,
        };
        assert_relative_eq!(mae_in_rect(&a.view(), &b.view(), &right), 0.0);
        assert_relative_eq!(mae(&a.view(), &b.view()), 45.0);
    }

    #[test]
    fn empty_or_mismatched_inputs_yield_sentinel() {
        let a = RgbImage::filled(4, 4, [0, 0, 0]);
        let b = RgbImage::filled(3, 4, [0, 0, 0]);
        assert_eq!(mae(&a.view(), &b.view()), MAX_DISTANCE);
        let empty = PixelRect {
            x: 1,
            y: 1,
            width: 0,
            height: 3,
        };
        assert_eq!(mae_in_rect(&a.view(), &a.view(), &empty), MAX_DISTANCE);
    }

    #[test]
    fn chi_square_identity_and_symmetry() {
        for seed in [1u32, 7, 99] {
            let a = noisy(12, 9, seed);
            let b = noisy(12, 9, seed.wrapping_add(1000));
            let ha = fine_histogram(&a.view(), 4, Some(1000.0));
            let hb = fine_histogram(&b.view(), 4, Some(1000.0));
            assert_eq!(chi_square(&ha, &ha), 0.0);
            assert_relative_eq!(
                chi_square(&ha, &hb),
                chi_square(&hb, &ha),
                max_relative = 1e-12
            );
            assert!(chi_square(&ha, &hb) > 0.0);
        }
    }

    #[test]
    fn chi_square_of_disjoint_solids() {
        let a = RgbImage::filled(4, 4, [0, 0, 0]);
        let b = RgbImage::filled(4, 4, [255, 255, 255]);
        let ha = fine_histogram(&a.view(), 4, Some(1000.0));
        let hb = fine_histogram(&b.view(), 4, Some(1000.0));
        assert_relative_eq!(chi_square(&ha, &hb), 2000.0, max_relative = 1e-9);
    }

    #[test]
    fn chi_square_bin_mismatch_is_sentinel() {
        let a = RgbImage::filled(2, 2, [0, 0, 0]);
        let h4 = fine_histogram(&a.view(), 4, None);
        let h2 = fine_histogram(&a.view(), 2, None);
        assert_eq!(chi_square(&h4, &h2), MAX_DISTANCE);
    }

    #[test]
    fn chi_square_of_empty_region_is_sentinel() {
        let a = RgbImage::filled(4, 4, [0, 0, 0]);
        let empty = PixelRect {
            x: 2,
            y: 2,
            width: 0,
            height: 0,
        }
        .extract(&a.view());
        let he = fine_histogram(&empty.view(), 4, Some(1000.0));
        let ha = fine_histogram(&a.view(), 4, Some(1000.0));
        assert!(he.is_empty());
        assert_eq!(chi_square(&he, &he), MAX_DISTANCE);
        assert_eq!(chi_square(&he, &ha), MAX_DISTANCE);
        assert_eq!(chi_square(&ha, &he), MAX_DISTANCE);
    }
}
