/// One RGB pixel.
pub type Rgb = [u8; 3];

/// Borrowed row-major RGB buffer, 3 bytes per pixel.
#[derive(Clone, Copy, Debug)]
pub struct RgbImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h*3
}

/// Owned row-major RGB buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl<'a> RgbImageView<'a> {
    /// Wrap a raw buffer, checking that its length matches the dimensions.
    pub fn from_raw(width: usize, height: usize, data: &'a [u8]) -> Option<Self> {
        let expected = width.checked_mul(height)?.checked_mul(3)?;
        (data.len() == expected).then_some(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel at `(x, y)`; caller guarantees bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Pixel at `(x, y)` with coordinates clamped to the buffer.
    #[inline]
    pub fn pixel_clamped(&self, x: usize, y: usize) -> Rgb {
        self.pixel(x.min(self.width - 1), y.min(self.height - 1))
    }

    /// Iterate over all pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgb> + 'a {
        self.data.chunks_exact(3).map(|p| [p[0], p[1], p[2]])
    }
}

impl RgbImage {
    /// A `width × height` image filled with one color.
    pub fn filled(width: usize, height: usize, rgb: Rgb) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn view(&self) -> RgbImageView<'_> {
        RgbImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn put_pixel(&mut self, x: usize, y: usize, rgb: Rgb) {
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Fill the rectangle `[x, x+w) × [y, y+h)`, clipped to the image.
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, rgb: Rgb) {
        let x1 = (x + w).min(self.width);
        let y1 = (y + h).min(self.height);
        for yy in y.min(y1)..y1 {
            for xx in x.min(x1)..x1 {
                self.put_pixel(xx, yy, rgb);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_rejects_short_buffers() {
        let data = vec![0u8; 11];
        assert!(RgbImageView::from_raw(2, 2, &data).is_none());
        let data = vec![0u8; 12];
        assert!(RgbImageView::from_raw(2, 2, &data).is_some());
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut img = RgbImage::filled(4, 4, [0, 0, 0]);
        img.fill_rect(2, 2, 10, 10, [9, 8, 7]);
        let view = img.view();
        assert_eq!(view.pixel(3, 3), [9, 8, 7]);
        assert_eq!(view.pixel(1, 1), [0, 0, 0]);
        assert_eq!(view.pixel_clamped(40, 40), [9, 8, 7]);
    }
}
