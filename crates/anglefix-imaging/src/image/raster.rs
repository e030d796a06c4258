// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Owned RGBA pixel buffer shared by every pipeline stage.
//
// All coordinate arithmetic goes through these accessors. Stages never index
// the raw byte slice themselves.

use image::{DynamicImage, Rgba, RgbaImage};

use anglefix_core::error::{AngleFixError, Result};

/// Channels below this value count as near-black.
const DARK_CHANNEL: u8 = 30;
/// Channel sums below this value count as near-black.
const DARK_SUM: u16 = 60;

/// Whether a pixel is unfilled: transparent, near-black, or very dark overall.
///
/// Anti-aliased rotation seams count as blank along with transparent corners.
pub fn is_blank_pixel(px: Rgba<u8>) -> bool {
    let [r, g, b, a] = px.0;
    a == 0
        || (r < DARK_CHANNEL && g < DARK_CHANNEL && b < DARK_CHANNEL)
        || (r as u16 + g as u16 + b as u16) < DARK_SUM
}

/// A width x height grid of 8-bit RGBA pixels, row-major.
///
/// Dimensions are fixed for the buffer's lifetime and never zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    // -- Construction ---------------------------------------------------------

    /// Allocate a fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            pixels: RgbaImage::new(width, height),
        })
    }

    /// Allocate a canvas filled with one colour.
    pub fn filled(width: u32, height: u32, px: Rgba<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            pixels: RgbaImage::from_pixel(width, height, px),
        })
    }

    /// Wrap an existing RGBA buffer.
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self> {
        check_dimensions(pixels.width(), pixels.height())?;
        Ok(Self { pixels })
    }

    /// Convert any decoded image to RGBA and wrap it.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        Self::from_rgba(image.into_rgba8())
    }

    // -- Accessors ------------------------------------------------------------

    /// Canvas width in pixels, never zero.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Canvas height in pixels, never zero.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Whether signed coordinates fall inside the canvas.
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i64 && y < self.height() as i64
    }

    /// Pixel at signed coordinates, or `None` outside the canvas.
    pub fn get(&self, x: i64, y: i64) -> Option<Rgba<u8>> {
        if self.in_bounds(x, y) {
            Some(*self.pixels.get_pixel(x as u32, y as u32))
        } else {
            None
        }
    }

    /// Pixel at in-bounds coordinates.
    ///
    /// Panics if `(x, y)` lies outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    /// Overwrite one pixel.
    ///
    /// Panics if `(x, y)` lies outside the canvas.
    pub fn set(&mut self, x: u32, y: u32, px: Rgba<u8>) {
        self.pixels.put_pixel(x, y, px);
    }

    /// Replace every pixel with `f(pixel)`.
    pub fn map_pixels(&mut self, mut f: impl FnMut(Rgba<u8>) -> Rgba<u8>) {
        for px in self.pixels.pixels_mut() {
            *px = f(*px);
        }
    }

    /// Mean of the three colour channels, ignoring alpha.
    pub fn luma_at(&self, x: u32, y: u32) -> f32 {
        let [r, g, b, _] = self.pixel(x, y).0;
        (r as f32 + g as f32 + b as f32) / 3.0
    }

    /// Whether the in-bounds pixel at `(x, y)` counts as blank.
    pub fn is_blank(&self, x: u32, y: u32) -> bool {
        is_blank_pixel(self.pixel(x, y))
    }

    /// Number of pixels satisfying [`is_blank_pixel`].
    pub fn count_blank(&self) -> usize {
        self.pixels
            .pixels()
            .filter(|px| is_blank_pixel(**px))
            .count()
    }

    /// Total pixel count.
    pub fn area(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Borrow the underlying buffer.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }

    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageRgba8(self.pixels.clone())
    }
}

/// Reject zero-area canvases and sizes whose byte length overflows.
fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(AngleFixError::CanvasUnavailable(format!(
            "zero-area canvas {width}x{height}"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| {
            AngleFixError::CanvasUnavailable(format!("canvas {width}x{height} is too large"))
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify the alpha and channel cut-offs of the blank predicate.
    #[test]
    fn blank_predicate_thresholds() {
        assert!(is_blank_pixel(Rgba([255, 255, 255, 0])));
        assert!(is_blank_pixel(Rgba([29, 29, 29, 255])));
        assert!(is_blank_pixel(Rgba([50, 5, 4, 255])));
        assert!(!is_blank_pixel(Rgba([30, 30, 30, 255])));
        assert!(!is_blank_pixel(Rgba([0, 0, 60, 255])));
    }

    /// Verify that zero-area canvases are refused.
    #[test]
    fn zero_area_is_unavailable() {
        let err = RasterImage::new(0, 10).unwrap_err();
        assert!(matches!(err, AngleFixError::CanvasUnavailable(_)));
    }

    /// Verify that signed lookups outside the canvas return None.
    #[test]
    fn signed_access_is_bounds_checked() {
        let img = RasterImage::filled(4, 3, Rgba([200, 100, 50, 255])).unwrap();
        assert!(img.get(-1, 0).is_none());
        assert!(img.get(4, 0).is_none());
        assert!(img.get(0, 3).is_none());
        assert_eq!(img.get(3, 2), Some(Rgba([200, 100, 50, 255])));
    }

    #[test]
    fn new_canvas_is_entirely_blank() {
        let mut img = RasterImage::new(5, 5).unwrap();
        assert_eq!(img.count_blank(), 25);
        img.set(2, 2, Rgba([120, 120, 120, 255]));
        assert_eq!(img.count_blank(), 24);
        assert!(!img.is_blank(2, 2));
        assert!((img.luma_at(2, 2) - 120.0).abs() < 1e-6);
    }
}
