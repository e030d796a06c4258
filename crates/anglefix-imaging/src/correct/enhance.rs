// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Post enhancer: applies an `EnhancePreset` to every pixel.

use image::Rgba;
use tracing::{info, instrument};

use anglefix_core::types::EnhancePreset;

use crate::image::raster::RasterImage;

/// Apply `preset` to every pixel's colour channels. Alpha is kept as is.
#[instrument(skip(image, preset), fields(steps = preset.steps.len()))]
pub fn enhance(image: &RasterImage, preset: &EnhancePreset) -> RasterImage {
    if preset.is_identity() {
        return image.clone();
    }
    info!(pixels = image.area(), "Enhancing image");

    let mut out = image.clone();
    out.map_pixels(|px| {
        let [r, g, b, a] = px.0;
        let [r, g, b] = preset.apply_rgb([r, g, b]);
        Rgba([r, g, b, a])
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify that extreme inputs saturate instead of wrapping.
    #[test]
    fn white_and_black_stay_in_range() {
        let preset = EnhancePreset::angle_fixer();
        let white = RasterImage::filled(4, 4, Rgba([255, 255, 255, 255])).unwrap();
        let black = RasterImage::filled(4, 4, Rgba([0, 0, 0, 255])).unwrap();

        assert!(enhance(&white, &preset)
            .as_rgba()
            .pixels()
            .all(|p| p.0 == [255, 255, 255, 255]));
        assert!(enhance(&black, &preset)
            .as_rgba()
            .pixels()
            .all(|p| p.0 == [0, 0, 0, 255]));
    }

    /// Verify that enhancement never changes alpha.
    #[test]
    fn alpha_is_untouched() {
        let img = RasterImage::filled(2, 2, Rgba([90, 140, 200, 37])).unwrap();
        let out = enhance(&img, &EnhancePreset::image_editor());
        assert!(out.as_rgba().pixels().all(|p| p.0[3] == 37));
        assert_ne!(out, img);
    }

    #[test]
    fn identity_preset_is_a_copy() {
        let img = RasterImage::filled(3, 3, Rgba([10, 200, 77, 255])).unwrap();
        assert_eq!(enhance(&img, &EnhancePreset::identity()), img);
    }
}
