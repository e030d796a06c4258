// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Local complexity score that picks a region's fill strategy.

use super::{FillContext, RegionScope};

/// Gradient magnitude above which a pixel counts as an edge.
const EDGE_MAGNITUDE: u8 = 50;

/// Complexity and the measurements behind it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AreaAnalysis {
    /// `min(1, (edge_density * 2 + color_variation / 100) / 3)`.
    pub complexity: f32,
    pub edge_density: f32,
    /// Mean absolute difference between a pixel and its 4-neighbour mean.
    pub color_variation: f32,
    pub valid_pixels: usize,
    /// Mean gradient direction code over edge pixels (0..=180), for logs.
    pub mean_direction: f32,
}

/// Score the valid pixels of `scope`. Zero if there are none.
pub fn analyze(ctx: &FillContext<'_>, scope: &RegionScope) -> AreaAnalysis {
    let source = ctx.source;
    let (w, h) = source.dimensions();
    let (mut valid, mut edges) = (0usize, 0usize);
    let (mut variation, mut direction) = (0.0f32, 0.0f32);

    for (x, y) in scope.pixels(w, h) {
        if x < 1 || y < 1 || x + 1 >= w || y + 1 >= h || source.is_blank(x, y) {
            continue;
        }
        valid += 1;

        if ctx.features.gradient_magnitude.get(x, y) > EDGE_MAGNITUDE {
            edges += 1;
            direction += ctx.features.gradient_direction.get(x, y) as f32;
        }

        let neighbours = (source.luma_at(x - 1, y)
            + source.luma_at(x + 1, y)
            + source.luma_at(x, y - 1)
            + source.luma_at(x, y + 1))
            / 4.0;
        variation += (source.luma_at(x, y) - neighbours).abs();
    }

    if valid == 0 {
        return AreaAnalysis::default();
    }
    let edge_density = edges as f32 / valid as f32;
    let color_variation = variation / valid as f32;
    AreaAnalysis {
        complexity: ((edge_density * 2.0 + color_variation / 100.0) / 3.0).min(1.0),
        edge_density,
        color_variation,
        valid_pixels: valid,
        mean_direction: if edges > 0 { direction / edges as f32 } else { 0.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::features::ImageFeatures;
    use crate::image::raster::RasterImage;
    use image::Rgba;

    fn score(img: &RasterImage) -> AreaAnalysis {
        let features = ImageFeatures::compute(img);
        let ctx = FillContext::new(img, &features);
        let scope = RegionScope {
            center: (img.width() / 2, img.height() / 2),
            radius: 10,
        };
        analyze(&ctx, &scope)
    }

    /// Verify that a flat neighbourhood scores as simple.
    #[test]
    fn flat_area_is_simple() {
        let a = score(&RasterImage::filled(30, 30, Rgba([150, 150, 150, 255])).unwrap());
        assert_eq!(a.complexity, 0.0);
        assert_eq!(a.valid_pixels, 21 * 21);
    }

    /// Central differences skip over a 1px checkerboard, so it has colour
    /// variation but no edges and lands in the middle tier.
    #[test]
    fn checkerboard_is_medium() {
        let img = RasterImage::from_rgba(image::RgbaImage::from_fn(30, 30, |x, y| {
            if (x + y) % 2 == 0 { Rgba([250, 250, 250, 255]) } else { Rgba([60, 60, 60, 255]) }
        }))
        .unwrap();
        let a = score(&img);
        assert_eq!(a.edge_density, 0.0);
        assert!((a.color_variation - 190.0).abs() < 1e-3);
        assert!((a.complexity - 1.9 / 3.0).abs() < 1e-4);
    }

    /// Verify that fine stripes score as complex.
    #[test]
    fn two_pixel_stripes_are_complex() {
        let img = RasterImage::from_rgba(image::RgbaImage::from_fn(30, 30, |x, _| {
            if x % 4 < 2 { Rgba([250, 250, 250, 255]) } else { Rgba([60, 60, 60, 255]) }
        }))
        .unwrap();
        let a = score(&img);
        assert_eq!(a.edge_density, 1.0);
        assert!(a.complexity >= 0.7);
    }

    /// Verify that a scope without valid pixels scores zero.
    #[test]
    fn fully_blank_scope_scores_zero() {
        let a = score(&RasterImage::new(30, 30).unwrap());
        assert_eq!(a, AreaAnalysis::default());
    }
}
