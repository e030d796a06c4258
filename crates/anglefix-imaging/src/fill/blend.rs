// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Optional blur composite over filled regions to soften seams.

use image::{Rgba, imageops};
use imageproc::filter::gaussian_blur_f32;

use anglefix_core::config::BlendConfig;

use crate::image::raster::RasterImage;

use super::locate::BlankRegion;
use super::{RegionScope, equivalent_radius};

/// Added to the equivalent radius to get the blended square.
pub const BLEND_PADDING: u32 = 8;

/// Blend a blurred copy over each region's square, forcing alpha opaque.
///
/// Returns pixels rewritten, counting overlaps once per region.
pub fn composite(image: &mut RasterImage, regions: &[BlankRegion], config: &BlendConfig) -> usize {
    let (w, h) = image.dimensions();
    let margin = (config.sigma * 3.0).ceil() as u32;
    let f = config.blend_factor;
    let mut written = 0;

    for region in regions {
        let scope = RegionScope {
            center: region.center(),
            radius: equivalent_radius(region.size) + BLEND_PADDING,
        };
        let reach = scope.radius + margin;
        let x0 = scope.center.0.saturating_sub(reach);
        let y0 = scope.center.1.saturating_sub(reach);
        let x1 = scope.center.0.saturating_add(reach).min(w - 1);
        let y1 = scope.center.1.saturating_add(reach).min(h - 1);
        if x0 > x1 || y0 > y1 {
            continue;
        }
        let crop = imageops::crop_imm(image.as_rgba(), x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image();
        let blurred = gaussian_blur_f32(&crop, config.sigma);

        for (x, y) in scope.pixels(w, h) {
            let b = blurred.get_pixel(x - x0, y - y0).0;
            let o = image.pixel(x, y).0;
            let mix = |c: usize| (b[c] as f32 * f + o[c] as f32 * (1.0 - f)).round().clamp(0.0, 255.0) as u8;
            image.set(x, y, Rgba([mix(0), mix(1), mix(2), 255]));
            written += 1;
        }
    }
    written
}
