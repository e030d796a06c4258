// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rotation corrector: damped rotation about the image centre on a
// same-size transparent canvas.

use image::Rgba;
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use tracing::{debug, info, instrument};

use anglefix_core::config::RotationConfig;
use anglefix_core::error::Result;

use crate::image::raster::RasterImage;

/// Background for pixels the rotated source no longer covers.
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Rotated image plus the angle actually applied.
#[derive(Debug, Clone)]
pub struct RotationOutcome {
    pub image: RasterImage,
    /// Damped angle in degrees, or `None` when it was too small to apply.
    pub applied: Option<f32>,
}

/// The angle `rotate` would apply for `detected`, if any.
pub fn damped_angle(detected: f32, config: &RotationConfig) -> Option<f32> {
    let damped = detected * config.damping;
    (damped.abs() > config.min_applied).then_some(damped)
}

/// Rotate by `angle × damping` degrees counter-clockwise about the centre.
///
/// The output has the input's dimensions. Small damped angles return an
/// untouched copy.
#[instrument(skip(image, config), fields(width = image.width(), height = image.height()))]
pub fn rotate(image: &RasterImage, angle: f32, config: &RotationConfig) -> Result<RotationOutcome> {
    let Some(damped) = damped_angle(angle, config) else {
        debug!(angle, "Damped angle below threshold, skipping rotation");
        return Ok(RotationOutcome {
            image: image.clone(),
            applied: None,
        });
    };

    info!(angle, damped, "Applying correction rotation");
    // imageproc rotates clockwise for positive theta.
    let rotated = rotate_about_center(
        image.as_rgba(),
        -damped.to_radians(),
        Interpolation::Bilinear,
        TRANSPARENT,
    );
    Ok(RotationOutcome {
        image: RasterImage::from_rgba(rotated)?,
        applied: Some(damped),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque(w: u32, h: u32) -> RasterImage {
        RasterImage::from_rgba(image::RgbaImage::from_fn(w, h, |x, y| {
            Rgba([100 + (x % 50) as u8, 120 + (y % 50) as u8, 140, 255])
        }))
        .unwrap()
    }

    /// Verify that damped angles under the floor return an untouched copy.
    #[test]
    fn tiny_angles_are_identity() {
        let img = opaque(40, 30);
        // 0.16 × 0.3 = 0.048, under the 0.05 floor.
        let out = rotate(&img, 0.16, &RotationConfig::default()).unwrap();
        assert!(out.applied.is_none());
        assert_eq!(out.image, img);
    }

    /// Verify that rotation keeps the canvas size and exposes transparent corners.
    #[test]
    fn rotation_keeps_dimensions_and_exposes_corners() {
        let img = opaque(80, 60);
        let out = rotate(&img, 10.0, &RotationConfig::default()).unwrap();
        assert_eq!(out.image.dimensions(), (80, 60));
        assert!((out.applied.unwrap() - 3.0).abs() < 1e-5);
        assert_eq!(out.image.pixel(0, 0).0[3], 0);
        assert!(out.image.count_blank() > 0);
        assert!(!out.image.is_blank(40, 30));
    }

    /// Turning counter-clockwise lifts the top-right corner off the canvas
    /// and drops the top-left one, so along the top rows the left end is
    /// exposed while the right end stays covered.
    #[test]
    fn positive_angle_is_counter_clockwise() {
        let img = opaque(100, 100);
        let config = RotationConfig {
            damping: 1.0,
            ..RotationConfig::default()
        };
        let out = rotate(&img, 10.0, &config).unwrap();
        assert_eq!(out.image.pixel(10, 2).0[3], 0);
        assert_eq!(out.image.pixel(89, 2).0[3], 255);
    }
}
