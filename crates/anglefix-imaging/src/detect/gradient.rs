// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grayscale field and finite-difference gradients shared by the detectors.
//
// Angles use the y-up convention: a line rising to the right has a positive
// orientation even though image rows grow downwards.

use crate::image::raster::RasterImage;

/// Lines within this many degrees of 0° or 90° are axis-aligned.
pub const AXIS_TOLERANCE: f32 = 15.0;

/// Per-pixel channel mean of a raster, as `f32`.
#[derive(Debug, Clone)]
pub struct GrayField {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl GrayField {
    pub fn from_raster(image: &RasterImage) -> Self {
        let (width, height) = image.dimensions();
        let values = image
            .as_rgba()
            .pixels()
            .map(|px| (px.0[0] as f32 + px.0[1] as f32 + px.0[2] as f32) / 3.0)
            .collect();
        Self {
            width,
            height,
            values,
        }
    }

    /// Build from a closure, mostly for tests.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> f32) -> Self {
        let mut values = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                values.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            values,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn value(&self, x: u32, y: u32) -> f32 {
        self.values[y as usize * self.width as usize + x as usize]
    }

    /// Central differences `(gx, gy)` in image coordinates.
    ///
    /// `None` on the one-pixel border and outside the field.
    pub fn gradient(&self, x: i64, y: i64) -> Option<(f32, f32)> {
        if x < 1 || y < 1 || x >= self.width as i64 - 1 || y >= self.height as i64 - 1 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        let gx = self.value(x + 1, y) - self.value(x - 1, y);
        let gy = self.value(x, y + 1) - self.value(x, y - 1);
        Some((gx, gy))
    }

    /// Gradient magnitude, or `None` where [`Self::gradient`] is undefined.
    pub fn magnitude(&self, x: i64, y: i64) -> Option<f32> {
        self.gradient(x, y).map(|(gx, gy)| (gx * gx + gy * gy).sqrt())
    }
}

/// Orientation (degrees, y-up) of the line running perpendicular to a gradient,
/// folded into `[0, 180)`.
pub fn line_orientation(gx: f32, gy: f32) -> f32 {
    let gradient_angle = (-gy).atan2(gx).to_degrees();
    (gradient_angle + 90.0).rem_euclid(180.0)
}

/// Fold any angle into the signed half-open range `(-90, 90]`.
pub fn signed_orientation(degrees: f32) -> f32 {
    let folded = degrees.rem_euclid(180.0);
    if folded > 90.0 { folded - 180.0 } else { folded }
}

/// Orientation (degrees, y-up, signed) of the segment from `a` to `b`.
pub fn segment_orientation(a: (f32, f32), b: (f32, f32)) -> f32 {
    signed_orientation((-(b.1 - a.1)).atan2(b.0 - a.0).to_degrees())
}

pub fn is_near_horizontal(signed: f32) -> bool {
    signed.abs() < AXIS_TOLERANCE
}

pub fn is_near_vertical(signed: f32) -> bool {
    signed.abs() > 90.0 - AXIS_TOLERANCE
}

/// Smallest difference between two line orientations, in `[0, 90]`.
pub fn orientation_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(180.0);
    d.min(180.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify that a horizontal edge reads as a zero-degree line.
    #[test]
    fn horizontal_edge_has_zero_orientation() {
        // Dark top half, bright bottom half.
        let field = GrayField::from_fn(10, 10, |_, y| if y < 5 { 0.0 } else { 200.0 });
        let (gx, gy) = field.gradient(4, 5).unwrap();
        assert_eq!(gx, 0.0);
        assert!(gy > 0.0);
        assert!(signed_orientation(line_orientation(gx, gy)).abs() < 1e-3);
    }

    /// Verify that border pixels have no central-difference gradient.
    #[test]
    fn border_has_no_gradient() {
        let field = GrayField::from_fn(5, 5, |x, _| x as f32);
        assert!(field.gradient(0, 2).is_none());
        assert!(field.gradient(4, 2).is_none());
        assert_eq!(field.gradient(2, 2), Some((2.0, 0.0)));
    }

    #[test]
    fn rising_segment_is_positive() {
        // Image y decreases as the segment rises.
        let o = segment_orientation((0.0, 10.0), (10.0, 9.0));
        assert!(o > 5.0 && o < 6.0, "got {o}");
    }

    /// Verify folding of line orientations into (-90, 90].
    #[test]
    fn signed_folding() {
        assert_eq!(signed_orientation(170.0), -10.0);
        assert_eq!(signed_orientation(90.0), 90.0);
        assert_eq!(signed_orientation(-10.0), -10.0);
        assert!(is_near_vertical(signed_orientation(268.0)));
    }

    #[test]
    fn orientation_distance_wraps() {
        assert!((orientation_distance(89.0, -89.0) - 2.0).abs() < 1e-4);
        assert!((orientation_distance(3.0, -2.0) - 5.0).abs() < 1e-4);
    }
}
