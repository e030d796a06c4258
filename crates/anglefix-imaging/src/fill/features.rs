// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-pixel feature maps computed once per synthesis pass.
//
// Maps are read-only after construction. Border pixels where a kernel does
// not fit stay zero.

use crate::image::raster::RasterImage;

/// Neighbour offsets in LBP bit order (row-major, centre skipped).
const LBP_NEIGHBOURS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];
const PATTERN_REACH: i64 = 4;
const PATTERN_MARGIN: u32 = 8;
const PATTERN_TOLERANCE: f32 = 20.0;

/// A width x height grid of `u8` feature values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureMap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl FeatureMap {
    fn zeroed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    fn set(&mut self, x: u32, y: u32, v: u8) {
        self.data[y as usize * self.width as usize + x as usize] = v;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Every feature map for one image.
#[derive(Debug, Clone)]
pub struct ImageFeatures {
    /// Sobel magnitude / 4, capped at 255.
    pub edges: FeatureMap,
    /// 8-neighbour local binary pattern.
    pub textures: FeatureMap,
    /// Central-difference magnitude, capped at 255.
    pub gradient_magnitude: FeatureMap,
    /// Gradient direction `floor((deg + 180) / 2)`, so 0..=180.
    pub gradient_direction: FeatureMap,
    /// Near-equal neighbours within ±4 px, ×8, capped at 255.
    pub patterns: FeatureMap,
}

impl ImageFeatures {
    pub fn compute(image: &RasterImage) -> Self {
        let (w, h) = image.dimensions();
        let gray: Vec<f32> = image
            .as_rgba()
            .pixels()
            .map(|p| (p.0[0] as f32 + p.0[1] as f32 + p.0[2] as f32) / 3.0)
            .collect();
        let g = |x: i64, y: i64| gray[y as usize * w as usize + x as usize];

        let mut edges = FeatureMap::zeroed(w, h);
        let mut textures = FeatureMap::zeroed(w, h);
        let mut gradient_magnitude = FeatureMap::zeroed(w, h);
        let mut gradient_direction = FeatureMap::zeroed(w, h);
        let mut patterns = FeatureMap::zeroed(w, h);

        for y in 1..h.saturating_sub(1) {
            for x in 1..w.saturating_sub(1) {
                let (xi, yi) = (x as i64, y as i64);

                // -- Sobel --
                let sx = -g(xi - 1, yi - 1) + g(xi + 1, yi - 1) - 2.0 * g(xi - 1, yi)
                    + 2.0 * g(xi + 1, yi)
                    - g(xi - 1, yi + 1)
                    + g(xi + 1, yi + 1);
                let sy = -g(xi - 1, yi - 1) - 2.0 * g(xi, yi - 1) - g(xi + 1, yi - 1)
                    + g(xi - 1, yi + 1)
                    + 2.0 * g(xi, yi + 1)
                    + g(xi + 1, yi + 1);
                let sobel = (sx * sx + sy * sy).sqrt() / 4.0;
                edges.set(x, y, sobel.min(255.0) as u8);

                // -- Local binary pattern --
                let centre = g(xi, yi);
                let mut lbp = 0u8;
                for (bit, (dx, dy)) in LBP_NEIGHBOURS.iter().enumerate() {
                    if g(xi + dx, yi + dy) > centre {
                        lbp |= 1 << bit;
                    }
                }
                textures.set(x, y, lbp);

                // -- Central-difference gradient --
                let gx = g(xi + 1, yi) - g(xi - 1, yi);
                let gy = g(xi, yi + 1) - g(xi, yi - 1);
                let magnitude = (gx * gx + gy * gy).sqrt();
                gradient_magnitude.set(x, y, magnitude.min(255.0) as u8);
                let direction = gy.atan2(gx).to_degrees();
                gradient_direction.set(x, y, ((direction + 180.0) / 2.0).floor() as u8);
            }
        }

        if w > 2 * PATTERN_MARGIN && h > 2 * PATTERN_MARGIN {
            for y in PATTERN_MARGIN..h - PATTERN_MARGIN {
                for x in PATTERN_MARGIN..w - PATTERN_MARGIN {
                    let (xi, yi) = (x as i64, y as i64);
                    let centre = g(xi, yi);
                    let mut similar = 0u32;
                    for dy in -PATTERN_REACH..=PATTERN_REACH {
                        for dx in -PATTERN_REACH..=PATTERN_REACH {
                            if (dx, dy) != (0, 0)
                                && (centre - g(xi + dx, yi + dy)).abs() < PATTERN_TOLERANCE
                            {
                                similar += 1;
                            }
                        }
                    }
                    patterns.set(x, y, (similar * 8).min(255) as u8);
                }
            }
        }

        Self {
            edges,
            textures,
            gradient_magnitude,
            gradient_direction,
            patterns,
        }
    }
}
