// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blank-region locator: 8-connected components of blank pixels.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::image::raster::RasterImage;

/// Regions of this many pixels or fewer are dropped.
pub const MIN_REGION_SIZE: usize = 5;

const NEIGHBOURS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A connected set of blank pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlankRegion {
    /// Mean pixel position.
    pub centroid: (f32, f32),
    /// Pixel count.
    pub size: usize,
    /// Inclusive bounding box, top-left.
    pub min: (u32, u32),
    /// Inclusive bounding box, bottom-right.
    pub max: (u32, u32),
}

impl BlankRegion {
    /// Centroid rounded to the nearest pixel.
    pub fn center(&self) -> (u32, u32) {
        (
            self.centroid.0.round().max(0.0) as u32,
            self.centroid.1.round().max(0.0) as u32,
        )
    }
}

/// Find every blank region larger than [`MIN_REGION_SIZE`].
///
/// Uses an explicit stack so large regions cannot overflow the call stack.
/// Each pixel is visited at most once across all regions.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn locate(image: &RasterImage) -> Vec<BlankRegion> {
    let (width, height) = image.dimensions();
    let index = |x: u32, y: u32| y as usize * width as usize + x as usize;
    let mut visited = vec![false; image.area()];
    let mut stack: Vec<(u32, u32)> = Vec::new();
    let mut regions = Vec::new();
    let mut discarded = 0usize;

    for sy in 0..height {
        for sx in 0..width {
            if visited[index(sx, sy)] || !image.is_blank(sx, sy) {
                continue;
            }

            let (mut sum_x, mut sum_y, mut size) = (0u64, 0u64, 0usize);
            let (mut min, mut max) = ((sx, sy), (sx, sy));
            visited[index(sx, sy)] = true;
            stack.push((sx, sy));

            while let Some((x, y)) = stack.pop() {
                sum_x += x as u64;
                sum_y += y as u64;
                size += 1;
                min = (min.0.min(x), min.1.min(y));
                max = (max.0.max(x), max.1.max(y));

                for (dx, dy) in NEIGHBOURS {
                    let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                    if !image.in_bounds(nx, ny) {
                        continue;
                    }
                    let (nx, ny) = (nx as u32, ny as u32);
                    let i = index(nx, ny);
                    if !visited[i] && image.is_blank(nx, ny) {
                        visited[i] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            if size > MIN_REGION_SIZE {
                let region = BlankRegion {
                    centroid: (
                        (sum_x as f64 / size as f64) as f32,
                        (sum_y as f64 / size as f64) as f32,
                    ),
                    size,
                    min,
                    max,
                };
                debug!(centroid = ?region.centroid, size, "Blank region found");
                regions.push(region);
            } else {
                discarded += 1;
            }
        }
    }

    info!(regions = regions.len(), discarded, "Blank regions located");
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn gray(w: u32, h: u32) -> RasterImage {
        RasterImage::filled(w, h, Rgba([128, 128, 128, 255])).unwrap()
    }

    fn punch(img: &mut RasterImage, x0: u32, y0: u32, w: u32, h: u32) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.set(x, y, CLEAR);
            }
        }
    }

    #[test]
    fn opaque_image_has_no_regions() {
        assert!(locate(&gray(30, 30)).is_empty());
    }

    /// Verify that regions under the size floor are not reported.
    #[test]
    fn small_regions_are_dropped() {
        let mut img = gray(40, 40);
        punch(&mut img, 2, 2, 2, 2);
        punch(&mut img, 20, 20, 4, 4);
        let regions = locate(&img);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].size, 16);
        assert_eq!(regions[0].centroid, (21.5, 21.5));
        assert_eq!(regions[0].min, (20, 20));
        assert_eq!(regions[0].max, (23, 23));
    }

    /// Verify that diagonal neighbours belong to one region.
    #[test]
    fn diagonal_pixels_join_one_region() {
        let mut img = gray(20, 20);
        for i in 0..8 {
            img.set(5 + i, 5 + i, CLEAR);
        }
        let regions = locate(&img);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].size, 8);
    }

    /// Verify that near-black opaque pixels count as blank.
    #[test]
    fn near_black_counts_as_blank() {
        let mut img = gray(20, 20);
        for y in 0..3 {
            for x in 0..3 {
                img.set(x, y, Rgba([20, 20, 15, 255]));
            }
        }
        assert_eq!(locate(&img)[0].size, 9);
    }

    /// Verify that a canvas-sized region is collected without recursion.
    #[test]
    fn large_region_does_not_recurse() {
        let regions = locate(&RasterImage::new(600, 500).unwrap());
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].size, 300_000);
    }
}
