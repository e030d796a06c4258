// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Full-canvas sweep that copies the nearest non-blank colour into every
// remaining blank pixel.

use image::Rgba;
use tracing::{debug, warn};

use crate::image::raster::{RasterImage, is_blank_pixel};

use super::ring;

/// What the sweep did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub filled: usize,
    pub passes: u32,
    pub remaining: usize,
}

/// One raster-order pass, in place. Pixels filled earlier in the pass can
/// donate to later ones.
fn sweep_pass(image: &mut RasterImage, radius: u32) -> usize {
    let (w, h) = image.dimensions();
    let mut filled = 0;
    for y in 0..h {
        for x in 0..w {
            if !image.is_blank(x, y) {
                continue;
            }
            if let Some(Rgba([r, g, b, _])) = nearest_donor(image, x, y, radius) {
                image.set(x, y, Rgba([r, g, b, 255]));
                filled += 1;
            }
        }
    }
    filled
}

/// First non-blank pixel on the smallest ring around `(x, y)`.
fn nearest_donor(image: &RasterImage, x: u32, y: u32, radius: u32) -> Option<Rgba<u8>> {
    (1..=radius as i64).find_map(|r| {
        ring(r).find_map(|(dx, dy)| {
            image
                .get(x as i64 + dx, y as i64 + dy)
                .filter(|px| !is_blank_pixel(*px))
        })
    })
}

/// Run `passes` sweeps, then keep going while blanks remain and the last
/// pass still made progress.
///
/// A canvas with no non-blank pixel at all is left untouched.
pub fn sweep(image: &mut RasterImage, passes: u32, radius: u32) -> SweepOutcome {
    let mut outcome = SweepOutcome {
        remaining: image.count_blank(),
        ..SweepOutcome::default()
    };
    if outcome.remaining == image.area() {
        warn!(pixels = outcome.remaining, "Canvas is entirely blank; nothing to sweep from");
        return outcome;
    }

    let mut progressed = true;
    while outcome.remaining > 0 && (outcome.passes < passes || progressed) {
        let filled = sweep_pass(image, radius);
        outcome.passes += 1;
        outcome.filled += filled;
        outcome.remaining -= filled;
        progressed = filled > 0;
        debug!(pass = outcome.passes, filled, remaining = outcome.remaining, "Sweep pass");
    }
    outcome
}
