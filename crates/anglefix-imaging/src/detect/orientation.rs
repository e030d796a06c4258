// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global edge-orientation histogram.

use std::collections::BTreeMap;

use super::gradient::{GrayField, is_near_horizontal, line_orientation, signed_orientation};

const STRIDE: u32 = 8;
const MAGNITUDE_THRESHOLD: f32 = 15.0;
const BIN_DEGREES: f32 = 5.0;

/// Signed line orientations of every strong sample on the sparse grid.
pub fn sample_orientations(field: &GrayField) -> Vec<f32> {
    let mut out = Vec::new();
    let (w, h) = (field.width(), field.height());
    if w <= 2 * STRIDE || h <= 2 * STRIDE {
        return out;
    }
    for y in (STRIDE..h - STRIDE).step_by(STRIDE as usize) {
        for x in (STRIDE..w - STRIDE).step_by(STRIDE as usize) {
            if let Some((gx, gy)) = field.gradient(x as i64, y as i64) {
                if (gx * gx + gy * gy).sqrt() > MAGNITUDE_THRESHOLD {
                    out.push(signed_orientation(line_orientation(gx, gy)));
                }
            }
        }
    }
    out
}

/// Count orientations into 5° bins keyed by the bin centre.
pub fn histogram(orientations: &[f32]) -> BTreeMap<i32, usize> {
    let mut bins = BTreeMap::new();
    for o in orientations {
        let bin = ((o / BIN_DEGREES).round() * BIN_DEGREES) as i32;
        *bins.entry(bin).or_insert(0) += 1;
    }
    bins
}

/// Count-weighted mean of the near-horizontal bins, negated and clamped.
pub fn orientation_angle(orientations: &[f32], max_correction: f32) -> Option<f32> {
    let (mut weighted, mut total) = (0.0f32, 0usize);
    for (bin, count) in histogram(orientations) {
        if is_near_horizontal(bin as f32) {
            weighted += bin as f32 * count as f32;
            total += count;
        }
    }
    if total == 0 {
        return None;
    }
    Some((-(weighted / total as f32)).clamp(-max_correction, max_correction))
}
