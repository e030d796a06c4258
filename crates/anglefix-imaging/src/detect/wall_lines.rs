// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wall-line analysis: trace straight edges out from strong gradient seeds and
// read the skew off the near-horizontal ones.

use tracing::debug;

use super::gradient::{
    GrayField, is_near_horizontal, is_near_vertical, line_orientation, orientation_distance,
    signed_orientation,
};

const SAMPLE_STRIDE: usize = 4;
const SEED_MAGNITUDE: f32 = 20.0;
/// A trace stops once the gradient falls under this share of the seed's.
const TRACE_FALLOFF: f32 = 0.3;
const MAX_TRACE_STEPS: u32 = 50;
const MIN_LINE_LENGTH: f32 = 20.0;
const DEDUPE_DEGREES: f32 = 5.0;
const MAX_LINES: usize = 20;

/// A strong gradient sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSample {
    pub x: u32,
    pub y: u32,
    pub magnitude: f32,
    /// Line orientation in `[0, 180)`.
    pub orientation: f32,
}

/// A traced straight segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallLine {
    pub start: (f32, f32),
    pub end: (f32, f32),
    /// Signed orientation in `(-90, 90]`.
    pub orientation: f32,
    /// Gradient magnitude of the seed.
    pub strength: f32,
}

impl WallLine {
    pub fn length(&self) -> f32 {
        let dx = self.end.0 - self.start.0;
        let dy = self.end.1 - self.start.1;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned edge samples on a sparse grid.
pub fn sample_edges(field: &GrayField) -> Vec<EdgeSample> {
    let mut samples = Vec::new();
    for y in (1..field.height().saturating_sub(1)).step_by(SAMPLE_STRIDE) {
        for x in (1..field.width().saturating_sub(1)).step_by(SAMPLE_STRIDE) {
            let Some((gx, gy)) = field.gradient(x as i64, y as i64) else {
                continue;
            };
            let magnitude = (gx * gx + gy * gy).sqrt();
            if magnitude <= SEED_MAGNITUDE {
                continue;
            }
            let orientation = line_orientation(gx, gy);
            let signed = signed_orientation(orientation);
            if is_near_horizontal(signed) || is_near_vertical(signed) {
                samples.push(EdgeSample {
                    x,
                    y,
                    magnitude,
                    orientation,
                });
            }
        }
    }
    samples
}

/// Walk both ways from `seed` along its line direction.
///
/// Returns `None` when the resulting segment is shorter than the minimum.
pub fn trace_line(field: &GrayField, seed: &EdgeSample) -> Option<WallLine> {
    let signed = signed_orientation(seed.orientation);
    let radians = signed.to_radians();
    // y-up orientation, so image rows move against sin.
    let (dx, dy) = (radians.cos(), -radians.sin());
    let floor = seed.magnitude * TRACE_FALLOFF;

    let walk = |sign: f32| -> (f32, f32) {
        let mut last = (seed.x as f32, seed.y as f32);
        for step in 1..=MAX_TRACE_STEPS {
            let px = seed.x as f32 + sign * dx * step as f32;
            let py = seed.y as f32 + sign * dy * step as f32;
            match field.magnitude(px.round() as i64, py.round() as i64) {
                Some(m) if m >= floor => last = (px, py),
                _ => break,
            }
        }
        last
    };

    let line = WallLine {
        start: walk(-1.0),
        end: walk(1.0),
        orientation: signed,
        strength: seed.magnitude,
    };
    (line.length() >= MIN_LINE_LENGTH).then_some(line)
}

/// Keep the strongest line of each orientation cluster, at most [`MAX_LINES`].
pub fn dedupe_lines(mut lines: Vec<WallLine>) -> Vec<WallLine> {
    lines.sort_by(|a, b| b.strength.total_cmp(&a.strength));
    let mut kept: Vec<WallLine> = Vec::new();
    for line in lines {
        if kept.len() == MAX_LINES {
            break;
        }
        let duplicate = kept
            .iter()
            .any(|k| orientation_distance(k.orientation, line.orientation) < DEDUPE_DEGREES);
        if !duplicate {
            kept.push(line);
        }
    }
    kept
}

/// Trace, filter, and deduplicate wall lines.
pub fn detect_wall_lines(field: &GrayField) -> Vec<WallLine> {
    let seeds = sample_edges(field);
    let traced: Vec<WallLine> = seeds.iter().filter_map(|s| trace_line(field, s)).collect();
    let lines = dedupe_lines(traced);
    debug!(seeds = seeds.len(), lines = lines.len(), "Wall lines traced");
    lines
}

/// Correction suggested by the near-horizontal lines, clamped.
///
/// `None` when there are no near-horizontal lines.
pub fn wall_line_angle(lines: &[WallLine], max_correction: f32) -> Option<f32> {
    let horizontal: Vec<f32> = lines
        .iter()
        .map(|l| l.orientation)
        .filter(|o| is_near_horizontal(*o))
        .collect();
    if horizontal.is_empty() {
        return None;
    }
    let mean = horizontal.iter().sum::<f32>() / horizontal.len() as f32;
    Some((-mean).clamp(-max_correction, max_correction))
}
