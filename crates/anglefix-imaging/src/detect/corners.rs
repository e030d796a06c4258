// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner analysis: Harris response on a coarse grid, then skew from the
// quadrant centroids or, failing that, from pairwise corner alignments.

use tracing::debug;

use super::gradient::{GrayField, is_near_horizontal, segment_orientation};

const STRIDE: usize = 2;
/// Half-width of the structure-tensor window (7x7).
const WINDOW: i64 = 3;
/// Window plus the one pixel the central difference needs.
const MARGIN: u32 = WINDOW as u32 + 1;
const HARRIS_K: f32 = 0.04;
const RESPONSE_THRESHOLD: f32 = 100_000.0;
const MAX_CORNERS: usize = 20;

/// A location with a Harris corner response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerCandidate {
    pub x: f32,
    pub y: f32,
    pub response: f32,
}

/// Harris response at `(x, y)`. The caller keeps the window inside the field.
fn harris_response(field: &GrayField, x: i64, y: i64) -> f32 {
    let (mut ixx, mut iyy, mut ixy) = (0.0f32, 0.0f32, 0.0f32);
    for dy in -WINDOW..=WINDOW {
        for dx in -WINDOW..=WINDOW {
            if let Some((gx, gy)) = field.gradient(x + dx, y + dy) {
                ixx += gx * gx;
                iyy += gy * gy;
                ixy += gx * gy;
            }
        }
    }
    let det = ixx * iyy - ixy * ixy;
    let trace = ixx + iyy;
    det - HARRIS_K * trace * trace
}

/// The strongest corners above the response threshold, strongest first.
pub fn harris_corners(field: &GrayField) -> Vec<CornerCandidate> {
    let (w, h) = (field.width(), field.height());
    if w <= 2 * MARGIN || h <= 2 * MARGIN {
        return Vec::new();
    }

    let mut corners = Vec::new();
    for y in (MARGIN..h - MARGIN).step_by(STRIDE) {
        for x in (MARGIN..w - MARGIN).step_by(STRIDE) {
            let response = harris_response(field, x as i64, y as i64);
            if response > RESPONSE_THRESHOLD {
                corners.push(CornerCandidate {
                    x: x as f32,
                    y: y as f32,
                    response,
                });
            }
        }
    }
    corners.sort_by(|a, b| b.response.total_cmp(&a.response));
    corners.truncate(MAX_CORNERS);
    debug!(corners = corners.len(), "Harris corners detected");
    corners
}

/// Correction suggested by corner geometry, clamped.
///
/// With corners in all four quadrants, the skew is the mean orientation of
/// the top and bottom centroid-to-centroid edges. Otherwise falls back to
/// [`pairwise_angle`].
pub fn corner_angle(
    corners: &[CornerCandidate],
    width: u32,
    height: u32,
    max_correction: f32,
) -> Option<f32> {
    if corners.is_empty() {
        return None;
    }
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let quadrant = |left: bool, top: bool| -> Option<(f32, f32)> {
        let members: Vec<&CornerCandidate> = corners
            .iter()
            .filter(|c| (c.x < cx) == left && (c.y < cy) == top)
            .collect();
        if members.is_empty() {
            return None;
        }
        let n = members.len() as f32;
        Some((
            members.iter().map(|c| c.x).sum::<f32>() / n,
            members.iter().map(|c| c.y).sum::<f32>() / n,
        ))
    };

    match (
        quadrant(true, true),
        quadrant(false, true),
        quadrant(true, false),
        quadrant(false, false),
    ) {
        (Some(tl), Some(tr), Some(bl), Some(br)) => {
            let top = segment_orientation(tl, tr);
            let bottom = segment_orientation(bl, br);
            let skew = (top + bottom) / 2.0;
            debug!(top, bottom, skew, "Quadrant skew");
            Some((-skew).clamp(-max_correction, max_correction))
        }
        _ => pairwise_angle(corners, max_correction),
    }
}

/// Mean orientation of near-horizontal corner pairs, negated and clamped.
pub fn pairwise_angle(corners: &[CornerCandidate], max_correction: f32) -> Option<f32> {
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for (i, a) in corners.iter().enumerate() {
        for b in &corners[i + 1..] {
            let (p, q) = if a.x <= b.x { (a, b) } else { (b, a) };
            let o = segment_orientation((p.x, p.y), (q.x, q.y));
            if is_near_horizontal(o) {
                sum += o;
                count += 1;
            }
        }
    }
    if count == 0 {
        return None;
    }
    Some((-(sum / count as f32)).clamp(-max_correction, max_correction))
}
