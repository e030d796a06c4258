// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge extension for simple areas: stretch the best-populated side of the
// neighbourhood across the blank pixels.

use image::Rgba;

use crate::image::raster::{RasterImage, is_blank_pixel};

use super::{FillContext, RegionScope, fill_scope, ring};

/// Cross-axis distance counts half as much as distance along the edge.
const CROSS_AXIS_WEIGHT: f32 = 0.5;

/// A side of the neighbourhood, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    fn index(self) -> usize {
        self as usize
    }

    /// Top/bottom donors run along x; left/right along y.
    fn runs_along_x(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

/// Donors of one side, bucketed by their along-edge coordinate and sorted by
/// the cross-axis one.
struct SideIndex {
    along_x: bool,
    buckets: Vec<Vec<(u32, Rgba<u8>)>>,
}

impl SideIndex {
    fn build(side: Side, donors: &[(u32, u32, Rgba<u8>)], width: u32, height: u32) -> Self {
        let along_x = side.runs_along_x();
        let len = if along_x { width } else { height } as usize;
        let mut buckets: Vec<Vec<(u32, Rgba<u8>)>> = vec![Vec::new(); len];
        for &(x, y, px) in donors {
            let (major, minor) = if along_x { (x, y) } else { (y, x) };
            buckets[major as usize].push((minor, px));
        }
        for bucket in &mut buckets {
            bucket.sort_by_key(|(minor, _)| *minor);
        }
        Self { along_x, buckets }
    }

    /// Donor minimising `|Δalong| + 0.5 · |Δcross|` from `(x, y)`.
    fn best(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        let (major, minor) = if self.along_x { (x, y) } else { (y, x) };
        let mut best: Option<(f32, Rgba<u8>)> = None;

        for d in 0..self.buckets.len() as i64 {
            if best.is_some_and(|(dist, _)| d as f32 >= dist) {
                break;
            }
            let lanes = [major as i64 - d, major as i64 + d];
            for lane in lanes.into_iter().take(if d == 0 { 1 } else { 2 }) {
                if lane < 0 || lane as usize >= self.buckets.len() {
                    continue;
                }
                let bucket = &self.buckets[lane as usize];
                let split = bucket.partition_point(|(m, _)| *m < minor);
                for &i in &[split.wrapping_sub(1), split] {
                    let Some(&(m, px)) = bucket.get(i) else {
                        continue;
                    };
                    let dist = d as f32 + CROSS_AXIS_WEIGHT * (m as f32 - minor as f32).abs();
                    if best.is_none_or(|(b, _)| dist < b) {
                        best = Some((dist, px));
                    }
                }
            }
        }
        best.map(|(_, px)| px)
    }
}

/// Valid donors on rings 1..=2r around the centre, split by side.
///
/// A ring corner counts toward both of its sides.
pub fn collect_sides(ctx: &FillContext<'_>, scope: &RegionScope) -> [Vec<(u32, u32, Rgba<u8>)>; 4] {
    let mut sides: [Vec<(u32, u32, Rgba<u8>)>; 4] = Default::default();
    let (cx, cy) = (scope.center.0 as i64, scope.center.1 as i64);
    for r in 1..=(scope.radius as i64 * 2) {
        for (dx, dy) in ring(r) {
            let (x, y) = (cx + dx, cy + dy);
            let Some(px) = ctx.source.get(x, y) else {
                continue;
            };
            if is_blank_pixel(px) {
                continue;
            }
            let entry = (x as u32, y as u32, px);
            if dy < 0 {
                sides[0].push(entry);
            }
            if dy > 0 {
                sides[1].push(entry);
            }
            if dx < 0 {
                sides[2].push(entry);
            }
            if dx > 0 {
                sides[3].push(entry);
            }
        }
    }
    sides
}

/// The side with the most donors; earlier sides win ties.
pub fn best_side(sides: &[Vec<(u32, u32, Rgba<u8>)>; 4]) -> Option<Side> {
    let mut best: Option<(Side, usize)> = None;
    for (side, donors) in Side::ALL.into_iter().zip(sides.iter()) {
        if !donors.is_empty() && best.is_none_or(|(_, n)| donors.len() > n) {
            best = Some((side, donors.len()));
        }
    }
    best.map(|(side, _)| side)
}

/// Fill the scope from its best-populated side. Returns pixels written.
pub fn fill(ctx: &FillContext<'_>, scope: &RegionScope, out: &mut RasterImage) -> usize {
    let sides = collect_sides(ctx, scope);
    let Some(side) = best_side(&sides) else {
        return 0;
    };
    let donors = &sides[side.index()];
    let (w, h) = ctx.source.dimensions();
    let index = SideIndex::build(side, donors, w, h);
    // Cross distance is to the pixel being filled, not the region centre, so
    // each row or column continues its own donors.
    fill_scope(scope, out, |x, y| index.best(x, y))
}
