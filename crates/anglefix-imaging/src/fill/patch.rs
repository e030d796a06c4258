// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Patch-based synthesis for busy areas.
//
// Candidate 8x8 patches come from an 8 px grid over the source. Each is scored
// by comparing random pixels of the patch against the valid pixels around the
// region; blank pixels are then filled from random pixels of the best patch.
// All randomness comes from the caller's seeded generator.

use image::Rgba;
use rand::Rng;
use rand::rngs::StdRng;
use tracing::trace;

use crate::image::raster::RasterImage;

use super::{FillContext, RegionScope, fill_scope};

pub const PATCH_SIZE: u32 = 8;
const GRID_MARGIN: u32 = 8;
const MIN_SIMILARITY: f32 = 0.7;
const MAX_CANDIDATES: usize = 10;
/// Upper bound on reference pixels compared per patch.
const MAX_SAMPLES: usize = 512;
/// Largest allowed gap between patch and surroundings in mean edge or
/// pattern strength.
const STRUCTURE_TOLERANCE: f32 = 64.0;
const MAX_L1: f32 = 765.0;

/// One donor patch: top-left corner and its pixels, row-major.
#[derive(Debug, Clone)]
pub struct Patch {
    pub origin: (u32, u32),
    pixels: Vec<Rgba<u8>>,
    mean_edge: f32,
    mean_pattern: f32,
}

impl Patch {
    fn random_pixel(&self, rng: &mut StdRng) -> Rgba<u8> {
        self.pixels[rng.gen_range(0..self.pixels.len())]
    }
}

/// A patch and how well it matched.
#[derive(Debug, Clone)]
pub struct ScoredPatch<'a> {
    pub patch: &'a Patch,
    pub similarity: f32,
}

/// Every fully valid patch on the sampling grid.
///
/// Callers inside a pass use [`FillContext::patches`], which samples once.
pub fn sample_patches(ctx: &FillContext<'_>) -> Vec<Patch> {
    let source = ctx.source;
    let (w, h) = source.dimensions();
    let mut patches = Vec::new();
    if w < GRID_MARGIN + PATCH_SIZE || h < GRID_MARGIN + PATCH_SIZE {
        return patches;
    }

    for py in (GRID_MARGIN..h.saturating_sub(GRID_MARGIN)).step_by(PATCH_SIZE as usize) {
        for px in (GRID_MARGIN..w.saturating_sub(GRID_MARGIN)).step_by(PATCH_SIZE as usize) {
            if px + PATCH_SIZE > w || py + PATCH_SIZE > h {
                continue;
            }
            let mut pixels = Vec::with_capacity((PATCH_SIZE * PATCH_SIZE) as usize);
            let (mut edge, mut pattern) = (0u32, 0u32);
            let mut valid = true;
            'patch: for y in py..py + PATCH_SIZE {
                for x in px..px + PATCH_SIZE {
                    if source.is_blank(x, y) {
                        valid = false;
                        break 'patch;
                    }
                    pixels.push(source.pixel(x, y));
                    edge += ctx.features.edges.get(x, y) as u32;
                    pattern += ctx.features.patterns.get(x, y) as u32;
                }
            }
            if !valid {
                continue;
            }
            let n = pixels.len() as f32;
            patches.push(Patch {
                origin: (px, py),
                pixels,
                mean_edge: edge as f32 / n,
                mean_pattern: pattern as f32 / n,
            });
        }
    }
    patches
}

/// Valid pixels of the scope, evenly thinned to at most `MAX_SAMPLES`,
/// plus their mean edge and pattern strength.
fn reference_pixels(ctx: &FillContext<'_>, scope: &RegionScope) -> (Vec<Rgba<u8>>, f32, f32) {
    let source = ctx.source;
    let (w, h) = source.dimensions();
    let valid: Vec<(u32, u32)> = scope.pixels(w, h).filter(|&(x, y)| !source.is_blank(x, y)).collect();
    if valid.is_empty() {
        return (Vec::new(), 0.0, 0.0);
    }
    let (mut edge, mut pattern) = (0u64, 0u64);
    for &(x, y) in &valid {
        edge += ctx.features.edges.get(x, y) as u64;
        pattern += ctx.features.patterns.get(x, y) as u64;
    }
    let n = valid.len() as f32;
    let stride = valid.len().div_ceil(MAX_SAMPLES);
    let samples = valid.iter().step_by(stride).map(|&(x, y)| source.pixel(x, y)).collect();
    (samples, edge as f32 / n, pattern as f32 / n)
}

fn color_similarity(a: Rgba<u8>, b: Rgba<u8>) -> f32 {
    let l1: u32 = (0..3).map(|c| (a.0[c] as i32 - b.0[c] as i32).unsigned_abs()).sum();
    (1.0 - l1 as f32 / MAX_L1).max(0.0)
}

/// Score every structurally compatible patch against the reference pixels
/// and keep the best `MAX_CANDIDATES` above the similarity floor.
pub fn rank_patches<'a>(
    patches: &'a [Patch],
    reference: &[Rgba<u8>],
    mean_edge: f32,
    mean_pattern: f32,
    rng: &mut StdRng,
) -> Vec<ScoredPatch<'a>> {
    if reference.is_empty() {
        return Vec::new();
    }
    let mut scored: Vec<ScoredPatch<'a>> = patches
        .iter()
        .filter(|p| {
            (p.mean_edge - mean_edge).abs() <= STRUCTURE_TOLERANCE
                && (p.mean_pattern - mean_pattern).abs() <= STRUCTURE_TOLERANCE
        })
        .filter_map(|patch| {
            let total: f32 = reference
                .iter()
                .map(|&r| color_similarity(patch.random_pixel(rng), r))
                .sum();
            let similarity = total / reference.len() as f32;
            (similarity > MIN_SIMILARITY).then_some(ScoredPatch { patch, similarity })
        })
        .collect();
    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    scored.truncate(MAX_CANDIDATES);
    scored
}

/// Fill the scope from the best-matching patch. Returns pixels written.
pub fn fill(ctx: &FillContext<'_>, scope: &RegionScope, out: &mut RasterImage, rng: &mut StdRng) -> usize {
    let (reference, mean_edge, mean_pattern) = reference_pixels(ctx, scope);
    let ranked = rank_patches(ctx.patches(), &reference, mean_edge, mean_pattern, rng);
    let Some(best) = ranked.first() else {
        return 0;
    };
    trace!(
        origin = ?best.patch.origin,
        similarity = best.similarity,
        candidates = ranked.len(),
        "Best patch"
    );
    fill_scope(scope, out, |_, _| Some(best.patch.random_pixel(rng)))
}
