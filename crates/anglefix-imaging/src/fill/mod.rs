// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content synthesizer: fills blank regions with one of three strategies
// picked by local complexity, then sweeps the whole canvas so no blank pixel
// survives.
//
// Strategies read donors and features from the unmodified input and only
// write pixels that are still blank in the output, so a region's result does
// not depend on which regions were processed before it (outside overlapping
// neighbourhoods).

pub mod blend;
pub mod complexity;
pub mod edge_extension;
pub mod features;
pub mod locate;
pub mod nearest;
pub mod patch;
pub mod sweep;
pub mod texture;

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use image::Rgba;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use anglefix_core::config::FillConfig;

use crate::image::raster::RasterImage;

use self::features::ImageFeatures;
use self::locate::BlankRegion;
use self::nearest::PointIndex;
use self::patch::Patch;

/// Added to a region's equivalent-circle radius to get its neighbourhood.
pub const REGION_PADDING: u32 = 15;

/// Which tier filled a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    EdgeExtension,
    TextureSynthesis,
    PatchBased,
}

impl FillStrategy {
    pub fn for_complexity(complexity: f32) -> Self {
        if complexity < 0.3 {
            Self::EdgeExtension
        } else if complexity < 0.7 {
            Self::TextureSynthesis
        } else {
            Self::PatchBased
        }
    }
}

/// Regions handled and pixels written by one tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyStats {
    pub regions: usize,
    pub pixels: usize,
}

/// What one synthesis pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillStats {
    pub edge_extension: StrategyStats,
    pub texture_synthesis: StrategyStats,
    pub patch_based: StrategyStats,
    /// Pixels rewritten by the optional blur composite.
    pub blended_pixels: usize,
    pub swept_pixels: usize,
    pub sweep_passes: u32,
    /// Blank pixels left after the sweep. Non-zero only when the canvas had
    /// no usable donor at all.
    pub remaining_blank: usize,
}

impl FillStats {
    fn record(&mut self, strategy: FillStrategy, pixels: usize) {
        let entry = match strategy {
            FillStrategy::EdgeExtension => &mut self.edge_extension,
            FillStrategy::TextureSynthesis => &mut self.texture_synthesis,
            FillStrategy::PatchBased => &mut self.patch_based,
        };
        entry.regions += 1;
        entry.pixels += pixels;
    }
}

/// Read-only inputs shared by every region in one pass.
///
/// Donor material derived from the source is built on first use and reused
/// by every later region.
pub struct FillContext<'a> {
    /// The canvas as it was before any region was filled.
    pub source: &'a RasterImage,
    pub features: &'a ImageFeatures,
    patches: OnceCell<Vec<Patch>>,
    texture_donors: RefCell<HashMap<u8, Rc<PointIndex<Rgba<u8>>>>>,
}

impl<'a> FillContext<'a> {
    pub fn new(source: &'a RasterImage, features: &'a ImageFeatures) -> Self {
        Self {
            source,
            features,
            patches: OnceCell::new(),
            texture_donors: RefCell::new(HashMap::new()),
        }
    }

    /// Fully valid grid patches of the source.
    pub fn patches(&self) -> &[Patch] {
        self.patches.get_or_init(|| patch::sample_patches(self))
    }

    /// Donors whose texture code is within tolerance of `target`, indexed
    /// for nearest lookups. Built once per distinct code.
    pub fn texture_donors(&self, target: u8) -> Rc<PointIndex<Rgba<u8>>> {
        let mut cache = self.texture_donors.borrow_mut();
        let donors = cache
            .entry(target)
            .or_insert_with(|| Rc::new(texture::similar_donors(self, target)));
        Rc::clone(donors)
    }
}

/// Square neighbourhood around a region's centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionScope {
    pub center: (u32, u32),
    pub radius: u32,
}

impl RegionScope {
    /// `ceil(sqrt(size / π)) + padding` around the rounded centroid.
    pub fn around(region: &BlankRegion, padding: u32) -> Self {
        Self {
            center: region.center(),
            radius: equivalent_radius(region.size) + padding,
        }
    }

    /// In-bounds pixels of the square, row-major.
    pub fn pixels(&self, width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
        let (cx, cy) = self.center;
        let x0 = cx.saturating_sub(self.radius);
        let y0 = cy.saturating_sub(self.radius);
        let x1 = cx.saturating_add(self.radius).min(width.saturating_sub(1));
        let y1 = cy.saturating_add(self.radius).min(height.saturating_sub(1));
        (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| (x, y)))
    }
}

/// Offsets on the Chebyshev ring of radius `r`, row-major.
pub(crate) fn ring(r: i64) -> impl Iterator<Item = (i64, i64)> {
    (-r..=r).flat_map(move |dy| {
        let step = if dy.abs() == r { 1 } else { (2 * r).max(1) as usize };
        (-r..=r).step_by(step).map(move |dx| (dx, dy))
    })
}

/// Radius of the circle with the region's area, rounded up.
pub fn equivalent_radius(size: usize) -> u32 {
    (size as f64 / std::f64::consts::PI).sqrt().ceil() as u32
}

/// Write `pick`'s colour into every still-blank pixel of the scope.
///
/// Returns the number of pixels written.
pub(crate) fn fill_scope(
    scope: &RegionScope,
    out: &mut RasterImage,
    mut pick: impl FnMut(u32, u32) -> Option<Rgba<u8>>,
) -> usize {
    let (w, h) = out.dimensions();
    let mut filled = 0;
    for (x, y) in scope.pixels(w, h) {
        if !out.is_blank(x, y) {
            continue;
        }
        if let Some(Rgba([r, g, b, _])) = pick(x, y) {
            out.set(x, y, Rgba([r, g, b, 255]));
            filled += 1;
        }
    }
    filled
}

/// Fill every region, optionally blend, then sweep.
#[instrument(skip_all, fields(regions = regions.len(), width = image.width(), height = image.height()))]
pub fn synthesize(
    image: &RasterImage,
    regions: &[BlankRegion],
    config: &FillConfig,
) -> (RasterImage, FillStats) {
    let features = ImageFeatures::compute(image);
    let ctx = FillContext::new(image, &features);
    let mut out = image.clone();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut stats = FillStats::default();

    for region in regions {
        let scope = RegionScope::around(region, REGION_PADDING);
        let area = complexity::analyze(&ctx, &scope);
        let strategy = FillStrategy::for_complexity(area.complexity);
        let filled = match strategy {
            FillStrategy::EdgeExtension => edge_extension::fill(&ctx, &scope, &mut out),
            FillStrategy::TextureSynthesis => texture::fill(&ctx, &scope, &mut out),
            FillStrategy::PatchBased => patch::fill(&ctx, &scope, &mut out, &mut rng),
        };
        debug!(
            center = ?scope.center,
            radius = scope.radius,
            complexity = area.complexity,
            edge_density = area.edge_density,
            mean_direction = area.mean_direction,
            ?strategy,
            filled,
            "Region filled"
        );
        stats.record(strategy, filled);
    }

    if let Some(blend_config) = &config.blend {
        stats.blended_pixels = blend::composite(&mut out, regions, blend_config);
    }

    let swept = sweep::sweep(&mut out, config.sweep_passes, config.sweep_radius);
    stats.swept_pixels = swept.filled;
    stats.sweep_passes = swept.passes;
    stats.remaining_blank = swept.remaining;

    info!(
        edge = stats.edge_extension.regions,
        texture = stats.texture_synthesis.regions,
        patch = stats.patch_based.regions,
        swept = stats.swept_pixels,
        remaining = stats.remaining_blank,
        "Synthesis complete"
    );
    (out, stats)
}
