// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Texture synthesis for medium-complexity areas: copy the nearest pixel whose
// local binary pattern resembles the region centre's.

use image::Rgba;

use crate::image::raster::RasterImage;

use super::nearest::PointIndex;
use super::{FillContext, RegionScope, fill_scope};

/// Maximum LBP code distance for a donor to count as similar.
const TEXTURE_TOLERANCE: i16 = 10;
const INDEX_CELL: u32 = 16;

/// Valid pixels anywhere in the source whose texture code is within
/// tolerance of `target`.
pub(crate) fn similar_donors(ctx: &FillContext<'_>, target: u8) -> PointIndex<Rgba<u8>> {
    let source = ctx.source;
    let (w, h) = source.dimensions();
    let mut index = PointIndex::new(w, h, INDEX_CELL);
    for y in 0..h {
        for x in 0..w {
            if source.is_blank(x, y) {
                continue;
            }
            let code = ctx.features.textures.get(x, y) as i16;
            if (code - target as i16).abs() < TEXTURE_TOLERANCE {
                index.insert(x, y, source.pixel(x, y));
            }
        }
    }
    index
}

/// Fill the scope from texture-matched donors. Returns pixels written.
pub fn fill(ctx: &FillContext<'_>, scope: &RegionScope, out: &mut RasterImage) -> usize {
    let target = ctx.features.textures.get(scope.center.0, scope.center.1);
    let donors = ctx.texture_donors(target);
    if donors.is_empty() {
        return 0;
    }
    fill_scope(scope, out, |x, y| donors.nearest(x, y).map(|(_, _, px)| px))
}
