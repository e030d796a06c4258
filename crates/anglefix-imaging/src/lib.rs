// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// anglefix-imaging: Pixel pipeline for the Auto Angle Fixer.
//
// Detect skew, rotate about the centre, find the blank corners the rotation
// exposes, fill them (remote extension first, local synthesis as fallback),
// then apply a colour enhancement preset. A separate photo fixer path rotates,
// zooms, and crops instead of filling.

pub mod correct;
pub mod detect;
pub mod fill;
pub mod image;
pub mod pipeline;

// Re-export the primary entry points so callers can use `anglefix_imaging::RasterImage` etc.
pub use crate::correct::enhance::enhance;
pub use crate::correct::rotate::{RotationOutcome, rotate};
pub use crate::detect::{AngleDetection, DetectionCandidates, DetectionMethod, detect};
pub use crate::fill::locate::{BlankRegion, locate};
pub use crate::fill::{FillStats, synthesize};
pub use crate::image::raster::{RasterImage, is_blank_pixel};
pub use crate::pipeline::{
    AngleFixPipeline, FillOutcome, PhotoFixOutput, PhotoFixReport, PipelineOutput, PipelineReport,
};
