// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Angle detector: estimates the skew of a room photograph from wall lines,
// Harris corners, and the global edge-orientation histogram, then fuses the
// three estimates.

pub mod corners;
pub mod gradient;
pub mod orientation;
pub mod wall_lines;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use anglefix_core::config::DetectorConfig;
use anglefix_core::error::Result;

use crate::image::processor;
use crate::image::raster::RasterImage;

use self::gradient::GrayField;

/// Fixed correction for images that are far too tall for their width.
pub const PORTRAIT_CORRECTION: f32 = 90.0;
/// Fixed correction for images that are far too wide for their height.
pub const PANORAMA_CORRECTION: f32 = -90.0;

/// Which path produced the detected angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Aspect ratio below the portrait threshold.
    GrossPortrait,
    /// Aspect ratio above the panorama threshold.
    GrossPanorama,
    /// Mean of the non-zero fine-analysis candidates.
    Fused,
    /// No analysis produced a usable candidate.
    None,
    /// Supplied by the caller instead of detected.
    Override,
}

/// Per-analysis candidate angles before fusion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionCandidates {
    pub wall_lines: Option<f32>,
    pub corners: Option<f32>,
    pub orientation: Option<f32>,
}

impl DetectionCandidates {
    /// Mean of the non-zero candidates, clamped. `None` if all are absent or zero.
    pub fn fuse(&self, max_correction: f32) -> Option<f32> {
        let usable: Vec<f32> = [self.wall_lines, self.corners, self.orientation]
            .into_iter()
            .flatten()
            .filter(|a| *a != 0.0)
            .collect();
        if usable.is_empty() {
            return None;
        }
        let mean = usable.iter().sum::<f32>() / usable.len() as f32;
        Some(mean.clamp(-max_correction, max_correction))
    }
}

/// Detector output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleDetection {
    /// Correction in degrees, positive = counter-clockwise.
    pub angle: f32,
    /// Loose "skew is visible" flag, independent of the applied magnitude.
    pub strength: u8,
    pub method: DetectionMethod,
    pub candidates: DetectionCandidates,
}

impl AngleDetection {
    /// A caller-supplied angle standing in for detection.
    pub fn overridden(angle: f32, strength_threshold: f32) -> Self {
        Self {
            angle,
            strength: strength_flag(angle, strength_threshold),
            method: DetectionMethod::Override,
            candidates: DetectionCandidates::default(),
        }
    }

    fn gross(angle: f32, method: DetectionMethod) -> Self {
        Self {
            angle,
            strength: 1,
            method,
            candidates: DetectionCandidates::default(),
        }
    }
}

fn strength_flag(angle: f32, threshold: f32) -> u8 {
    u8::from(angle.abs() > threshold)
}

/// Detect the skew correction for `image`.
#[instrument(skip(image, config), fields(width = image.width(), height = image.height()))]
pub fn detect(image: &RasterImage, config: &DetectorConfig) -> Result<AngleDetection> {
    let aspect = image.width() as f32 / image.height() as f32;
    if aspect < config.portrait_ratio {
        info!(aspect, "Portrait aspect, returning fixed correction");
        return Ok(AngleDetection::gross(
            PORTRAIT_CORRECTION,
            DetectionMethod::GrossPortrait,
        ));
    }
    if aspect > config.panorama_ratio {
        info!(aspect, "Panorama aspect, returning fixed correction");
        return Ok(AngleDetection::gross(
            PANORAMA_CORRECTION,
            DetectionMethod::GrossPanorama,
        ));
    }

    let analysis = processor::fit_within(image, config.analysis_size)?;
    let field = GrayField::from_raster(&analysis);
    let detection = analyze(&field, config);
    info!(
        angle = detection.angle,
        strength = detection.strength,
        method = ?detection.method,
        "Angle detected"
    );
    Ok(detection)
}

/// Run the three fine analyses on a prepared field and fuse them.
pub fn analyze(field: &GrayField, config: &DetectorConfig) -> AngleDetection {
    let max = config.max_correction;

    let lines = wall_lines::detect_wall_lines(field);
    let strong_corners = corners::harris_corners(field);
    let orientations = orientation::sample_orientations(field);

    let candidates = DetectionCandidates {
        wall_lines: wall_lines::wall_line_angle(&lines, max),
        corners: corners::corner_angle(&strong_corners, field.width(), field.height(), max),
        orientation: orientation::orientation_angle(&orientations, max),
    };
    debug!(
        lines = lines.len(),
        corners = strong_corners.len(),
        orientations = orientations.len(),
        ?candidates,
        "Detection candidates"
    );

    match candidates.fuse(max) {
        Some(angle) => AngleDetection {
            angle,
            strength: strength_flag(angle, config.strength_threshold),
            method: DetectionMethod::Fused,
            candidates,
        },
        None => AngleDetection {
            angle: 0.0,
            strength: 0,
            method: DetectionMethod::None,
            candidates,
        },
    }
}
