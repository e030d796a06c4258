// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// AngleFixPipeline: Detect → Rotate → Locate → Fill → Enhance.
//
// The photo fixer variant skips filling: it rotates onto an expanded canvas,
// zooms past the exposed corners, crops, optionally expands, then sharpens
// and auto-levels.
//
// Stages run strictly in order on one owned buffer. The only recoverable
// failure is the remote extender; any error from it falls through to local
// synthesis and is logged, never returned.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, info_span, warn};

use anglefix_core::config::PipelineConfig;
use anglefix_core::error::{AngleFixError, Result};
use anglefix_core::types::RunId;
use anglefix_remote::ImageExtender;
use anglefix_remote::stub::UnavailableExtender;

use crate::correct::enhance::enhance;
use crate::correct::photo;
use crate::correct::rotate::rotate;
use crate::detect::{AngleDetection, DetectionMethod, detect};
use crate::fill::locate::{BlankRegion, locate};
use crate::fill::{FillStats, synthesize};
use crate::image::processor;
use crate::image::raster::RasterImage;

/// How the blank regions were filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillOutcome {
    /// Rotation exposed nothing to fill.
    NotNeeded,
    /// The remote extender's image replaced the canvas.
    Remote { extender: String },
    /// Local tiered synthesis and sweep.
    Local { stats: FillStats },
}

/// What one run did, for logs and for the host's diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub detected: AngleDetection,
    /// Degrees actually applied after damping, `None` when skipped.
    pub applied_rotation: Option<f32>,
    pub regions: usize,
    pub fill: FillOutcome,
    pub elapsed_ms: u64,
}

/// The corrected image and its report.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub image: RasterImage,
    pub report: PipelineReport,
}

/// What one photo fixer run did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoFixReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    /// Clockwise degrees used, whether supplied or detected.
    pub angle: f32,
    /// Whether the angle was large enough to rotate, zoom, and crop.
    pub rotated: bool,
    pub expansion_percent: f32,
    pub width: u32,
    pub height: u32,
    pub elapsed_ms: u64,
}

/// The fixed photo and its report.
#[derive(Debug, Clone)]
pub struct PhotoFixOutput {
    pub image: RasterImage,
    pub report: PhotoFixReport,
}

/// One configured angle-fixing pipeline.
///
/// Holds no per-image state, so one instance can serve any number of
/// independent invocations.
pub struct AngleFixPipeline {
    config: PipelineConfig,
    extender: Box<dyn ImageExtender>,
}

impl AngleFixPipeline {
    // -- Construction ---------------------------------------------------------

    /// Pipeline with no remote service; every fill is local.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_extender(config, Box::new(UnavailableExtender))
    }

    /// Pipeline that consults `extender` before falling back to local fill.
    pub fn with_extender(config: PipelineConfig, extender: Box<dyn ImageExtender>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, extender })
    }

    /// The validated configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Name of the configured remote extender.
    pub fn extender_name(&self) -> &str {
        self.extender.name()
    }

    // -- Entry points ---------------------------------------------------------

    /// Decode `input` and run every stage.
    ///
    /// `angle_override` replaces detection; it is still damped before the
    /// rotation is applied. NaN and infinite overrides are rejected.
    pub fn process(&self, input: &[u8], angle_override: Option<f32>) -> Result<PipelineOutput> {
        let image = processor::decode(input)?;
        self.process_image(&image, input, angle_override)
    }

    /// Like [`process`](Self::process), returning JPEG bytes at the
    /// configured quality.
    pub fn process_and_encode(
        &self,
        input: &[u8],
        angle_override: Option<f32>,
    ) -> Result<(Vec<u8>, PipelineReport)> {
        let output = self.process(input, angle_override)?;
        let bytes = processor::encode_jpeg(&output.image, self.config.output.jpeg_quality)?;
        Ok((bytes, output.report))
    }

    /// Run on an already decoded image. `original` is what the remote
    /// extender receives: the encoded pre-rotation input.
    pub fn process_image(
        &self,
        image: &RasterImage,
        original: &[u8],
        angle_override: Option<f32>,
    ) -> Result<PipelineOutput> {
        let run_id = RunId::new();
        let span = info_span!(
            "angle_fix",
            %run_id,
            width = image.width(),
            height = image.height()
        );
        let _guard = span.enter();
        let started_at = Utc::now();
        let clock = Instant::now();

        let detected = match angle_override {
            Some(angle) if !angle.is_finite() => {
                return Err(AngleFixError::InvalidConfig(format!(
                    "angle override must be a finite number of degrees, got {angle}"
                )));
            }
            Some(angle) => {
                info!(angle, "Using caller-supplied angle");
                AngleDetection::overridden(angle, self.config.detector.strength_threshold)
            }
            None => detect(image, &self.config.detector)?,
        };

        let rotated = rotate(image, detected.angle, &self.config.rotation)?;
        let regions = locate(&rotated.image);
        let (filled, fill) = self.fill(rotated.image, &regions, original);
        let enhanced = enhance(&filled, &self.config.enhance);

        let report = PipelineReport {
            run_id,
            started_at,
            detected,
            applied_rotation: rotated.applied,
            regions: regions.len(),
            fill,
            elapsed_ms: clock.elapsed().as_millis() as u64,
        };
        info!(
            angle = report.detected.angle,
            applied = ?report.applied_rotation,
            regions = report.regions,
            elapsed_ms = report.elapsed_ms,
            "Pipeline complete"
        );
        Ok(PipelineOutput {
            image: enhanced,
            report,
        })
    }

    // -- Photo fixer ----------------------------------------------------------

    /// Straighten a photo without content synthesis.
    ///
    /// `angle` is in clockwise degrees; `None` uses the detector's fused
    /// estimate and ignores the gross-orientation paths. `expansion` is the
    /// final uniform upscale in percent, defaulting to the configured value.
    pub fn fix_photo(
        &self,
        input: &[u8],
        angle: Option<f32>,
        expansion: Option<f32>,
    ) -> Result<PhotoFixOutput> {
        let image = processor::decode(input)?;
        self.fix_photo_image(&image, angle, expansion)
    }

    /// Like [`fix_photo`](Self::fix_photo), returning JPEG bytes at the
    /// configured quality.
    pub fn fix_photo_and_encode(
        &self,
        input: &[u8],
        angle: Option<f32>,
        expansion: Option<f32>,
    ) -> Result<(Vec<u8>, PhotoFixReport)> {
        let output = self.fix_photo(input, angle, expansion)?;
        let bytes = processor::encode_jpeg(&output.image, self.config.output.jpeg_quality)?;
        Ok((bytes, output.report))
    }

    /// Run the photo fixer on an already decoded image.
    pub fn fix_photo_image(
        &self,
        image: &RasterImage,
        angle: Option<f32>,
        expansion: Option<f32>,
    ) -> Result<PhotoFixOutput> {
        let run_id = RunId::new();
        let span = info_span!(
            "photo_fix",
            %run_id,
            width = image.width(),
            height = image.height()
        );
        let _guard = span.enter();
        let started_at = Utc::now();
        let clock = Instant::now();
        let settings = &self.config.photo;

        let angle = match angle {
            Some(angle) if !angle.is_finite() => {
                return Err(AngleFixError::InvalidConfig(format!(
                    "photo angle must be a finite number of degrees, got {angle}"
                )));
            }
            Some(angle) => angle,
            None => {
                let detected = detect(image, &self.config.detector)?;
                // Detected corrections turn counter-clockwise.
                match detected.method {
                    DetectionMethod::Fused => -detected.angle,
                    _ => 0.0,
                }
            }
        };
        let expansion_percent = expansion.unwrap_or(settings.expansion_percent);

        let rotated = angle.abs() > settings.min_rotation;
        let framed = if rotated {
            let turned = photo::rotate_expanded(image, angle)?;
            photo::zoom_crop(&turned, settings.zoom)?
        } else {
            info!(angle, "Angle below threshold, skipping rotation");
            image.clone()
        };
        let expanded = processor::expand(&framed, expansion_percent)?;
        let finished = photo::normalize(&photo::sharpen(&expanded)?);

        let report = PhotoFixReport {
            run_id,
            started_at,
            angle,
            rotated,
            expansion_percent,
            width: finished.width(),
            height: finished.height(),
            elapsed_ms: clock.elapsed().as_millis() as u64,
        };
        info!(
            angle,
            rotated,
            expansion_percent,
            width = report.width,
            height = report.height,
            "Photo fix complete"
        );
        Ok(PhotoFixOutput {
            image: finished,
            report,
        })
    }

    // -- Fill -----------------------------------------------------------------

    fn fill(
        &self,
        canvas: RasterImage,
        regions: &[BlankRegion],
        original: &[u8],
    ) -> (RasterImage, FillOutcome) {
        if regions.is_empty() {
            info!("No blank regions, skipping fill");
            return (canvas, FillOutcome::NotNeeded);
        }

        if self.config.remote.enabled {
            match self.extend_remotely(original, canvas.width(), canvas.height()) {
                Ok(extended) => {
                    info!(extender = self.extender.name(), "Remote extension replaced canvas");
                    return (
                        extended,
                        FillOutcome::Remote {
                            extender: self.extender.name().to_string(),
                        },
                    );
                }
                Err(e) => warn!(
                    extender = self.extender.name(),
                    error = %e,
                    "Remote extension failed, using local synthesis"
                ),
            }
        }

        let (filled, stats) = synthesize(&canvas, regions, &self.config.fill);
        (filled, FillOutcome::Local { stats })
    }

    /// Call the extender and fit its image to the canvas.
    fn extend_remotely(&self, original: &[u8], width: u32, height: u32) -> Result<RasterImage> {
        let bytes = self.extender.extend(original, &self.config.remote.prompt)?;
        let extended = processor::decode(&bytes)?;
        if extended.dimensions() == (width, height) {
            return Ok(extended);
        }
        processor::resize_exact(&extended, width, height)
    }
}
