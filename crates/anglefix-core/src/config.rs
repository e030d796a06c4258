// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::error::{AngleFixError, Result};
use crate::types::EnhancePreset;

/// Prompt sent to the remote extension service when none is configured.
pub const DEFAULT_EXTEND_PROMPT: &str =
    "Extend the image outward with matching background and seamless continuation";

/// Settings for one pipeline invocation.
///
/// Every field has a default matching the tuned behaviour of the angle fixer,
/// so hosts usually only override one or two values. Missing fields in JSON
/// fall back to those defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub detector: DetectorConfig,
    pub rotation: RotationConfig,
    pub fill: FillConfig,
    pub enhance: EnhancePreset,
    pub remote: RemoteConfig,
    pub photo: PhotoFixConfig,
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make a stage meaningless or panic.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(AngleFixError::InvalidConfig(msg));

        if self.detector.analysis_size == 0 {
            return invalid("detector.analysis_size must be positive".into());
        }
        if !(self.detector.max_correction.is_finite() && self.detector.max_correction > 0.0) {
            return invalid(format!(
                "detector.max_correction must be positive, got {}",
                self.detector.max_correction
            ));
        }
        for (name, ratio) in [
            ("detector.portrait_ratio", self.detector.portrait_ratio),
            ("detector.panorama_ratio", self.detector.panorama_ratio),
        ] {
            if !(ratio.is_finite() && ratio > 0.0) {
                return invalid(format!("{name} must be a positive number, got {ratio}"));
            }
        }
        if self.detector.portrait_ratio >= self.detector.panorama_ratio {
            return invalid(format!(
                "detector.portrait_ratio ({}) must be below detector.panorama_ratio ({})",
                self.detector.portrait_ratio, self.detector.panorama_ratio
            ));
        }
        if !(self.rotation.damping > 0.0 && self.rotation.damping <= 1.0) {
            return invalid(format!(
                "rotation.damping must be in (0, 1], got {}",
                self.rotation.damping
            ));
        }
        if !(self.rotation.min_applied.is_finite() && self.rotation.min_applied >= 0.0) {
            return invalid(format!(
                "rotation.min_applied must be a non-negative number, got {}",
                self.rotation.min_applied
            ));
        }
        if self.fill.sweep_radius == 0 {
            return invalid("fill.sweep_radius must be positive".into());
        }
        if let Some(blend) = &self.fill.blend {
            if !(blend.sigma > 0.0) {
                return invalid(format!("fill.blend.sigma must be positive, got {}", blend.sigma));
            }
            if !(0.0..=1.0).contains(&blend.blend_factor) {
                return invalid(format!(
                    "fill.blend.blend_factor must be in [0, 1], got {}",
                    blend.blend_factor
                ));
            }
        }
        if !(self.photo.zoom.is_finite() && self.photo.zoom >= 1.0) {
            return invalid(format!("photo.zoom must be at least 1.0, got {}", self.photo.zoom));
        }
        if !(self.photo.min_rotation.is_finite() && self.photo.min_rotation >= 0.0) {
            return invalid(format!(
                "photo.min_rotation must be a non-negative number, got {}",
                self.photo.min_rotation
            ));
        }
        if !(self.photo.expansion_percent.is_finite() && self.photo.expansion_percent >= 0.0) {
            return invalid(format!(
                "photo.expansion_percent must be a non-negative number, got {}",
                self.photo.expansion_percent
            ));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return invalid(format!(
                "output.jpeg_quality must be in 1..=100, got {}",
                self.output.jpeg_quality
            ));
        }
        Ok(())
    }
}

/// Angle detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Longest side of the downscaled analysis copy, in pixels.
    pub analysis_size: u32,
    /// Correction angles are clamped to `[-max_correction, max_correction]`.
    pub max_correction: f32,
    /// Fused angles above this magnitude set the strength flag.
    pub strength_threshold: f32,
    /// Width/height below this ratio returns a fixed 90° correction.
    pub portrait_ratio: f32,
    /// Width/height above this ratio returns a fixed -90° correction.
    pub panorama_ratio: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            analysis_size: 400,
            max_correction: 15.0,
            strength_threshold: 0.2,
            portrait_ratio: 0.7,
            panorama_ratio: 2.5,
        }
    }
}

/// Rotation corrector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Multiplier applied to the detected angle before rotating.
    pub damping: f32,
    /// Damped angles at or below this magnitude are not applied.
    pub min_applied: f32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            damping: 0.3,
            min_applied: 0.05,
        }
    }
}

/// Content synthesizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    /// Seed for the patch-based strategy's random source.
    pub seed: u64,
    /// Number of full-canvas sweep passes after the tiered strategies.
    pub sweep_passes: u32,
    /// Largest ring searched by the sweep for a donor pixel.
    pub sweep_radius: u32,
    /// Optional blur compositing over filled regions.
    pub blend: Option<BlendConfig>,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            sweep_passes: 3,
            sweep_radius: 20,
            blend: None,
        }
    }
}

/// Gaussian blur layer composited over filled regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// Blur standard deviation in pixels.
    pub sigma: f32,
    /// Share of the blurred colour in the composite (1.0 = fully blurred).
    pub blend_factor: f32,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            sigma: 30.0,
            blend_factor: 0.99,
        }
    }
}

/// Remote extension service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Whether the pipeline consults the configured extender at all.
    pub enabled: bool,
    /// Free-text continuation prompt.
    pub prompt: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prompt: DEFAULT_EXTEND_PROMPT.to_string(),
        }
    }
}

/// Photo fixer settings: rotate, zoom past the exposed corners, crop, expand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoFixConfig {
    /// Scale applied to the rotated canvas before the centred crop.
    pub zoom: f32,
    /// Angles at or below this magnitude skip rotate, zoom, and crop.
    pub min_rotation: f32,
    /// Uniform upscale used when the caller gives none.
    pub expansion_percent: f32,
}

impl Default for PhotoFixConfig {
    fn default() -> Self {
        Self {
            zoom: 1.35,
            min_rotation: 0.5,
            expansion_percent: 20.0,
        }
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { jpeg_quality: 95 }
    }
}
