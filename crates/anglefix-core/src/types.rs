// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Auto Angle Fixer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one pipeline invocation.
///
/// Invocations share no state; the id only exists so that log lines from
/// concurrent uploads can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    /// A fresh random (v4) identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single per-pixel colour adjustment.
///
/// Every variant operates on the RGB channels only; alpha is never touched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "factor", rename_all = "snake_case")]
pub enum Adjustment {
    /// `v * factor`.
    Brightness(f32),
    /// `(v - 128) * factor + 128`.
    Contrast(f32),
    /// `gray + (v - gray) * factor`, with `gray` the Rec. 601 luminance.
    Saturation(f32),
}

impl Adjustment {
    /// Apply the adjustment to one pixel's colour channels.
    ///
    /// Channels are kept as floats between steps and clamped to [0, 255]
    /// after every step.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let clamp = |v: f32| v.clamp(0.0, 255.0);
        match *self {
            Self::Brightness(factor) => rgb.map(|v| clamp(v * factor)),
            Self::Contrast(factor) => rgb.map(|v| clamp((v - 128.0) * factor + 128.0)),
            Self::Saturation(factor) => {
                let gray = 0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2];
                rgb.map(|v| clamp(gray + (v - gray) * factor))
            }
        }
    }
}

/// An ordered list of adjustments applied uniformly to every pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancePreset {
    pub steps: Vec<Adjustment>,
}

impl EnhancePreset {
    /// Final touch-up used by the angle fixer: +10% brightness, +5% contrast,
    /// +15% saturation.
    pub fn angle_fixer() -> Self {
        Self {
            steps: vec![
                Adjustment::Brightness(1.1),
                Adjustment::Contrast(1.05),
                Adjustment::Saturation(1.15),
            ],
        }
    }

    /// Preset used by the standalone image editor: +35% saturation, then
    /// +10% contrast.
    pub fn image_editor() -> Self {
        Self {
            steps: vec![Adjustment::Saturation(1.35), Adjustment::Contrast(1.10)],
        }
    }

    /// A preset that leaves every pixel untouched.
    pub fn identity() -> Self {
        Self { steps: Vec::new() }
    }

    /// Whether the preset has no steps.
    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order over one pixel and round back to 8 bits.
    pub fn apply_rgb(&self, rgb: [u8; 3]) -> [u8; 3] {
        let mut channels = rgb.map(f32::from);
        for step in &self.steps {
            channels = step.apply(channels);
        }
        channels.map(|v| v.round().clamp(0.0, 255.0) as u8)
    }
}

impl Default for EnhancePreset {
    fn default() -> Self {
        Self::angle_fixer()
    }
}
