// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extender for hosts that have no extension service configured.

use anglefix_core::error::{AngleFixError, Result};

use crate::traits::ImageExtender;

/// Always fails, so every run uses local synthesis.
pub struct UnavailableExtender;

impl ImageExtender for UnavailableExtender {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn extend(&self, _original: &[u8], _prompt: &str) -> Result<Vec<u8>> {
        tracing::debug!("ImageExtender::extend called on unavailable extender");
        Err(AngleFixError::RemoteService(
            "extension service not configured".into(),
        ))
    }
}
