// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Trait for the outbound image-extension service.

use anglefix_core::error::Result;

/// An external service that extends a photo outward.
///
/// Implementations receive the original encoded upload (not the rotated
/// canvas) and a free-text prompt, and return encoded image bytes. Every
/// failure must come back as `AngleFixError::RemoteService` so the pipeline
/// can fall back to local synthesis.
pub trait ImageExtender: Send + Sync {
    /// Short name used in logs (e.g. "http", "unavailable").
    fn name(&self) -> &str;

    /// Extend `original` according to `prompt`.
    ///
    /// Blocks until the service answers or the transport gives up.
    fn extend(&self, original: &[u8], prompt: &str) -> Result<Vec<u8>>;
}
