// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the Auto Angle Fixer.

use thiserror::Error;

/// Top-level error type for all pipeline operations.
#[derive(Debug, Error)]
pub enum AngleFixError {
    // -- Fatal: abort the invocation --
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("drawing surface unavailable: {0}")]
    CanvasUnavailable(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Recoverable: caught by the pipeline --
    #[error("remote extension service failed: {0}")]
    RemoteService(String),
}

impl AngleFixError {
    /// Whether this error aborts the whole invocation.
    ///
    /// Remote service failures are the only recoverable kind: the pipeline
    /// catches them and falls back to local synthesis.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::RemoteService(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AngleFixError>;
