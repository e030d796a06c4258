// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the photo editor surface.
//
// Every technical error maps to a plain sentence and a suggestion. The
// severity level drives how the host presents it.

use crate::error::AngleFixError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Flaky network or busy service. Retrying may work.
    Transient,
    /// The user must do something first (pick another file, fix a setting).
    ActionRequired,
    /// Retrying the same input will fail the same way.
    Permanent,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the host should offer an automatic retry.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert an `AngleFixError` into a `HumanError`.
pub fn humanize_error(err: &AngleFixError) -> HumanError {
    match err {
        AngleFixError::Decode(_) => HumanError {
            message: "We couldn't open this photo.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        AngleFixError::CanvasUnavailable(detail) => HumanError {
            message: "There was no room to work on this photo.".into(),
            suggestion: format!("Close some other apps or try a smaller photo. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        AngleFixError::Encode(_) => HumanError {
            message: "We couldn't save the straightened photo.".into(),
            suggestion: "Try again. If this keeps happening, try a smaller photo.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        AngleFixError::InvalidConfig(detail) => HumanError {
            message: "One of the settings isn't valid.".into(),
            suggestion: format!("Check the settings and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        AngleFixError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The photo couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "We don't have permission to use that file.".into(),
                suggestion: "Check the file permissions, or copy the photo somewhere else first.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your storage may be full.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        AngleFixError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Check the settings file is valid JSON, or remove it to use the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        AngleFixError::RemoteService(detail) => humanize_remote_error(detail),
    }
}

/// Map remote extension failures by their detail text.
fn humanize_remote_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("timed out") || lower.contains("timeout") {
        HumanError {
            message: "The online fill service took too long.".into(),
            suggestion: "We filled the corners on this device instead. Try again later for the online result.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    } else if lower.contains("not configured") || lower.contains("unavailable") {
        HumanError {
            message: "The online fill service isn't set up.".into(),
            suggestion: "Corners are filled on this device. Add a service address in the settings to use the online fill.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "The online fill service had a problem.".into(),
            suggestion: format!("We filled the corners on this device instead. (Detail: {detail})"),
            retriable: true,
            severity: Severity::Transient,
        }
    }
}
