// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON body returned by the extend-image endpoint.
//
// Shape: {"success": bool, "extendedImage": "data:<mime>;base64,<payload>",
// "error": "..."}. Extra fields (sizes, method) are ignored.

use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;

use anglefix_core::error::{AngleFixError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtendResponse {
    success: bool,
    #[serde(default)]
    extended_image: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse an extend-image response body into encoded image bytes.
///
/// Every failure, including malformed JSON, is a `RemoteService` error.
pub fn parse_extend_response(body: &str) -> Result<Vec<u8>> {
    let response: ExtendResponse = serde_json::from_str(body)
        .map_err(|e| AngleFixError::RemoteService(format!("malformed response: {e}")))?;

    if !response.success {
        let reason = response
            .error
            .unwrap_or_else(|| "extension failed".to_string());
        return Err(AngleFixError::RemoteService(reason));
    }

    let data_url = response.extended_image.ok_or_else(|| {
        AngleFixError::RemoteService("response has no extendedImage".into())
    })?;
    decode_data_url(&data_url)
}

/// Decode a `data:<mime>;base64,<payload>` URL.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let normalized = data_url.trim();
    if !normalized.starts_with("data:") {
        return Err(AngleFixError::RemoteService(
            "extendedImage is not a data URL".into(),
        ));
    }
    let marker = normalized.find(";base64,").ok_or_else(|| {
        AngleFixError::RemoteService("extendedImage data URL is missing the base64 marker".into())
    })?;
    let payload = &normalized[marker + ";base64,".len()..];

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AngleFixError::RemoteService(format!("invalid base64 payload: {e}")))?;
    if bytes.is_empty() {
        return Err(AngleFixError::RemoteService("empty image payload".into()));
    }
    Ok(bytes)
}
