// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blocking HTTP client for the extend-image endpoint.

use reqwest::blocking::{Client, multipart};
use tracing::{debug, instrument};

use anglefix_core::error::{AngleFixError, Result};

use crate::response::parse_extend_response;
use crate::traits::ImageExtender;

/// POSTs `{image, prompt}` as multipart form data to a fixed endpoint.
///
/// No timeout is set beyond the transport defaults and no retries are made.
pub struct HttpExtender {
    endpoint: String,
    client: Client,
}

impl HttpExtender {
    /// Client for `endpoint`. Fails only if the TLS backend cannot start.
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| AngleFixError::RemoteService(format!("client setup failed: {e}")))?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
        })
    }

    /// URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ImageExtender for HttpExtender {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, original, prompt), fields(endpoint = %self.endpoint, bytes = original.len()))]
    fn extend(&self, original: &[u8], prompt: &str) -> Result<Vec<u8>> {
        let image = multipart::Part::bytes(original.to_vec()).file_name("image");
        let form = multipart::Form::new()
            .part("image", image)
            .text("prompt", prompt.to_string());

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(|e| AngleFixError::RemoteService(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AngleFixError::RemoteService(format!(
                "service returned {status}"
            )));
        }

        let body = response
            .text()
            .map_err(|e| AngleFixError::RemoteService(format!("failed to read body: {e}")))?;
        debug!(body_len = body.len(), "extend response received");
        parse_extend_response(&body)
    }
}
