// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// anglefix-remote: Remote image-extension seam.
//
// The pipeline only ever talks to `dyn ImageExtender`. Hosts without a
// service get the always-failing `stub::UnavailableExtender`, which makes
// the pipeline fall back to local synthesis on every run.

pub mod response;
pub mod stub;
pub mod traits;

#[cfg(feature = "http")]
pub mod http;

pub use traits::ImageExtender;

/// Build the extender for this build and endpoint.
///
/// With the `http` feature and an endpoint, returns an HTTP client for it.
/// Otherwise returns the unavailable stub.
pub fn extender(endpoint: Option<&str>) -> Box<dyn ImageExtender> {
    #[cfg(feature = "http")]
    {
        if let Some(url) = endpoint {
            match http::HttpExtender::new(url) {
                Ok(client) => return Box::new(client),
                Err(e) => tracing::warn!(error = %e, "HTTP extender unavailable, using stub"),
            }
        }
    }
    #[cfg(not(feature = "http"))]
    {
        if endpoint.is_some() {
            tracing::warn!("extend endpoint configured but the `http` feature is disabled");
        }
    }
    Box::new(stub::UnavailableExtender)
}
