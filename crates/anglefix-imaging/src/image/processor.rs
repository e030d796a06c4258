// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: decode, encode, resize, and the uniform expand used by the
// photo fixer.
// Thin wrappers over the `image` crate that map its errors into ours.

use std::path::Path;

use image::ImageFormat;
use image::imageops::{self, FilterType};
use tracing::{debug, info, instrument};

use anglefix_core::error::{AngleFixError, Result};

use crate::image::raster::RasterImage;

// -- Decoding -----------------------------------------------------------------

/// Decode JPEG, PNG, or WebP bytes into a raster.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode(data: &[u8]) -> Result<RasterImage> {
    let img = image::load_from_memory(data)
        .map_err(|err| AngleFixError::Decode(err.to_string()))?;
    debug!(
        width = img.width(),
        height = img.height(),
        "Image decoded from bytes"
    );
    RasterImage::from_dynamic(img)
}

/// Read and decode an image file.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open(path: impl AsRef<Path>) -> Result<RasterImage> {
    let data = std::fs::read(path.as_ref())?;
    let img = decode(&data)?;
    info!(width = img.width(), height = img.height(), "Image loaded");
    Ok(img)
}

// -- Encoding -----------------------------------------------------------------

/// Encode as JPEG with the given quality (1-100). Alpha is dropped.
pub fn encode_jpeg(image: &RasterImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let rgb = image.to_dynamic().to_rgb8();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| AngleFixError::Encode(format!("JPEG encoding failed: {err}")))?;
    Ok(buffer)
}

/// Encode as PNG, keeping alpha.
pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .as_rgba()
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| AngleFixError::Encode(format!("PNG encoding failed: {err}")))?;
    Ok(buffer)
}

/// Write to a file, choosing the format from the extension.
///
/// JPEG targets use `jpeg_quality`; every other format keeps alpha.
#[instrument(skip(image), fields(path = %path.as_ref().display()))]
pub fn save(image: &RasterImage, path: impl AsRef<Path>, jpeg_quality: u8) -> Result<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path).map_err(|err| {
        AngleFixError::Encode(format!("unsupported output {}: {err}", path.display()))
    })?;

    if format == ImageFormat::Jpeg {
        let bytes = encode_jpeg(image, jpeg_quality)?;
        std::fs::write(path, bytes)?;
        return Ok(());
    }

    image.as_rgba().save_with_format(path, format).map_err(|err| {
        AngleFixError::Encode(format!("failed to save image to {}: {err}", path.display()))
    })
}

// -- Resizing -----------------------------------------------------------------

/// Resize to exactly `width` x `height` with Lanczos3, ignoring aspect ratio.
pub fn resize_exact(image: &RasterImage, width: u32, height: u32) -> Result<RasterImage> {
    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }
    RasterImage::from_rgba(imageops::resize(
        image.as_rgba(),
        width,
        height,
        FilterType::Lanczos3,
    ))
}

/// Downscale so the longest side is at most `max_side`. Never upscales.
pub fn fit_within(image: &RasterImage, max_side: u32) -> Result<RasterImage> {
    let (w, h) = image.dimensions();
    let longest = w.max(h);
    if longest <= max_side {
        return Ok(image.clone());
    }
    let scale = max_side as f64 / longest as f64;
    let new_w = ((w as f64 * scale).round() as u32).max(1);
    let new_h = ((h as f64 * scale).round() as u32).max(1);
    debug!(from_w = w, from_h = h, new_w, new_h, "Downscaling for analysis");
    RasterImage::from_rgba(imageops::resize(
        image.as_rgba(),
        new_w,
        new_h,
        FilterType::Triangle,
    ))
}

/// Uniformly upscale by `percent` (20 → 120% of each side) with Lanczos3.
///
/// This is a plain resize, not content synthesis. Negative percentages are
/// rejected.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn expand(image: &RasterImage, percent: f32) -> Result<RasterImage> {
    if !percent.is_finite() || percent < 0.0 {
        return Err(AngleFixError::InvalidConfig(format!(
            "expansion percentage must be a non-negative number, got {percent}"
        )));
    }
    let factor = 1.0 + percent as f64 / 100.0;
    let new_w = (image.width() as f64 * factor).round() as u32;
    let new_h = (image.height() as f64 * factor).round() as u32;
    info!(new_w, new_h, percent, "Expanding image");
    resize_exact(image, new_w, new_h)
}
