// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photo fixer stages: rotate onto an expanded canvas, zoom past the exposed
// corners and crop back, then sharpen and auto-level.
//
// Angles here are the manual slider's convention: positive turns clockwise.

use image::{Rgba, RgbaImage, imageops};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use tracing::{debug, info, instrument};

use anglefix_core::error::Result;

use crate::image::processor;
use crate::image::raster::RasterImage;

/// Background for the corners an expanded rotation uncovers.
pub const PHOTO_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Gaussian sigma of the unsharp mask.
const SHARPEN_SIGMA: f32 = 1.0;
/// Channel differences at or below this are left unsharpened.
const SHARPEN_THRESHOLD: i32 = 2;
/// Share of pixels clipped at each end of the luma range by [`normalize`].
const NORMALIZE_CLIP: f64 = 0.01;

// -- Geometry -----------------------------------------------------------------

/// Size of the canvas that holds a `width` x `height` image turned by
/// `degrees` without clipping.
pub fn rotated_size(width: u32, height: u32, degrees: f32) -> (u32, u32) {
    let radians = (degrees as f64).to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    let (w, h) = (width as f64, height as f64);
    let new_w = ((w * cos + h * sin).round() as u32).max(1);
    let new_h = ((w * sin + h * cos).round() as u32).max(1);
    (new_w, new_h)
}

/// Rotate `degrees` clockwise onto a canvas grown to fit the whole image.
///
/// Uncovered corners are [`PHOTO_BACKGROUND`].
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn rotate_expanded(image: &RasterImage, degrees: f32) -> Result<RasterImage> {
    let (w, h) = image.dimensions();
    let (out_w, out_h) = rotated_size(w, h, degrees);

    // rotate_about_center keeps its canvas, so work on one large enough for
    // both the source and the rotated result.
    let side_w = w.max(out_w);
    let side_h = h.max(out_h);
    let mut canvas = RgbaImage::from_pixel(side_w, side_h, PHOTO_BACKGROUND);
    imageops::replace(
        &mut canvas,
        image.as_rgba(),
        ((side_w - w) / 2) as i64,
        ((side_h - h) / 2) as i64,
    );

    // imageproc rotates clockwise for positive theta.
    let rotated = rotate_about_center(
        &canvas,
        degrees.to_radians(),
        Interpolation::Bilinear,
        PHOTO_BACKGROUND,
    );
    let cropped = imageops::crop_imm(
        &rotated,
        (side_w - out_w) / 2,
        (side_h - out_h) / 2,
        out_w,
        out_h,
    )
    .to_image();
    info!(degrees, out_w, out_h, "Rotated onto expanded canvas");
    RasterImage::from_rgba(cropped)
}

/// Scale by `zoom` with Lanczos3, then crop the centre back to the
/// original size.
pub fn zoom_crop(image: &RasterImage, zoom: f32) -> Result<RasterImage> {
    let (w, h) = image.dimensions();
    let zoomed_w = ((w as f64 * zoom as f64).round() as u32).max(w);
    let zoomed_h = ((h as f64 * zoom as f64).round() as u32).max(h);
    let zoomed = processor::resize_exact(image, zoomed_w, zoomed_h)?;

    let left = ((zoomed_w - w) as f64 / 2.0).round() as u32;
    let top = ((zoomed_h - h) as f64 / 2.0).round() as u32;
    debug!(zoomed_w, zoomed_h, left, top, "Cropping zoomed canvas");
    RasterImage::from_rgba(imageops::crop_imm(zoomed.as_rgba(), left, top, w, h).to_image())
}

// -- Finishing ----------------------------------------------------------------

/// Mild unsharp mask over the colour channels. Alpha is kept as is.
pub fn sharpen(image: &RasterImage) -> Result<RasterImage> {
    let mut sharpened = imageops::unsharpen(image.as_rgba(), SHARPEN_SIGMA, SHARPEN_THRESHOLD);
    for (out, src) in sharpened.pixels_mut().zip(image.as_rgba().pixels()) {
        out.0[3] = src.0[3];
    }
    RasterImage::from_rgba(sharpened)
}

/// Stretch the luma range so the darkest and brightest 1% of visible
/// pixels reach 0 and 255. Flat images are returned unchanged.
pub fn normalize(image: &RasterImage) -> RasterImage {
    let mut histogram = [0u64; 256];
    for px in image.as_rgba().pixels() {
        if px.0[3] > 0 {
            histogram[luma_bin(*px)] += 1;
        }
    }
    let total: u64 = histogram.iter().sum();
    let Some((low, high)) = luma_bounds(&histogram, total) else {
        return image.clone();
    };

    let scale = 255.0 / (high - low) as f32;
    let mut out = image.clone();
    out.map_pixels(|px| {
        let [r, g, b, a] = px.0;
        let stretch = |v: u8| ((v as f32 - low as f32) * scale).round().clamp(0.0, 255.0) as u8;
        Rgba([stretch(r), stretch(g), stretch(b), a])
    });
    debug!(low, high, "Luma range normalized");
    out
}

fn luma_bin(px: Rgba<u8>) -> usize {
    let [r, g, b, _] = px.0;
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
        .round()
        .clamp(0.0, 255.0) as usize
}

/// Luma values at the lower and upper clip percentiles, if they differ.
fn luma_bounds(histogram: &[u64; 256], total: u64) -> Option<(usize, usize)> {
    if total == 0 {
        return None;
    }
    let clip = (total as f64 * NORMALIZE_CLIP) as u64;

    let mut seen = 0u64;
    let low = histogram.iter().position(|&count| {
        seen += count;
        seen > clip
    })?;

    let mut seen = 0u64;
    let high = 255 - histogram.iter().rev().position(|&count| {
        seen += count;
        seen > clip
    })?;

    (high > low).then_some((low, high))
}
