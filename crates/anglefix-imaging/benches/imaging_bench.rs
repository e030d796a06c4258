// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the anglefix-imaging hot paths: angle detection on
// the downscaled analysis copy, and content synthesis over the corners a
// correction rotation exposes.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};

use anglefix_core::config::PipelineConfig;
use anglefix_imaging::{RasterImage, detect, locate, rotate, synthesize};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A 640x480 synthetic room: lighter upper wall, darker floor, and vertical
/// stripes so the detector and the complexity score have edges to work with.
fn synthetic_room() -> RasterImage {
    let (width, height) = (640u32, 480u32);
    let pixels = RgbaImage::from_fn(width, height, |x, y| {
        let base = if y < height * 2 / 3 { 170u8 } else { 90 };
        let stripe = if (x / 40) % 2 == 0 { 0 } else { 25 };
        Rgba([base + stripe, base, base.saturating_sub(20), 255])
    });
    RasterImage::from_rgba(pixels).expect("fixture dimensions are non-zero")
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Full detector run: aspect check, downscale to 400 px, three analyses.
fn bench_detect(c: &mut Criterion) {
    let image = synthetic_room();
    let config = PipelineConfig::default();

    c.bench_function("detect (640x480)", |b| {
        b.iter(|| {
            let detection = detect(black_box(&image), &config.detector);
            black_box(detection.map(|d| d.angle).ok());
        });
    });
}

/// Locate and synthesize the four corners exposed by a 4.5° rotation.
fn bench_synthesize(c: &mut Criterion) {
    let config = PipelineConfig::default();
    let canvas = rotate(&synthetic_room(), 15.0, &config.rotation)
        .expect("rotation of a valid fixture")
        .image;

    c.bench_function("locate + synthesize (640x480, 4.5°)", |b| {
        b.iter(|| {
            let regions = locate(black_box(&canvas));
            let (filled, stats) = synthesize(&canvas, &regions, &config.fill);
            black_box((filled.width(), stats.remaining_blank));
        });
    });
}

criterion_group!(benches, bench_detect, bench_synthesize);
criterion_main!(benches);
