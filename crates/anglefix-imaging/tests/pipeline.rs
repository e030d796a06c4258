// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end behaviour of the angle-fixing pipeline on synthetic images.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anglefix_core::config::PipelineConfig;
use anglefix_core::error::{AngleFixError, Result};
use anglefix_core::types::EnhancePreset;
use anglefix_imaging::detect::corners::{corner_angle, harris_corners};
use anglefix_imaging::detect::gradient::GrayField;
use anglefix_imaging::detect::{DetectionCandidates, DetectionMethod};
use anglefix_imaging::image::processor;
use anglefix_imaging::{
    AngleFixPipeline, FillOutcome, RasterImage, detect, enhance, locate, rotate, synthesize,
};
use anglefix_remote::ImageExtender;
use image::{Rgba, RgbaImage};

// -- Fixtures -----------------------------------------------------------------

/// A busy but deterministic room-like image: two-tone walls with stripes.
fn room(width: u32, height: u32) -> RasterImage {
    RasterImage::from_rgba(RgbaImage::from_fn(width, height, |x, y| {
        let wall = if y < height / 2 { 150u8 } else { 95 };
        let stripe = ((x / 6) % 2) as u8 * 40;
        Rgba([wall + stripe / 2, wall, 120 + ((x + y) % 30) as u8, 255])
    }))
    .unwrap()
}

/// Route pipeline logs to the test harness; `RUST_LOG=debug` shows them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn png(img: &RasterImage) -> Vec<u8> {
    processor::encode_png(img).unwrap()
}

/// Fails every call the way a dropped connection would.
struct OfflineExtender {
    calls: Arc<AtomicUsize>,
}

impl ImageExtender for OfflineExtender {
    fn name(&self) -> &str {
        "offline"
    }

    fn extend(&self, _original: &[u8], _prompt: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AngleFixError::RemoteService("connection reset by peer".into()))
    }
}

/// Answers with bytes that are not an image.
struct GarbageExtender;

impl ImageExtender for GarbageExtender {
    fn name(&self) -> &str {
        "garbage"
    }

    fn extend(&self, _original: &[u8], _prompt: &str) -> Result<Vec<u8>> {
        Ok(b"<html>502 Bad Gateway</html>".to_vec())
    }
}

/// Answers with a fixed PNG.
struct ScriptedExtender {
    reply: Vec<u8>,
}

impl ImageExtender for ScriptedExtender {
    fn name(&self) -> &str {
        "scripted"
    }

    fn extend(&self, _original: &[u8], _prompt: &str) -> Result<Vec<u8>> {
        Ok(self.reply.clone())
    }
}

/// Four bright squares, one per quadrant, staggered so the quadrant
/// centroids slope far past the correction limit.
fn steep_corners() -> RasterImage {
    let mut img = RasterImage::filled(200, 200, Rgba([40, 40, 40, 255])).unwrap();
    for (left, top) in [(30, 74), (150, 10), (30, 174), (150, 110)] {
        for y in top..top + 20 {
            for x in left..left + 20 {
                img.set(x, y, Rgba([220, 220, 220, 255]));
            }
        }
    }
    img
}

/// What the pipeline must produce when the remote step is unavailable.
fn local_only(input: &RasterImage, angle: f32, config: &PipelineConfig) -> RasterImage {
    let rotated = rotate(input, angle, &config.rotation).unwrap();
    let regions = locate(&rotated.image);
    let (filled, _) = synthesize(&rotated.image, &regions, &config.fill);
    enhance(&filled, &config.enhance)
}

// -- Rotation -----------------------------------------------------------------

/// Verify that damped angles under the floor leave the image untouched.
#[test]
fn tiny_rotation_is_identity() {
    let img = room(64, 48);
    let config = PipelineConfig::default();
    // 0.16 × 0.3 = 0.048, under the 0.05 threshold.
    for angle in [0.0, 0.1, -0.16, 0.16] {
        let out = rotate(&img, angle, &config.rotation).unwrap();
        assert_eq!(out.applied, None);
        assert_eq!(out.image, img);
    }
}

// -- Locate and synthesize ------------------------------------------------------

/// Verify that an interior transparent hole is located as one region and filled.
#[test]
fn transparent_square_is_completely_filled() {
    init_tracing();
    let mut img = room(80, 80);
    for y in 30..50 {
        for x in 30..50 {
            img.set(x, y, Rgba([0, 0, 0, 0]));
        }
    }
    let regions = locate(&img);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].size, 400);

    let (filled, stats) = synthesize(&img, &regions, &PipelineConfig::default().fill);
    assert_eq!(filled.count_blank(), 0);
    assert_eq!(stats.remaining_blank, 0);
    assert_eq!(filled.dimensions(), (80, 80));
}

/// Verify that every corner a 15 degree turn exposes ends up filled.
#[test]
fn rotated_corners_are_completely_filled() {
    let img = room(120, 90);
    let config = PipelineConfig::default();
    let rotated = rotate(&img, 15.0, &config.rotation).unwrap();
    let regions = locate(&rotated.image);
    assert!(regions.len() >= 4, "expected the four exposed corners");

    let (filled, _) = synthesize(&rotated.image, &regions, &config.fill);
    assert_eq!(filled.count_blank(), 0);
}

/// Verify that regions under the size floor are not reported.
#[test]
fn small_regions_are_discarded() {
    let mut img = RasterImage::filled(40, 40, Rgba([180, 170, 160, 255])).unwrap();
    for (x, y) in [(5, 5), (6, 5), (5, 6), (6, 6)] {
        img.set(x, y, Rgba([0, 0, 0, 0]));
    }
    for y in 20..24 {
        for x in 20..24 {
            img.set(x, y, Rgba([0, 0, 0, 0]));
        }
    }
    let regions = locate(&img);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].size, 16);
}

/// Verify that blur compositing runs before the sweep and leaves nothing blank.
#[test]
fn blend_keeps_fill_complete() {
    let mut config = PipelineConfig::default();
    config.fill.blend = Some(Default::default());
    let img = room(100, 80);
    let rotated = rotate(&img, 12.0, &config.rotation).unwrap();
    let regions = locate(&rotated.image);
    let (filled, stats) = synthesize(&rotated.image, &regions, &config.fill);
    assert!(stats.blended_pixels > 0);
    assert_eq!(filled.count_blank(), 0);
}

/// Verify that the same seed gives the same pixels and statistics.
#[test]
fn synthesis_is_reproducible_for_a_seed() {
    let img = room(100, 80);
    let config = PipelineConfig::default();
    let rotated = rotate(&img, -14.0, &config.rotation).unwrap();
    let regions = locate(&rotated.image);
    let a = synthesize(&rotated.image, &regions, &config.fill);
    let b = synthesize(&rotated.image, &regions, &config.fill);
    assert_eq!(a, b);
}

// -- Detection ------------------------------------------------------------------

/// Verify that fusion clamps steep candidates to the correction limit.
#[test]
fn fused_angle_is_clamped() {
    let steep = DetectionCandidates {
        wall_lines: Some(40.0),
        corners: Some(22.0),
        orientation: None,
    };
    assert_eq!(steep.fuse(15.0), Some(15.0));

    let steep_negative = DetectionCandidates {
        wall_lines: Some(-40.0),
        corners: None,
        orientation: Some(-30.0),
    };
    assert_eq!(steep_negative.fuse(15.0), Some(-15.0));
}

/// Verify that extreme aspect ratios win regardless of pixel content.
#[test]
fn gross_orientation_short_circuits() {
    let config = PipelineConfig::default();

    for img in [room(50, 100), RasterImage::filled(50, 100, Rgba([0, 0, 0, 0])).unwrap()] {
        let d = detect(&img, &config.detector).unwrap();
        assert_eq!(d.angle, 90.0);
        assert_eq!(d.method, DetectionMethod::GrossPortrait);
    }
    for img in [room(300, 100), RasterImage::filled(300, 100, Rgba([255; 4])).unwrap()] {
        let d = detect(&img, &config.detector).unwrap();
        assert_eq!(d.angle, -90.0);
        assert_eq!(d.method, DetectionMethod::GrossPanorama);
    }
}

/// Verify that a strongly rotated room still yields a bounded correction.
#[test]
fn detected_angle_stays_within_limits() {
    let config = PipelineConfig::default();
    let img = room(160, 120);
    let rotated = rotate(&img, 20.0, &config.rotation).unwrap();
    let d = detect(&rotated.image, &config.detector).unwrap();
    assert!(d.angle.abs() <= config.detector.max_correction);
}

/// Verify that an image whose raw corner skew is steep comes out of the
/// detector clamped to the limit.
#[test]
fn steep_corner_skew_is_clamped_end_to_end() {
    let config = PipelineConfig::default();
    let img = steep_corners();

    let field = GrayField::from_raster(&img);
    let raw = corner_angle(&harris_corners(&field), 200, 200, 90.0).unwrap();
    assert!(raw.abs() > 20.0, "raw corner skew {raw} is not steep");

    let d = detect(&img, &config.detector).unwrap();
    assert_eq!(d.method, DetectionMethod::Fused);
    assert_eq!(d.candidates.corners, Some(15.0f32.copysign(raw)));
    assert!(d.angle.abs() <= config.detector.max_correction);
    assert_eq!(d.strength, 1);
}

/// Verify that an infinite override is refused rather than producing a
/// blank canvas.
#[test]
fn infinite_override_is_an_error() {
    let pipeline = AngleFixPipeline::new(PipelineConfig::default()).unwrap();
    let input = png(&room(64, 48));
    for angle in [f32::INFINITY, f32::NEG_INFINITY] {
        let err = pipeline.process(&input, Some(angle)).unwrap_err();
        assert!(matches!(err, AngleFixError::InvalidConfig(_)));
    }
}

// -- Photo fixer ----------------------------------------------------------------

/// Verify that the photo fixer leaves no transparent pixels on a busy room
/// and reports the expanded size.
#[test]
fn photo_fix_covers_the_rotated_room() {
    init_tracing();
    let pipeline = AngleFixPipeline::new(PipelineConfig::default()).unwrap();
    let out = pipeline.fix_photo(&png(&room(120, 90)), Some(-4.0), Some(15.0)).unwrap();
    assert!(out.report.rotated);
    assert_eq!(out.image.dimensions(), (out.report.width, out.report.height));
    assert!(out.report.width > 120 && out.report.height > 90);
    assert!(out.image.as_rgba().pixels().all(|p| p.0[3] > 0));
}

// -- Enhancement ----------------------------------------------------------------

/// Verify that both presets saturate at 0 and 255 instead of wrapping.
#[test]
fn enhancement_saturates_at_channel_limits() {
    for preset in [EnhancePreset::angle_fixer(), EnhancePreset::image_editor()] {
        let white = RasterImage::filled(8, 8, Rgba([255, 255, 255, 255])).unwrap();
        let black = RasterImage::filled(8, 8, Rgba([0, 0, 0, 255])).unwrap();
        assert!(enhance(&white, &preset).as_rgba().pixels().all(|p| p.0 == [255; 4]));
        assert!(enhance(&black, &preset).as_rgba().pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }
}

// -- Remote fallback ------------------------------------------------------------

/// Verify that a failing extender produces exactly the local-only result.
#[test]
fn remote_failure_matches_local_synthesis() {
    init_tracing();
    let img = room(96, 72);
    let input = png(&img);
    let config = PipelineConfig::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let pipeline = AngleFixPipeline::with_extender(
        config.clone(),
        Box::new(OfflineExtender {
            calls: Arc::clone(&calls),
        }),
    )
    .unwrap();

    let out = pipeline.process(&input, Some(10.0)).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(matches!(out.report.fill, FillOutcome::Local { .. }));

    let decoded = processor::decode(&input).unwrap();
    assert_eq!(out.image, local_only(&decoded, 10.0, &config));
}

/// Verify that a reply that is not an image falls back to local synthesis.
#[test]
fn undecodable_remote_reply_falls_back() {
    let img = room(96, 72);
    let input = png(&img);
    let config = PipelineConfig::default();
    let pipeline = AngleFixPipeline::with_extender(config.clone(), Box::new(GarbageExtender)).unwrap();

    let out = pipeline.process(&input, Some(-8.0)).unwrap();
    assert!(matches!(out.report.fill, FillOutcome::Local { .. }));
    let decoded = processor::decode(&input).unwrap();
    assert_eq!(out.image, local_only(&decoded, -8.0, &config));
}

/// Verify that a disabled remote step never reaches the extender.
#[test]
fn disabled_remote_is_never_called() {
    let mut config = PipelineConfig::default();
    config.remote.enabled = false;
    let calls = Arc::new(AtomicUsize::new(0));
    let pipeline = AngleFixPipeline::with_extender(
        config,
        Box::new(OfflineExtender {
            calls: Arc::clone(&calls),
        }),
    )
    .unwrap();
    pipeline.process(&png(&room(64, 48)), Some(10.0)).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// Verify that a remote image replaces the canvas, resized to fit it.
#[test]
fn remote_success_replaces_canvas_at_canvas_size() {
    init_tracing();
    let reply = png(&RasterImage::filled(40, 30, Rgba([200, 60, 60, 255])).unwrap());
    let pipeline = AngleFixPipeline::with_extender(
        PipelineConfig::default(),
        Box::new(ScriptedExtender { reply }),
    )
    .unwrap();

    let out = pipeline.process(&png(&room(96, 72)), Some(10.0)).unwrap();
    assert_eq!(out.image.dimensions(), (96, 72));
    assert_eq!(
        out.report.fill,
        FillOutcome::Remote {
            extender: "scripted".into()
        }
    );
}

/// Verify that the extender is only consulted when something needs filling.
#[test]
fn no_blank_regions_skips_the_remote_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pipeline = AngleFixPipeline::with_extender(
        PipelineConfig::default(),
        Box::new(OfflineExtender {
            calls: Arc::clone(&calls),
        }),
    )
    .unwrap();
    let out = pipeline.process(&png(&room(64, 48)), Some(0.0)).unwrap();
    assert_eq!(out.report.fill, FillOutcome::NotNeeded);
    assert_eq!(out.report.regions, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// -- Encoding -------------------------------------------------------------------

/// Verify that the encoded JPEG keeps the input size.
#[test]
fn encoded_output_keeps_input_dimensions() {
    let pipeline = AngleFixPipeline::new(PipelineConfig::default()).unwrap();
    let (jpeg, report) = pipeline.process_and_encode(&png(&room(90, 60)), Some(6.0)).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    let decoded = processor::decode(&jpeg).unwrap();
    assert_eq!(decoded.dimensions(), (90, 60));
    assert!(report.applied_rotation.is_some());
}

/// Verify that a saved PNG reads back pixel for pixel.
#[test]
fn saved_output_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixed.png");
    let pipeline = AngleFixPipeline::new(PipelineConfig::default()).unwrap();
    let out = pipeline.process(&png(&room(64, 48)), Some(9.0)).unwrap();
    processor::save(&out.image, &path, 95).unwrap();
    assert_eq!(processor::open(&path).unwrap(), out.image);
}
