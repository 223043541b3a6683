mod common;

use approx::assert_abs_diff_eq;
use ndarray::{s, Array3};

use kanade_core::engine::config::{EngineConfig, SolverVariant, TransformMode};
use kanade_core::engine::registration::RegistrationEngine;
use kanade_core::engine::types::FrameStatus;
use kanade_core::error::KanadeError;
use kanade_core::frame::{ImageFormat, MotionEstimate, PixelFormat};
use kanade_core::pyramid::{GradientTerm, ReferencePolicy};
use kanade_core::transform::Accumulator;

use common::{
    interior_rms, rich_texture, shifted_frame, shifted_frame_u8, shifted_rgb_frame, texture,
};

const SIZE: usize = 128;

fn global_config() -> EngineConfig {
    EngineConfig {
        seed_frames: 1,
        ..EngineConfig::stabilise()
    }
}

fn dense_config() -> EngineConfig {
    EngineConfig {
        seed_frames: 1,
        reference: ReferencePolicy::Snapshot,
        ..EngineConfig::dewarp()
    }
}

/// Feed `frames` through a fresh engine, returning every output and the last outcome's estimate.
fn run_f32(
    config: EngineConfig,
    pixel_format: PixelFormat,
    frames: &[Array3<f32>],
) -> (Vec<Array3<f32>>, MotionEstimate) {
    let (h, w, _) = frames[0].dim();
    let mut engine = RegistrationEngine::new(w, h, pixel_format, config).unwrap();
    let mut outputs = Vec::new();
    let mut estimate = MotionEstimate::default();
    for frame in frames {
        let mut output = Array3::<f32>::zeros(frame.dim());
        let outcome = engine.process_frame(frame.view(), output.view_mut()).unwrap();
        estimate = outcome.estimate;
        outputs.push(output);
    }
    (outputs, estimate)
}

// ---------------------------------------------------------------------------
// Seeding and pass-through
// ---------------------------------------------------------------------------

#[test]
fn test_seed_frames_pass_through() {
    let config = EngineConfig::stabilise();
    let mut engine = RegistrationEngine::new(64, 64, PixelFormat::MonoU8, config).unwrap();
    let input = shifted_frame_u8(texture, 64, 64, 0.0, 0.0);

    for expected_index in 0..2u64 {
        let mut output = Array3::<u8>::zeros((64, 64, 1));
        let outcome = engine
            .process_frame(input.view(), output.view_mut())
            .unwrap();
        assert_eq!(outcome.frame_index, expected_index);
        assert_eq!(outcome.status, FrameStatus::Skipped);
        assert!(outcome.is_skipped());
        assert_eq!(outcome.estimate, MotionEstimate::zero_global());
        assert_eq!(output, input);
    }

    let mut output = Array3::<u8>::zeros((64, 64, 1));
    let outcome = engine
        .process_frame(input.view(), output.view_mut())
        .unwrap();
    assert_eq!(outcome.status, FrameStatus::Processed);
    assert_eq!(engine.frames_processed(), 3);
}

#[test]
fn test_no_transform_is_bit_exact() {
    let config = EngineConfig {
        transform: TransformMode::NoTransform,
        ..global_config()
    };
    let mut engine = RegistrationEngine::new(SIZE, SIZE, PixelFormat::MonoU8, config).unwrap();
    for i in 0..4 {
        let input = shifted_frame_u8(texture, SIZE, SIZE, i as f32 * 0.7, 0.0);
        let mut output = Array3::<u8>::zeros((SIZE, SIZE, 1));
        engine
            .process_frame(input.view(), output.view_mut())
            .unwrap();
        assert_eq!(output, input);
    }
}

#[test]
fn test_reset_restarts_seeding() {
    let mut engine =
        RegistrationEngine::new(64, 64, PixelFormat::MonoF32, global_config()).unwrap();
    let input = shifted_frame(texture, 64, 64, 0.0, 0.0);
    let mut output = Array3::<f32>::zeros((64, 64, 1));
    for _ in 0..3 {
        engine
            .process_frame(input.view(), output.view_mut())
            .unwrap();
    }
    engine.reset();
    assert_eq!(engine.frames_processed(), 0);
    assert_eq!(engine.accumulated(), (0.0, 0.0));
    let outcome = engine
        .process_frame(input.view(), output.view_mut())
        .unwrap();
    assert!(outcome.is_skipped());
}

// ---------------------------------------------------------------------------
// Format contract
// ---------------------------------------------------------------------------

#[test]
fn test_image_format_equality() {
    let a = ImageFormat::new(64, 48, PixelFormat::MonoU8);
    assert_eq!(a, ImageFormat::new(64, 48, PixelFormat::MonoU8));
    assert_ne!(a, ImageFormat::new(64, 48, PixelFormat::MonoF32));
    assert_ne!(a, ImageFormat::new(48, 64, PixelFormat::MonoU8));
    assert_eq!(a.shape(), (48, 64, 1));
    assert_eq!(ImageFormat::new(4, 2, PixelFormat::RgbU8).sample_count(), 24);
}

#[test]
fn test_mismatched_frame_rejected_without_side_effects() {
    let mut engine =
        RegistrationEngine::new(64, 64, PixelFormat::MonoF32, global_config()).unwrap();

    let wrong_size = Array3::<f32>::zeros((64, 63, 1));
    let mut output = Array3::<f32>::from_elem((64, 63, 1), 3.0);
    let err = engine
        .process_frame(wrong_size.view(), output.view_mut())
        .unwrap_err();
    assert!(matches!(err, KanadeError::FormatMismatch { .. }));
    assert!(output.iter().all(|&v| v == 3.0));

    let wrong_kind = Array3::<u8>::zeros((64, 64, 1));
    let mut output = Array3::<u8>::from_elem((64, 64, 1), 9);
    let err = engine
        .process_frame(wrong_kind.view(), output.view_mut())
        .unwrap_err();
    assert!(matches!(err, KanadeError::FormatMismatch { .. }));
    assert!(output.iter().all(|&v| v == 9));

    let two_planes = Array3::<f32>::zeros((64, 64, 2));
    let mut output = Array3::<f32>::zeros((64, 64, 2));
    let err = engine
        .process_frame(two_planes.view(), output.view_mut())
        .unwrap_err();
    assert!(matches!(err, KanadeError::UnsupportedPixelFormat(_)));

    // Good input, wrong output shape: the input must not be consumed either.
    let good = Array3::<f32>::zeros((64, 64, 1));
    let mut small = Array3::<f32>::zeros((32, 32, 1));
    assert!(engine.process_frame(good.view(), small.view_mut()).is_err());
    assert_eq!(engine.frames_processed(), 0);
}

#[test]
fn test_tiny_frames_rejected() {
    let err = RegistrationEngine::new(3, 64, PixelFormat::MonoU8, EngineConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, KanadeError::InvalidDimensions { .. }));

    let config = EngineConfig {
        num_levels: Some(6),
        ..EngineConfig::default()
    };
    let err = RegistrationEngine::new(64, 64, PixelFormat::MonoU8, config)
        .err()
        .unwrap();
    assert!(matches!(err, KanadeError::InvalidDimensions { .. }));
}

#[test]
fn test_depth_beyond_filter_margins_rejected() {
    // Level 4 of a 64x64 pyramid would be 4x4, fed from an 8-wide level the
    // 12-tap downsample never writes.
    for levels in [3, 5] {
        let config = EngineConfig {
            num_levels: Some(levels),
            ..EngineConfig::stabilise()
        };
        let err = RegistrationEngine::new(64, 64, PixelFormat::MonoF32, config)
            .err()
            .unwrap();
        assert!(matches!(err, KanadeError::InvalidDimensions { .. }));
    }

    let config = EngineConfig {
        num_levels: Some(2),
        ..EngineConfig::stabilise()
    };
    let engine = RegistrationEngine::new(64, 64, PixelFormat::MonoF32, config).unwrap();
    assert_eq!(engine.pyramid().num_levels(), 2);
}

#[test]
fn test_incompatible_transform_rejected() {
    let mut engine =
        RegistrationEngine::new(64, 64, PixelFormat::MonoF32, global_config()).unwrap();
    assert!(engine.set_transform_mode(TransformMode::DenseDewarp).is_err());
    assert!(engine.set_transform_mode(TransformMode::IntegerShift).is_ok());
    assert_eq!(engine.config().transform, TransformMode::IntegerShift);

    let mut dense = RegistrationEngine::new(64, 64, PixelFormat::MonoF32, dense_config()).unwrap();
    assert!(dense.set_transform_mode(TransformMode::SubpixelShift).is_err());
    assert!(dense.set_transform_mode(TransformMode::FlowMagnitude).is_ok());
}

#[test]
fn test_process_slices() {
    let mut engine =
        RegistrationEngine::new(64, 32, PixelFormat::MonoU8, global_config()).unwrap();
    let input = vec![0u8; 64 * 32];
    let mut short = vec![0u8; 64 * 31];
    let err = engine.process_slices(&input, &mut short).unwrap_err();
    assert!(matches!(
        err,
        KanadeError::BufferSize {
            expected: 2048,
            actual: 1984
        }
    ));

    let mut output = vec![1u8; 64 * 32];
    let outcome = engine.process_slices(&input, &mut output).unwrap();
    assert!(outcome.is_skipped());
    assert!(output.iter().all(|&v| v == 0));
}

#[test]
fn test_reinitialize_switches_format() {
    let mut engine =
        RegistrationEngine::new(64, 64, PixelFormat::MonoF32, global_config()).unwrap();
    let format = ImageFormat::new(96, 80, PixelFormat::RgbU8);
    engine.reinitialize(format).unwrap();
    assert_eq!(engine.format(), format);
    assert_eq!(engine.config().seed_frames, 1);

    let input = Array3::<u8>::zeros((80, 96, 3));
    let mut output = Array3::<u8>::zeros((80, 96, 3));
    assert!(engine.process_frame(input.view(), output.view_mut()).is_ok());
}

// ---------------------------------------------------------------------------
// Global estimation
// ---------------------------------------------------------------------------

#[test]
fn test_global_zero_motion() {
    let frame = shifted_frame(texture, SIZE, SIZE, 0.0, 0.0);
    let (outputs, estimate) = run_f32(
        global_config(),
        PixelFormat::MonoF32,
        &[frame.clone(), frame.clone(), frame.clone()],
    );
    let (hx, hy) = estimate.mean();
    assert_abs_diff_eq!(hx, 0.0, epsilon = 1e-4);
    assert_abs_diff_eq!(hy, 0.0, epsilon = 1e-4);
    assert!(interior_rms(&outputs[2], &frame, 4, 0) < 1e-5);
}

#[test]
fn test_global_recovers_known_shift() {
    let reference = shifted_frame(texture, SIZE, SIZE, 0.0, 0.0);
    let moved = shifted_frame(texture, SIZE, SIZE, 1.3, -0.7);
    let (outputs, estimate) = run_f32(
        global_config(),
        PixelFormat::MonoF32,
        &[reference.clone(), moved],
    );

    let MotionEstimate::Global { hx, hy } = estimate else {
        panic!("expected a global estimate");
    };
    assert_abs_diff_eq!(hx, 1.3, epsilon = 0.1);
    assert_abs_diff_eq!(hy, -0.7, epsilon = 0.1);

    // The corrected frame lines up with the reference.
    assert!(interior_rms(&outputs[1], &reference, 8, 0) < 0.02);
}

/// Run `[reference, reference, moved]` through an engine built from `config` untouched.
fn preset_estimate(
    config: EngineConfig,
    scene: fn(f32, f32) -> f32,
    width: usize,
    height: usize,
    shift: (f32, f32),
) -> (Vec<Array3<f32>>, MotionEstimate) {
    let reference = shifted_frame(scene, width, height, 0.0, 0.0);
    let moved = shifted_frame(scene, width, height, shift.0, shift.1);
    run_f32(
        config,
        PixelFormat::MonoF32,
        &[reference.clone(), reference, moved],
    )
}

#[test]
fn test_stabilise_preset_recovers_shifts() {
    let shifts = [(0.3, 0.2), (3.5, -3.2), (-3.8, 2.6)];
    for (width, height) in [(SIZE, SIZE), (192, 128)] {
        for shift in shifts {
            let (outputs, estimate) =
                preset_estimate(EngineConfig::stabilise(), texture, width, height, shift);
            let MotionEstimate::Global { hx, hy } = estimate else {
                panic!("expected a global estimate");
            };
            assert!(
                (hx - shift.0).abs() < 0.1 && (hy - shift.1).abs() < 0.1,
                "{width}x{height} shift {shift:?}: estimated ({hx}, {hy})"
            );

            let reference = shifted_frame(texture, width, height, 0.0, 0.0);
            assert!(interior_rms(&outputs[2], &reference, 8, 0) < 0.02);
        }
    }
}

#[test]
fn test_stabilise_preset_depth_keeps_coarsest_level_usable() {
    let engine =
        RegistrationEngine::new(SIZE, SIZE, PixelFormat::MonoF32, EngineConfig::stabilise())
            .unwrap();
    let pyramid = engine.pyramid();
    assert_eq!(pyramid.num_levels(), 3);
    let coarsest = pyramid.level(pyramid.num_levels() - 1);
    let (rows, cols) = coarsest.interior();
    assert!(rows.len() >= 16 && cols.len() >= 16);
}

#[test]
fn test_dewarp_preset_recovers_uniform_shift() {
    for (width, height) in [(SIZE, SIZE), (192, 128)] {
        let shift = (1.0, -0.5);
        let (outputs, estimate) =
            preset_estimate(EngineConfig::dewarp(), rich_texture, width, height, shift);
        let MotionEstimate::Dense { hx, hy } = estimate else {
            panic!("expected a dense estimate");
        };
        let centre = s![32..height - 32, 32..width - 32];
        let mean_x = hx.slice(centre).mean().unwrap();
        let mean_y = hy.slice(centre).mean().unwrap();
        assert!(
            (mean_x - shift.0).abs() < 0.3 && (mean_y - shift.1).abs() < 0.3,
            "{width}x{height}: mean flow ({mean_x}, {mean_y})"
        );

        let reference = shifted_frame(rich_texture, width, height, 0.0, 0.0);
        let moved = shifted_frame(rich_texture, width, height, shift.0, shift.1);
        let before = interior_rms(&moved, &reference, 32, 0);
        let after = interior_rms(&outputs[2], &reference, 32, 0);
        assert!(after < before * 0.5, "dewarp did not reduce error: {after} vs {before}");
    }
}

#[test]
fn test_global_reciprocal_term() {
    let config = EngineConfig {
        gradient_term: GradientTerm::Reciprocal,
        ..global_config()
    };
    let frames = [
        shifted_frame(texture, SIZE, SIZE, 0.0, 0.0),
        shifted_frame(texture, SIZE, SIZE, -0.8, 0.6),
    ];
    let (_, estimate) = run_f32(config, PixelFormat::MonoF32, &frames);
    let (hx, hy) = estimate.mean();
    assert_abs_diff_eq!(hx, -0.8, epsilon = 0.2);
    assert_abs_diff_eq!(hy, 0.6, epsilon = 0.2);
}

#[test]
fn test_global_u8_frames() {
    let mut engine =
        RegistrationEngine::new(SIZE, SIZE, PixelFormat::MonoU8, global_config()).unwrap();
    let mut output = Array3::<u8>::zeros((SIZE, SIZE, 1));
    for (sx, sy) in [(0.0, 0.0), (2.0, 1.0)] {
        let input = shifted_frame_u8(texture, SIZE, SIZE, sx, sy);
        engine
            .process_frame(input.view(), output.view_mut())
            .unwrap();
    }
    let (hx, hy) = engine.latest_estimate().mean();
    assert_abs_diff_eq!(hx, 2.0, epsilon = 0.15);
    assert_abs_diff_eq!(hy, 1.0, epsilon = 0.15);
}

#[test]
fn test_skipped_levels_still_estimate() {
    let config = EngineConfig {
        num_levels: Some(3),
        skip_finest_levels: 1,
        ..global_config()
    };
    let frames = [
        shifted_frame(texture, SIZE, SIZE, 0.0, 0.0),
        shifted_frame(texture, SIZE, SIZE, 2.0, -2.0),
    ];
    let (_, estimate) = run_f32(config, PixelFormat::MonoF32, &frames);
    let (hx, hy) = estimate.mean();
    assert_abs_diff_eq!(hx, 2.0, epsilon = 0.3);
    assert_abs_diff_eq!(hy, -2.0, epsilon = 0.3);
}

#[test]
fn test_rgb_frames_register_every_channel() {
    let reference = shifted_rgb_frame(texture, SIZE, SIZE, 0.0, 0.0);
    let moved = shifted_rgb_frame(texture, SIZE, SIZE, -1.0, 1.5);
    let (outputs, estimate) = run_f32(
        global_config(),
        PixelFormat::RgbF32,
        &[reference.clone(), moved],
    );
    let (hx, hy) = estimate.mean();
    assert_abs_diff_eq!(hx, -1.0, epsilon = 0.1);
    assert_abs_diff_eq!(hy, 1.5, epsilon = 0.1);
    for c in 0..3 {
        assert!(interior_rms(&outputs[1], &reference, 8, c) < 0.02);
    }
}

// ---------------------------------------------------------------------------
// Accumulation and output modes
// ---------------------------------------------------------------------------

#[test]
fn test_steady_pan_accumulates() {
    let frames: Vec<_> = (0..3)
        .map(|i| shifted_frame(texture, SIZE, SIZE, i as f32, 0.0))
        .collect();
    let mut engine =
        RegistrationEngine::new(SIZE, SIZE, PixelFormat::MonoF32, global_config()).unwrap();
    let mut output = Array3::<f32>::zeros((SIZE, SIZE, 1));
    let mut last = None;
    for frame in &frames {
        last = Some(
            engine
                .process_frame(frame.view(), output.view_mut())
                .unwrap(),
        );
    }
    let (sum_x, _) = engine.accumulated();
    assert_abs_diff_eq!(sum_x, 2.0, epsilon = 0.2);
    let correction = last.unwrap().correction;
    assert_abs_diff_eq!(correction.0, -sum_x);

    // Stabilised output matches the first frame.
    assert!(interior_rms(&output, &frames[0], 8, 0) < 0.02);
}

#[test]
fn test_burn_bounds_accumulated_drift() {
    let mut acc = Accumulator::new(0.5, 0.9);
    for _ in 0..200 {
        acc.update(1.0, -1.0);
        let (x, y) = acc.sum();
        assert!(x.abs() <= 1.0 + 1e-5);
        assert!(y.abs() <= 9.0 + 1e-4);
    }
    let (x, y) = acc.sum();
    assert_abs_diff_eq!(x, 1.0, epsilon = 1e-4);
    assert_abs_diff_eq!(y, -9.0, epsilon = 1e-3);
}

#[test]
fn test_burn_decays_noisy_estimates() {
    // Zero-mean estimates in [-0.1, 0.1] from a fixed LCG.
    let mut state = 0x2545_f491u32;
    let mut noise = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state >> 8) as f32 / (1u32 << 24) as f32 * 0.2 - 0.1
    };

    let burn = 0.9;
    let bound = 0.1 * burn / (1.0 - burn);
    let mut acc = Accumulator::new(burn, burn);
    let mut peak = 0.0f32;
    for _ in 0..500 {
        acc.update(noise(), noise());
        let (x, y) = acc.sum();
        assert!(x.abs() <= bound + 1e-4 && y.abs() <= bound + 1e-4);
        peak = peak.max(x.abs()).max(y.abs());
    }
    // A random walk would wander well past the bound; burn keeps it close to zero.
    assert!(peak < bound);

    for _ in 0..100 {
        acc.update(0.0, 0.0);
    }
    let (x, y) = acc.sum();
    assert!(x.abs() < 1e-3 && y.abs() < 1e-3);
}

#[test]
fn test_set_burn_validates() {
    let mut engine =
        RegistrationEngine::new(64, 64, PixelFormat::MonoF32, global_config()).unwrap();
    assert!(engine.set_burn(0.0, 1.0).is_err());
    assert!(engine.set_burn(0.95, 0.8).is_ok());
    assert_eq!(engine.config().burn_x, 0.95);
}

#[test]
fn test_integer_shift_output() {
    let config = EngineConfig {
        transform: TransformMode::IntegerShift,
        ..global_config()
    };
    let reference = shifted_frame(texture, SIZE, SIZE, 0.0, 0.0);
    let moved = shifted_frame(texture, SIZE, SIZE, 3.0, -2.0);
    let (outputs, _) = run_f32(config, PixelFormat::MonoF32, &[reference.clone(), moved]);
    // Whole-pixel shift restores the reference exactly wherever it had a source.
    let out = outputs[1].slice(s![10..110, 10..110, ..]);
    let expected = reference.slice(s![10..110, 10..110, ..]);
    for (a, b) in out.iter().zip(expected.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
    }
}

#[test]
fn test_cropped_filtered_output_zeroes_outside_crop() {
    let config = EngineConfig {
        transform: TransformMode::CroppedFilteredSubpixelShift,
        ..global_config()
    };
    let mut engine = RegistrationEngine::new(100, 70, PixelFormat::MonoU8, config).unwrap();
    let crop = engine.pyramid().crop();
    assert_eq!((crop.y, crop.height), (1, 68));

    let input = shifted_frame_u8(texture, 100, 70, 0.0, 0.0);
    let mut output = Array3::<u8>::from_elem((70, 100, 1), 77);
    for _ in 0..2 {
        engine
            .process_frame(input.view(), output.view_mut())
            .unwrap();
    }
    assert!(output.slice(s![0, .., ..]).iter().all(|&v| v == 0));
    assert!(output.slice(s![69, .., ..]).iter().all(|&v| v == 0));
    assert_eq!(output[[35, 50, 0]], input[[35, 50, 0]]);
}

// ---------------------------------------------------------------------------
// Dense estimation
// ---------------------------------------------------------------------------

#[test]
fn test_dense_zero_motion() {
    let frame = shifted_frame(rich_texture, SIZE, SIZE, 0.0, 0.0);
    let (outputs, estimate) = run_f32(
        dense_config(),
        PixelFormat::MonoF32,
        &[frame.clone(), frame.clone(), frame.clone()],
    );
    let MotionEstimate::Dense { hx, hy } = estimate else {
        panic!("expected a dense estimate");
    };
    assert_eq!(hx.dim(), (SIZE, SIZE));
    assert!(hx.iter().chain(hy.iter()).all(|v| v.abs() < 1e-6));
    assert!(interior_rms(&outputs[2], &frame, 4, 0) < 1e-5);
}

#[test]
fn test_dense_recovers_uniform_shift() {
    let reference = shifted_frame(rich_texture, SIZE, SIZE, 0.0, 0.0);
    let moved = shifted_frame(rich_texture, SIZE, SIZE, 1.0, -0.5);
    let (outputs, estimate) = run_f32(
        dense_config(),
        PixelFormat::MonoF32,
        &[reference.clone(), moved],
    );
    let MotionEstimate::Dense { hx, hy } = estimate else {
        panic!("expected a dense estimate");
    };
    let centre = s![32..96, 32..96];
    let mean_x = hx.slice(centre).mean().unwrap();
    let mean_y = hy.slice(centre).mean().unwrap();
    assert_abs_diff_eq!(mean_x, 1.0, epsilon = 0.25);
    assert_abs_diff_eq!(mean_y, -0.5, epsilon = 0.25);

    let before = interior_rms(&shifted_frame(rich_texture, SIZE, SIZE, 1.0, -0.5), &reference, 32, 0);
    let after = interior_rms(&outputs[1], &reference, 32, 0);
    assert!(after < before * 0.5, "dewarp did not reduce error: {after} vs {before}");
}

#[test]
fn test_flow_magnitude_view() {
    let config = EngineConfig {
        transform: TransformMode::FlowMagnitude,
        flow_magnitude_scale: 0.5,
        ..dense_config()
    };
    let frames = [
        shifted_frame(rich_texture, SIZE, SIZE, 0.0, 0.0),
        shifted_frame(rich_texture, SIZE, SIZE, 1.0, -0.5),
    ];
    let (outputs, _) = run_f32(config, PixelFormat::MonoF32, &frames);
    let centre = outputs[1].slice(s![32..96, 32..96, 0]);
    let mean = centre.mean().unwrap();
    // |(1, -0.5)| * 0.5
    assert_abs_diff_eq!(mean, 0.559, epsilon = 0.15);
}

#[test]
fn test_dense_engine_reports_dense_estimate_while_seeding() {
    let config = dense_config();
    assert_eq!(config.solver, SolverVariant::Dense);
    let mut engine = RegistrationEngine::new(64, 64, PixelFormat::MonoU8, config).unwrap();
    let input = shifted_frame_u8(rich_texture, 64, 64, 0.0, 0.0);
    let mut output = Array3::<u8>::zeros((64, 64, 1));
    let outcome = engine
        .process_frame(input.view(), output.view_mut())
        .unwrap();
    assert!(outcome.is_skipped());
    assert!(matches!(outcome.estimate, MotionEstimate::Dense { .. }));
    assert_eq!(outcome.estimate.mean(), (0.0, 0.0));
}
