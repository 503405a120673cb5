//! Integration tests for the waveform field model.

mod fixtures;

use fixtures::{assert_close, reference_viewport, test_config};
use waveform_field::{AnimationClock, ConfigError, FieldConfig, ViewportState, WaveformField};

// ==================== Worked Examples ====================

#[test]
fn test_first_line_center_sample_at_time_zero() {
    let field = WaveformField::new(&test_config());
    let viewport = reference_viewport();
    let point = field.sample(0, 0.0, 0.0, &viewport);

    assert_close(point.y_offset, 20.0, 1e-12);
    assert_close(point.z, 0.0, 1e-12);
    assert_close(point.scale, 300.0 / 700.0, 1e-12);
    assert_close(point.x2d, 400.0, 1e-12);
    assert_close(point.y2d, 417.142857, 1e-5);
    assert_eq!(point.alpha, 0.0);
}

#[test]
fn test_second_line_sits_one_gap_deeper() {
    let field = WaveformField::new(&test_config());
    let viewport = reference_viewport();
    let first = field.sample(0, 0.0, 0.0, &viewport);
    let second = field.sample(1, 0.0, 0.0, &viewport);

    assert_close(second.z, 40.0, 1e-12);
    assert_close(second.scale, 300.0 / 740.0, 1e-12);
    assert!(second.scale < first.scale);
}

#[test]
fn test_line_phase_decorrelates_neighbours() {
    let field = WaveformField::new(&test_config());
    // sin(t) vanishes at t = 0, so compare once the primary wave is live.
    let t = 1.0;
    let a = field.y_offset(0, 0.0, t);
    let b = field.y_offset(1, 0.0, t);
    assert!((a - b).abs() > 1.0, "lines 0 and 1 overlap: {} vs {}", a, b);
}

#[test]
fn test_primary_wave_vanishes_at_time_zero() {
    let field = WaveformField::new(&test_config());
    for line in [0, 7, 39] {
        for x in [-400.0, 0.0, 123.0] {
            let expected = (x * 0.01_f64).cos() * 20.0;
            assert_close(field.y_offset(line, x, 0.0), expected, 1e-12);
        }
    }
}

// ==================== Field Properties ====================

#[test]
fn test_sampling_is_deterministic() {
    let config = test_config();
    let viewport = reference_viewport();
    let a = WaveformField::new(&config);
    let b = WaveformField::new(&config);

    for line in 0..config.line_count {
        for t in [0.0, 0.002, 0.5, 17.3] {
            let left: Vec<_> = a.polyline(line, t, &viewport).collect();
            let right: Vec<_> = b.polyline(line, t, &viewport).collect();
            assert_eq!(left, right);
        }
    }
}

#[test]
fn test_alpha_increases_with_line_index() {
    let config = test_config();
    let field = WaveformField::new(&config);

    assert_eq!(field.alpha(0), 0.0);
    for line in 1..config.line_count {
        assert!(field.alpha(line) > field.alpha(line - 1));
        assert!(field.alpha(line) < config.max_alpha);
    }
}

#[test]
fn test_alpha_does_not_depend_on_time_or_position() {
    let field = WaveformField::new(&test_config());
    let viewport = reference_viewport();
    let alphas: Vec<f64> = [0.0, 3.0, 250.0]
        .iter()
        .flat_map(|&t| field.polyline(12, t, &viewport).map(|p| p.alpha))
        .collect();
    assert!(alphas.iter().all(|&a| a == field.alpha(12)));
}

#[test]
fn test_scale_stays_positive_over_depth_window() {
    let config = test_config();
    let field = WaveformField::new(&config);

    let mut t = 0.0;
    while t < 200.0 {
        for line in 0..config.line_count {
            let z = field.depth(line, t);
            let upper = line as f64 * config.gap;
            assert!(z <= upper && z > upper - config.gap, "z={} out of window", z);

            let scale = field.projector().scale(z);
            assert!(scale.is_finite() && scale > 0.0);
        }
        t += 0.37;
    }
}

#[test]
fn test_depth_scroll_wraps_every_gap() {
    let field = WaveformField::new(&test_config());
    // 100 depth units per time unit, gap 40: period is 0.4.
    assert_close(field.depth(5, 0.1), field.depth(5, 0.5), 1e-9);
    assert_close(field.depth(5, 0.1), 200.0 - 10.0, 1e-9);
}

#[test]
fn test_samples_cover_twice_the_width() {
    let field = WaveformField::new(&test_config());
    let viewport = reference_viewport();
    let xs: Vec<f64> = field.sample_xs(&viewport).collect();

    assert_eq!(xs.len(), 80);
    assert_eq!(field.samples_per_line(&viewport), 80);
    assert_eq!(xs.first(), Some(&-800.0));
    assert_eq!(xs.last(), Some(&780.0));
}

#[test]
fn test_samples_on_uneven_width() {
    let field = WaveformField::new(&test_config());
    let viewport = ViewportState::from_client(105, 50);
    let count = field.sample_xs(&viewport).count();
    assert_eq!(count, field.samples_per_line(&viewport));
    assert_eq!(count, 11);
}

// ==================== Viewport and Clock ====================

#[test]
fn test_degenerate_viewport_is_clamped() {
    let viewport = ViewportState::from_client(0, -20);
    assert_eq!((viewport.width(), viewport.height()), (1, 1));

    let field = WaveformField::new(&test_config());
    for point in field.polyline(3, 1.0, &viewport) {
        assert!(point.x2d.is_finite() && point.y2d.is_finite());
    }
}

#[test]
fn test_clock_advances_by_speed_per_frame() {
    let mut clock = AnimationClock::new(0.002);
    for _ in 0..500 {
        clock.advance();
    }
    assert_close(clock.time(), 1.0, 1e-9);
}

// ==================== Configuration ====================

#[test]
fn test_partial_json_uses_defaults() {
    let config = FieldConfig::from_json_str(r#"{ "line_count": 12, "stroke_color": [0, 255, 136] }"#)
        .unwrap();
    assert_eq!(config.line_count, 12);
    assert_eq!(config.stroke_color, [0, 255, 136]);
    assert_eq!(config.gap, 40.0);
    assert_eq!(config.perspective, 300.0);
}

#[test]
#[cfg(not(target_arch = "wasm32"))]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("field.json");
    let config = FieldConfig {
        amplitude: 80.0,
        ..test_config()
    };
    std::fs::write(&path, config.to_json_string().unwrap()).unwrap();

    assert_eq!(FieldConfig::load(&path).unwrap(), config);
}

#[test]
fn test_projection_singularity_is_rejected() {
    let config = FieldConfig {
        perspective: 10.0,
        gap: 500.0,
        ..test_config()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::DegenerateProjection { .. })
    ));
}
