//! Shared test fixtures for field and render loop tests.
#![allow(dead_code)]

use waveform_field::{FieldConfig, ManualHost, RecordingSurface, RenderLoop, ViewportState};

/// Reference field configuration.
pub fn test_config() -> FieldConfig {
    FieldConfig::default()
}

/// A few lines on a coarse grid, for tests that count draw calls.
pub fn small_config() -> FieldConfig {
    FieldConfig {
        line_count: 3,
        sample_step: 50,
        ..test_config()
    }
}

/// The 800x600 viewport used by the worked examples.
pub fn reference_viewport() -> ViewportState {
    ViewportState::from_client(800, 600)
}

/// A stopped loop on a manual host.
pub fn stopped_loop(config: FieldConfig) -> (ManualHost, RenderLoop<ManualHost, RecordingSurface>) {
    let host = ManualHost::new();
    let render_loop = RenderLoop::new(host.clone(), config).unwrap();
    (host, render_loop)
}

/// A running loop drawing onto a recording surface of the given client size.
pub fn running_loop(
    config: FieldConfig,
    width: i32,
    height: i32,
) -> (ManualHost, RenderLoop<ManualHost, RecordingSurface>, RecordingSurface) {
    let (host, mut render_loop) = stopped_loop(config);
    let surface = RecordingSurface::new(width, height);
    render_loop.start(surface.clone()).unwrap();
    (host, render_loop, surface)
}

/// Assert two floats agree to within `eps`.
pub fn assert_close(actual: f64, expected: f64, eps: f64) {
    assert!(
        (actual - expected).abs() <= eps,
        "expected {} to be within {} of {}",
        actual,
        eps,
        expected
    );
}
