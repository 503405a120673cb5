//! Closed-form waveform field.
//!
//! Every value here is a pure function of line index, sample x and clock
//! time. Nothing is cached between frames.

use super::params::FieldConfig;
use super::projector::PerspectiveProjector;
use super::viewport::ViewportState;

/// Depth units scrolled per unit of clock time.
const DEPTH_SCROLL_RATE: f64 = 100.0;

const PRIMARY_SPATIAL_FREQ: f64 = 0.003;
const PRIMARY_TEMPORAL_FREQ: f64 = 5.0;
const LINE_PHASE_STEP: f64 = 0.5;

const RIPPLE_SPATIAL_FREQ: f64 = 0.01;
const RIPPLE_AMPLITUDE: f64 = 20.0;

/// One sampled point of one line for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    /// Source x before projection.
    pub x: f64,
    pub y_offset: f64,
    /// Synthetic depth.
    pub z: f64,
    pub scale: f64,
    pub x2d: f64,
    pub y2d: f64,
    pub alpha: f64,
}

/// Generator for the scrolling, breathing field of waveform lines.
#[derive(Debug, Clone)]
pub struct WaveformField {
    line_count: u32,
    gap: f64,
    amplitude: f64,
    sample_step: u32,
    max_alpha: f64,
    projector: PerspectiveProjector,
}

impl WaveformField {
    pub fn new(config: &FieldConfig) -> Self {
        Self {
            line_count: config.line_count,
            gap: config.gap,
            amplitude: config.amplitude,
            sample_step: config.sample_step.max(1),
            max_alpha: config.max_alpha,
            projector: PerspectiveProjector::new(config.perspective),
        }
    }

    pub fn line_count(&self) -> u32 {
        self.line_count
    }

    pub fn projector(&self) -> &PerspectiveProjector {
        &self.projector
    }

    /// Vertical wave offset: a time-modulated primary wave plus a fixed ripple.
    ///
    /// The primary amplitude breathes with `sin(t)` and passes through zero.
    #[inline]
    pub fn y_offset(&self, line: u32, x: f64, t: f64) -> f64 {
        let phase = line as f64 * LINE_PHASE_STEP;
        let primary = (x * PRIMARY_SPATIAL_FREQ + t * PRIMARY_TEMPORAL_FREQ + phase).sin()
            * self.amplitude
            * t.sin();
        let ripple = (x * RIPPLE_SPATIAL_FREQ + t).cos() * RIPPLE_AMPLITUDE;
        primary + ripple
    }

    /// Synthetic depth of a line, wrapped into a window of width `gap`.
    #[inline]
    pub fn depth(&self, line: u32, t: f64) -> f64 {
        line as f64 * self.gap - (t * DEPTH_SCROLL_RATE) % self.gap
    }

    /// Stroke alpha of a line. Depends on the index only.
    #[inline]
    pub fn alpha(&self, line: u32) -> f64 {
        (line as f64 / self.line_count as f64) * self.max_alpha
    }

    /// Full sample for `(line, x, t)` on the given viewport.
    pub fn sample(&self, line: u32, x: f64, t: f64, viewport: &ViewportState) -> SamplePoint {
        let y_offset = self.y_offset(line, x, t);
        let z = self.depth(line, t);
        let scale = self.projector.scale(z);
        let (x2d, y2d) = self.projector.project(x, y_offset, scale, viewport);
        SamplePoint {
            x,
            y_offset,
            z,
            scale,
            x2d,
            y2d,
            alpha: self.alpha(line),
        }
    }

    /// Sample x positions: from `-width` up to, but excluding, `width`.
    pub fn sample_xs(&self, viewport: &ViewportState) -> impl Iterator<Item = f64> {
        let half_span = viewport.width() as i64;
        (-half_span..half_span)
            .step_by(self.sample_step as usize)
            .map(|x| x as f64)
    }

    /// Number of samples per line on this viewport.
    pub fn samples_per_line(&self, viewport: &ViewportState) -> usize {
        let span = 2 * viewport.width() as usize;
        span.div_ceil(self.sample_step as usize)
    }

    /// All samples of one line at time `t`, left to right.
    pub fn polyline<'a>(
        &'a self,
        line: u32,
        t: f64,
        viewport: &'a ViewportState,
    ) -> impl Iterator<Item = SamplePoint> + 'a {
        self.sample_xs(viewport)
            .map(move |x| self.sample(line, x, t, viewport))
    }
}
