//! Drawing surfaces and the line renderer.
//!
//! This module provides:
//! - `Surface` / `Context2d` traits modelled on a 2D canvas
//! - Line renderer that strokes the waveform field onto any context
//! - Recording surface that keeps a command log (tests, diagnostics)
//! - CPU raster surface backed by an RGBA image

pub mod line;
pub mod raster;
pub mod recording;

pub use line::LineRenderer;
pub use raster::{PixelContext, PixelSurface};
pub use recording::{DrawCommand, RecordingContext, RecordingSurface};

use std::fmt;

/// Straight-alpha colour with 8-bit channels and a fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb(rgb: [u8; 3], a: f64) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2], a)
    }

    /// Alpha clamped into `0.0..=1.0`.
    pub fn opacity(&self) -> f64 {
        self.a.clamp(0.0, 1.0)
    }
}

impl fmt::Display for Rgba {
    /// CSS `rgba(r, g, b, a)` notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Immediate-mode 2D drawing context.
pub trait Context2d {
    /// Reset a rectangle to fully transparent.
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn set_line_width(&mut self, width: f64);
    fn set_stroke_color(&mut self, color: Rgba);
    /// Discard the current path.
    fn begin_path(&mut self);
    /// Start a new sub-path at the given point.
    fn move_to(&mut self, x: f64, y: f64);
    /// Extend the current sub-path with a straight segment.
    fn line_to(&mut self, x: f64, y: f64);
    /// Stroke the current path with the current colour and width.
    fn stroke(&mut self);
}

/// A drawable surface with readable pixel dimensions.
///
/// Implementations are cheap handles; clones refer to the same surface.
pub trait Surface {
    type Context: Context2d + 'static;

    /// Size the host currently lays the surface out at. May be zero or
    /// negative while the surface is detached or collapsed.
    fn client_size(&self) -> (i32, i32);

    /// Resize the backing store to `width` x `height` pixels.
    fn set_size(&mut self, width: u32, height: u32);

    /// Acquire a 2D drawing context, if the surface supports one.
    fn context_2d(&self) -> Option<Self::Context>;
}
