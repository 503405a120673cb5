//! Strokes the waveform field, one polyline per line.

use super::{Context2d, Rgba};
use crate::field::{FieldConfig, ViewportState, WaveformField};

/// Draws every line of a [`WaveformField`] in index order.
///
/// There is no depth sort: a line drawn later paints over earlier ones.
#[derive(Debug, Clone)]
pub struct LineRenderer {
    field: WaveformField,
    line_width: f64,
    stroke_rgb: [u8; 3],
}

impl LineRenderer {
    pub fn new(config: &FieldConfig) -> Self {
        Self {
            field: WaveformField::new(config),
            line_width: config.line_width,
            stroke_rgb: config.stroke_color,
        }
    }

    pub fn field(&self) -> &WaveformField {
        &self.field
    }

    /// Stroke colour of a line: fixed hue, index-derived alpha.
    pub fn stroke_color(&self, line: u32) -> Rgba {
        Rgba::from_rgb(self.stroke_rgb, self.field.alpha(line))
    }

    /// Draw all lines at clock time `time`.
    pub fn draw<C: Context2d + ?Sized>(&self, ctx: &mut C, viewport: &ViewportState, time: f64) {
        ctx.set_line_width(self.line_width);
        for line in 0..self.field.line_count() {
            self.draw_line(ctx, line, viewport, time);
        }
    }

    fn draw_line<C: Context2d + ?Sized>(
        &self,
        ctx: &mut C,
        line: u32,
        viewport: &ViewportState,
        time: f64,
    ) {
        ctx.begin_path();
        ctx.set_stroke_color(self.stroke_color(line));
        for (n, point) in self.field.polyline(line, time, viewport).enumerate() {
            if n == 0 {
                ctx.move_to(point.x2d, point.y2d);
            } else {
                ctx.line_to(point.x2d, point.y2d);
            }
        }
        ctx.stroke();
    }
}
