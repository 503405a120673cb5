//! CPU raster surface.
//!
//! Strokes are drawn as anti-aliased lines (Xiaolin Wu) and composited with
//! straight-alpha source-over blending, so the buffer keeps real transparency.

use super::{Context2d, Rgba, Surface};
use image::{ImageResult, Rgba as Pixel, RgbaImage};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

#[derive(Debug)]
struct PixelCanvas {
    image: RgbaImage,
    client_size: (i32, i32),
    line_width: f64,
    stroke_color: Rgba,
    subpaths: Vec<Vec<(f64, f64)>>,
}

impl PixelCanvas {
    fn blend(&mut self, x: i64, y: i64, color: Rgba, coverage: f64) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        let src_a = color.opacity() * coverage.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }

        let px = self.image.get_pixel_mut(x as u32, y as u32);
        let dst_a = px[3] as f64 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        let src = [color.r, color.g, color.b];
        for (channel, &s) in src.iter().enumerate() {
            let d = px[channel] as f64;
            let value = (s as f64 * src_a + d * dst_a * (1.0 - src_a)) / out_a;
            px[channel] = value.round().clamp(0.0, 255.0) as u8;
        }
        px[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    fn stroke_path(&mut self) {
        let color = self.stroke_color;
        if color.opacity() <= 0.0 {
            return;
        }
        let passes = self.line_width.round().max(1.0) as usize;
        let subpaths = std::mem::take(&mut self.subpaths);
        for points in &subpaths {
            for segment in points.windows(2) {
                self.stroke_segment(segment[0], segment[1], color, passes);
            }
        }
        self.subpaths = subpaths;
    }

    /// Wide strokes are approximated by parallel 1px lines along the normal.
    fn stroke_segment(&mut self, from: (f64, f64), to: (f64, f64), color: Rgba, passes: usize) {
        if passes == 1 {
            self.wu_line(from, to, color);
            return;
        }
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let len = (dx * dx + dy * dy).sqrt().max(0.001);
        let (nx, ny) = (-dy / len, dx / len);
        let first = -((passes - 1) as f64) / 2.0;
        for pass in 0..passes {
            let offset = first + pass as f64;
            self.wu_line(
                (from.0 + nx * offset, from.1 + ny * offset),
                (to.0 + nx * offset, to.1 + ny * offset),
                color,
            );
        }
    }

    fn wu_line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgba) {
        // Wu treats integer coordinates as pixel centres.
        let (mut x0, mut y0) = (from.0 - 0.5, from.1 - 0.5);
        let (mut x1, mut y1) = (to.0 - 0.5, to.1 - 0.5);
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return;
        }

        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            std::mem::swap(&mut x0, &mut y0);
            std::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            std::mem::swap(&mut x0, &mut x1);
            std::mem::swap(&mut y0, &mut y1);
        }

        let dx = x1 - x0;
        let dy = y1 - y0;
        let gradient = if dx == 0.0 { 1.0 } else { dy / dx };

        let plot = |canvas: &mut Self, x: i64, y: i64, coverage: f64| {
            if steep {
                canvas.blend(y, x, color, coverage);
            } else {
                canvas.blend(x, y, color, coverage);
            }
        };

        let x_end = x0.round();
        let y_end = y0 + gradient * (x_end - x0);
        let x_gap = rfpart(x0 + 0.5);
        let x_start_px = x_end as i64;
        let y_px = y_end.floor();
        plot(self, x_start_px, y_px as i64, rfpart(y_end) * x_gap);
        plot(self, x_start_px, y_px as i64 + 1, fpart(y_end) * x_gap);
        let mut inter_y = y_end + gradient;

        let x_end = x1.round();
        let y_end = y1 + gradient * (x_end - x1);
        let x_gap = fpart(x1 + 0.5);
        let x_stop_px = x_end as i64;
        let y_px = y_end.floor();
        plot(self, x_stop_px, y_px as i64, rfpart(y_end) * x_gap);
        plot(self, x_stop_px, y_px as i64 + 1, fpart(y_end) * x_gap);

        // Skip the part of the span that cannot touch the image.
        let limit = (if steep { self.image.height() } else { self.image.width() }) as i64;
        let first = (x_start_px + 1).max(-1);
        let last = x_stop_px.min(limit + 1);
        inter_y += gradient * (first - (x_start_px + 1)) as f64;
        for x in first..last {
            let y_px = inter_y.floor();
            plot(self, x, y_px as i64, rfpart(inter_y));
            plot(self, x, y_px as i64 + 1, fpart(inter_y));
            inter_y += gradient;
        }
    }
}

#[inline]
fn fpart(v: f64) -> f64 {
    v - v.floor()
}

#[inline]
fn rfpart(v: f64) -> f64 {
    1.0 - fpart(v)
}

/// Surface handle over an in-memory RGBA buffer.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    canvas: Rc<RefCell<PixelCanvas>>,
}

impl PixelSurface {
    /// Create a transparent surface whose client size matches its buffer.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            canvas: Rc::new(RefCell::new(PixelCanvas {
                image: RgbaImage::new(width, height),
                client_size: (width as i32, height as i32),
                line_width: 1.0,
                stroke_color: Rgba::new(0, 0, 0, 1.0),
                subpaths: Vec::new(),
            })),
        }
    }

    /// Change the size the surface reports to the render loop.
    pub fn set_client_size(&self, width: i32, height: i32) {
        self.canvas.borrow_mut().client_size = (width, height);
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.canvas.borrow().image.dimensions()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.canvas.borrow().image.get_pixel(x, y).0
    }

    /// Copy of the current buffer.
    pub fn snapshot(&self) -> RgbaImage {
        self.canvas.borrow().image.clone()
    }

    /// Raw RGBA bytes, row-major.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.canvas.borrow().image.as_raw().clone()
    }

    /// Number of pixels with any coverage.
    pub fn painted_pixels(&self) -> usize {
        self.canvas.borrow().image.pixels().filter(|p| p[3] > 0).count()
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.canvas.borrow().image.save(path.as_ref())
    }
}

impl Surface for PixelSurface {
    type Context = PixelContext;

    fn client_size(&self) -> (i32, i32) {
        self.canvas.borrow().client_size
    }

    /// Reallocates the buffer; like a canvas, resizing discards its content.
    fn set_size(&mut self, width: u32, height: u32) {
        let mut canvas = self.canvas.borrow_mut();
        canvas.image = RgbaImage::new(width.max(1), height.max(1));
    }

    fn context_2d(&self) -> Option<PixelContext> {
        Some(PixelContext {
            canvas: Rc::clone(&self.canvas),
        })
    }
}

/// Drawing context for a [`PixelSurface`].
#[derive(Debug, Clone)]
pub struct PixelContext {
    canvas: Rc<RefCell<PixelCanvas>>,
}

impl Context2d for PixelContext {
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let mut canvas = self.canvas.borrow_mut();
        let (img_w, img_h) = canvas.image.dimensions();
        let x0 = x.floor().clamp(0.0, img_w as f64) as u32;
        let y0 = y.floor().clamp(0.0, img_h as f64) as u32;
        let x1 = (x + width).ceil().clamp(0.0, img_w as f64) as u32;
        let y1 = (y + height).ceil().clamp(0.0, img_h as f64) as u32;
        for py in y0..y1 {
            for px in x0..x1 {
                canvas.image.put_pixel(px, py, Pixel([0, 0, 0, 0]));
            }
        }
    }

    fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.canvas.borrow_mut().line_width = width;
        }
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        self.canvas.borrow_mut().stroke_color = color;
    }

    fn begin_path(&mut self) {
        self.canvas.borrow_mut().subpaths.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.canvas.borrow_mut().subpaths.push(vec![(x, y)]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let mut canvas = self.canvas.borrow_mut();
        match canvas.subpaths.last_mut() {
            Some(points) => points.push((x, y)),
            // Canvas semantics: a line_to without a current point acts as move_to.
            None => canvas.subpaths.push(vec![(x, y)]),
        }
    }

    fn stroke(&mut self) {
        self.canvas.borrow_mut().stroke_path();
    }
}
