//! GPU-backed drawing surface.
//!
//! Strokes are tessellated into quads as they are issued and kept until the
//! next full clear. `read_pixels` composites the queued geometry into an
//! offscreen texture and copies it back as straight-alpha RGBA.

use super::context::{GpuContext, GpuError};
use super::pipeline::{StrokePipeline, StrokeVertex};
use super::textures::{ReadbackBuffer, RenderTarget};
use crate::render::{Context2d, Rgba, Surface};
use image::RgbaImage;
use std::cell::RefCell;
use std::rc::Rc;
use wgpu::util::DeviceExt;

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

struct GpuCanvas {
    gpu: GpuContext,
    pipeline: StrokePipeline,
    target: RenderTarget,
    client_size: (i32, i32),
    line_width: f64,
    stroke_color: Rgba,
    subpaths: Vec<Vec<(f64, f64)>>,
    vertices: Vec<StrokeVertex>,
}

impl GpuCanvas {
    fn width(&self) -> u32 {
        self.target.width()
    }

    fn height(&self) -> u32 {
        self.target.height()
    }

    #[inline]
    fn to_ndc(&self, x: f64, y: f64) -> [f32; 2] {
        [
            ((x / self.width() as f64) * 2.0 - 1.0) as f32,
            (1.0 - (y / self.height() as f64) * 2.0) as f32,
        ]
    }

    fn stroke_path(&mut self) {
        let alpha = self.stroke_color.opacity();
        if alpha <= 0.0 {
            return;
        }
        let color = [
            (self.stroke_color.r as f64 / 255.0 * alpha) as f32,
            (self.stroke_color.g as f64 / 255.0 * alpha) as f32,
            (self.stroke_color.b as f64 / 255.0 * alpha) as f32,
            alpha as f32,
        ];
        let half_width = self.line_width / 2.0;

        let subpaths = std::mem::take(&mut self.subpaths);
        for points in &subpaths {
            for segment in points.windows(2) {
                self.push_segment(segment[0], segment[1], half_width, color);
            }
        }
        self.subpaths = subpaths;
    }

    /// Push one segment as a quad extruded along its normal.
    fn push_segment(&mut self, from: (f64, f64), to: (f64, f64), half_width: f64, color: [f32; 4]) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let len = dx.hypot(dy);
        if len <= f64::EPSILON {
            return;
        }
        let (nx, ny) = (-dy / len * half_width, dx / len * half_width);

        let positions = [
            self.to_ndc(from.0 + nx, from.1 + ny),
            self.to_ndc(from.0 - nx, from.1 - ny),
            self.to_ndc(to.0 + nx, to.1 + ny),
            self.to_ndc(to.0 - nx, to.1 - ny),
        ];
        for &idx in &[0usize, 1, 2, 2, 1, 3] {
            self.vertices.push(StrokeVertex {
                position: positions[idx],
                color,
            });
        }
    }

    fn render(&self) -> Result<Vec<u8>, GpuError> {
        let device = &self.gpu.device;
        let readback = ReadbackBuffer::new(device, self.width(), self.height());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("stroke_encoder"),
        });

        let vertex_buffer = (!self.vertices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("stroke_vertices"),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("stroke_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.target.view(),
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(buffer) = &vertex_buffer {
                pass.set_pipeline(&self.pipeline.pipeline);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..self.vertices.len() as u32, 0..1);
            }
        }

        readback.copy_from(&mut encoder, &self.target);
        self.gpu.queue.submit(std::iter::once(encoder.finish()));

        let mut pixels = readback.read_pixels(device)?;
        unpremultiply(&mut pixels);
        Ok(pixels)
    }
}

fn clamp_extent(width: u32, height: u32, max: u32) -> (u32, u32) {
    let clamped = (width.clamp(1, max), height.clamp(1, max));
    if clamped != (width.max(1), height.max(1)) {
        log::warn!(
            "Surface {}x{} exceeds the texture limit {}, using {}x{}",
            width,
            height,
            max,
            clamped.0,
            clamped.1
        );
    }
    clamped
}

fn unpremultiply(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        let a = px[3] as f32;
        if a == 0.0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for channel in &mut px[..3] {
            *channel = (*channel as f32 * 255.0 / a).round().min(255.0) as u8;
        }
    }
}

/// Surface that rasterises strokes on the GPU.
///
/// Not `Send`: like the other surfaces it is a shared single-threaded handle.
#[derive(Clone)]
pub struct GpuSurface {
    canvas: Rc<RefCell<GpuCanvas>>,
}

impl GpuSurface {
    /// Acquire a device and create a transparent `width` x `height` surface.
    pub async fn new(width: u32, height: u32) -> Result<Self, GpuError> {
        let gpu = GpuContext::new().await?;
        Self::with_context(gpu, width, height)
    }

    /// Fails with [`GpuError::SurfaceTooLarge`] when the device cannot hold
    /// a texture of this size.
    pub fn with_context(gpu: GpuContext, width: u32, height: u32) -> Result<Self, GpuError> {
        let (width, height) = (width.max(1), height.max(1));
        gpu.check_size(width, height)?;
        let pipeline = StrokePipeline::new(&gpu.device, TARGET_FORMAT);
        let target = RenderTarget::for_output(&gpu.device, "stroke_target", width, height, TARGET_FORMAT);
        Ok(Self {
            canvas: Rc::new(RefCell::new(GpuCanvas {
                gpu,
                pipeline,
                target,
                client_size: (width as i32, height as i32),
                line_width: 1.0,
                stroke_color: Rgba::new(0, 0, 0, 1.0),
                subpaths: Vec::new(),
                vertices: Vec::new(),
            })),
        })
    }

    /// Change the size the surface reports to the render loop.
    pub fn set_client_size(&self, width: i32, height: i32) {
        self.canvas.borrow_mut().client_size = (width, height);
    }

    pub fn dimensions(&self) -> (u32, u32) {
        let canvas = self.canvas.borrow();
        (canvas.width(), canvas.height())
    }

    /// Vertices queued since the last full clear.
    pub fn queued_vertices(&self) -> usize {
        self.canvas.borrow().vertices.len()
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.canvas.borrow().gpu.adapter_info()
    }

    /// Render the queued strokes and read them back as straight-alpha RGBA.
    pub fn read_pixels(&self) -> Result<Vec<u8>, GpuError> {
        self.canvas.borrow().render()
    }

    pub fn read_image(&self) -> Result<RgbaImage, GpuError> {
        let (width, height) = self.dimensions();
        let pixels = self.read_pixels()?;
        let actual = pixels.len();
        RgbaImage::from_raw(width, height, pixels).ok_or(GpuError::ReadbackSize {
            expected: (width * height * 4) as usize,
            actual,
        })
    }
}

impl Surface for GpuSurface {
    type Context = GpuCanvasContext;

    fn client_size(&self) -> (i32, i32) {
        self.canvas.borrow().client_size
    }

    /// Recreates the render target; queued strokes are discarded.
    ///
    /// Sizes beyond the device texture limit are clamped to it, and strokes
    /// past the edge are clipped.
    fn set_size(&mut self, width: u32, height: u32) {
        let mut canvas = self.canvas.borrow_mut();
        let max = canvas.gpu.max_texture_dimension();
        let (width, height) = clamp_extent(width, height, max);
        canvas.target =
            RenderTarget::for_output(&canvas.gpu.device, "stroke_target", width, height, TARGET_FORMAT);
        canvas.vertices.clear();
    }

    fn context_2d(&self) -> Option<GpuCanvasContext> {
        Some(GpuCanvasContext {
            canvas: Rc::clone(&self.canvas),
        })
    }
}

/// Drawing context for a [`GpuSurface`].
#[derive(Clone)]
pub struct GpuCanvasContext {
    canvas: Rc<RefCell<GpuCanvas>>,
}

impl Context2d for GpuCanvasContext {
    /// Only full-surface clears are supported; partial clears are ignored.
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let mut canvas = self.canvas.borrow_mut();
        let covers = x <= 0.0
            && y <= 0.0
            && x + width >= canvas.width() as f64
            && y + height >= canvas.height() as f64;
        if covers {
            canvas.vertices.clear();
        } else {
            log::debug!("Ignoring partial clear_rect({}, {}, {}, {})", x, y, width, height);
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
            None => canvas.subpaths.push(vec![(x, y)]),
        }
    }

    fn stroke(&mut self) {
        self.canvas.borrow_mut().stroke_path();
    }
}
