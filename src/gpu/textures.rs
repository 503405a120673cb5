//! Offscreen render target and CPU readback.

use super::context::GpuError;
use wgpu::{Device, Texture, TextureFormat, TextureUsages, TextureView};

const BYTES_PER_PIXEL: u32 = 4;

/// Bytes per row of an RGBA8 copy of `width` pixels, rounded up for buffer copies.
pub fn aligned_row_bytes(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * BYTES_PER_PIXEL).div_ceil(align) * align
}

/// Offscreen colour texture the stroke pass draws into, with its view.
pub struct RenderTarget {
    texture: Texture,
    view: TextureView,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Create a render target that can be copied back to the CPU.
    pub fn for_output(
        device: &Device,
        label: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    pub fn view(&self) -> &TextureView {
        &self.view
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Staging buffer a [`RenderTarget`] is copied into before mapping.
///
/// Rows are padded to `COPY_BYTES_PER_ROW_ALIGNMENT`; `read_pixels` strips
/// the padding again.
pub struct ReadbackBuffer {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    padded_row_bytes: u32,
    unpadded_row_bytes: u32,
}

impl ReadbackBuffer {
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let unpadded_row_bytes = width * BYTES_PER_PIXEL;
        let padded_row_bytes = aligned_row_bytes(width);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("stroke_readback_buffer"),
            size: (padded_row_bytes * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            width,
            height,
            padded_row_bytes,
            unpadded_row_bytes,
        }
    }

    /// Record a copy of the whole `target` into this buffer.
    pub fn copy_from(&self, encoder: &mut wgpu::CommandEncoder, target: &RenderTarget) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: target.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_row_bytes),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    pub fn padded_row_bytes(&self) -> u32 {
        self.padded_row_bytes
    }

    /// Map the buffer and return tightly packed RGBA rows.
    pub fn read_pixels(&self, device: &wgpu::Device) -> Result<Vec<u8>, GpuError> {
        let buffer_slice = self.buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            // The receiver only disappears if the caller already bailed out.
            let _ = sender.send(result);
        });
        device.poll(wgpu::PollType::wait_indefinitely())?;
        receiver.recv().map_err(|_| GpuError::ReadbackLost)??;

        let pixels = {
            let data = buffer_slice.get_mapped_range();
            let row_len = self.unpadded_row_bytes as usize;
            data.chunks(self.padded_row_bytes as usize)
                .take(self.height as usize)
                .flat_map(|row| &row[..row_len])
                .copied()
                .collect::<Vec<u8>>()
        };
        self.buffer.unmap();
        Ok(pixels)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::gpu::GpuContext;

    #[test]
    fn test_aligned_row_bytes() {
        assert_eq!(aligned_row_bytes(64), 256);
        assert_eq!(aligned_row_bytes(65), 512);
        assert_eq!(aligned_row_bytes(1), wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
    }

    #[tokio::test]
    async fn test_target_and_readback_share_extent() {
        let Ok(ctx) = GpuContext::new().await else {
            return;
        };

        let target =
            RenderTarget::for_output(&ctx.device, "extent", 100, 10, TextureFormat::Rgba8Unorm);
        let readback = ReadbackBuffer::new(&ctx.device, target.width(), target.height());
        assert_eq!((target.width(), target.height()), (100, 10));
        assert_eq!(readback.padded_row_bytes(), aligned_row_bytes(100));
    }
}
