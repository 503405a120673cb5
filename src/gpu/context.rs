//! Device acquisition for offscreen stroke rendering.

use std::sync::Arc;
use wgpu::{Adapter, Device, Instance, Queue};

#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,
    #[error("Failed to request device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
    #[error("Surface {width}x{height} exceeds the device texture limit of {max}")]
    SurfaceTooLarge { width: u32, height: u32, max: u32 },
    #[error("Device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),
    #[error("Failed to map readback buffer: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),
    #[error("Readback channel closed before the buffer was mapped")]
    ReadbackLost,
    #[error("Readback returned {actual} bytes, expected {expected}")]
    ReadbackSize { expected: usize, actual: usize },
}

/// Adapter, device and queue shared by every [`GpuSurface`](super::GpuSurface)
/// built from it.
pub struct GpuContext {
    pub instance: Instance,
    pub adapter: Arc<Adapter>,
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
}

impl GpuContext {
    /// Pick a low-power adapter and open a device without a presentation surface.
    ///
    /// Limits start from the downlevel set, with the texture resolution raised
    /// to whatever the adapter supports so full-screen frames fit.
    pub async fn new() -> Result<Self, GpuError> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::METAL | wgpu::Backends::VULKAN | wgpu::Backends::GL,
            ..Default::default()
        });

        // A background effect does not need the discrete GPU.
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        let required_limits =
            wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits());
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("ambient-waveform"),
                required_features: wgpu::Features::empty(),
                required_limits,
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        log::debug!(
            "GPU adapter: {} (max texture {})",
            adapter.get_info().name,
            device.limits().max_texture_dimension_2d
        );

        Ok(Self {
            instance,
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Largest width or height a render target may have on this device.
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Fail with [`GpuError::SurfaceTooLarge`] if either side exceeds the limit.
    pub fn check_size(&self, width: u32, height: u32) -> Result<(), GpuError> {
        let max = self.max_texture_dimension();
        if width > max || height > max {
            return Err(GpuError::SurfaceTooLarge { width, height, max });
        }
        Ok(())
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_device_allows_at_least_downlevel_textures() {
        let Ok(ctx) = GpuContext::new().await else {
            return;
        };
        assert!(!ctx.adapter_info().name.is_empty());
        assert!(ctx.max_texture_dimension() >= 2048);
        assert_eq!(
            ctx.max_texture_dimension(),
            ctx.adapter.limits().max_texture_dimension_2d
        );
    }

    #[tokio::test]
    async fn test_check_size_rejects_oversize() {
        let Ok(ctx) = GpuContext::new().await else {
            return;
        };
        let max = ctx.max_texture_dimension();
        assert!(ctx.check_size(max, 1).is_ok());
        assert!(matches!(
            ctx.check_size(1, max + 1),
            Err(GpuError::SurfaceTooLarge { width: 1, .. })
        ));
    }
}
