//! Offline export: drive the render loop headlessly and write PNG frames.

use crate::animation::{RenderError, RenderLoop};
use crate::field::{ConfigError, FieldConfig, ViewportState};
use crate::gpu::{GpuError, GpuSurface};
use crate::host::ManualHost;
use crate::render::{LineRenderer, PixelSurface, Surface};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Rasteriser used for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterBackend {
    #[default]
    Cpu,
    Gpu,
}

impl RasterBackend {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cpu" | "raster" => Some(Self::Cpu),
            "gpu" | "wgpu" => Some(Self::Gpu),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub width: u32,
    pub height: u32,
    /// Number of frames; each frame advances the clock by one step.
    pub frames: u32,
    pub field: FieldConfig,
    pub backend: RasterBackend,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            frames: 120,
            field: FieldConfig::default(),
            backend: RasterBackend::Cpu,
        }
    }
}

/// Errors that can occur during export.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse hex color to RGB bytes (accepts 6-char RGB or 8-char RGBA, alpha is ignored).
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim_start_matches('#');
    if (hex.len() != 6 && hex.len() != 8) || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

/// File name of the `index`-th exported frame.
pub fn frame_file_name(index: u32) -> String {
    format!("frame_{:05}.png", index)
}

/// Render the field at clock time `time` on the CPU rasteriser.
pub fn render_still(
    field: &FieldConfig,
    width: u32,
    height: u32,
    time: f64,
) -> Result<RgbaImage, PipelineError> {
    field.validate()?;
    let surface = PixelSurface::new(width, height);
    let mut ctx = surface.context_2d().ok_or(RenderError::ContextUnavailable)?;
    let viewport = ViewportState::from_client(width as i32, height as i32);
    LineRenderer::new(field).draw(&mut ctx, &viewport, time);
    Ok(surface.snapshot())
}

/// Render `config.frames` frames into `out_dir` as `frame_00000.png`, ...
///
/// Returns the written paths in frame order.
pub async fn export_frames<P: AsRef<Path>>(
    out_dir: P,
    config: &ExportConfig,
    progress_callback: Option<Box<dyn Fn(f32)>>,
) -> Result<Vec<PathBuf>, PipelineError> {
    config.field.validate()?;
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir)?;

    log::info!(
        "Exporting {} frames at {}x{} ({} backend) to {}",
        config.frames,
        config.width,
        config.height,
        config.backend.name(),
        out_dir.display()
    );

    let paths = match config.backend {
        RasterBackend::Cpu => {
            let surface = PixelSurface::new(config.width, config.height);
            run_export(surface, out_dir, config, progress_callback, |s, path| {
                Ok(s.save_png(path)?)
            })?
        }
        RasterBackend::Gpu => {
            let surface = GpuSurface::new(config.width, config.height).await?;
            log::info!("Using GPU adapter: {}", surface.adapter_info().name);
            run_export(surface, out_dir, config, progress_callback, |s, path| {
                Ok(s.read_image()?.save(path)?)
            })?
        }
    };

    log::info!("Export finished: {} frames", paths.len());
    Ok(paths)
}

/// Blocking wrapper around [`export_frames`] for callers without an executor.
pub fn export_frames_blocking<P: AsRef<Path>>(
    out_dir: P,
    config: &ExportConfig,
    progress_callback: Option<Box<dyn Fn(f32)>>,
) -> Result<Vec<PathBuf>, PipelineError> {
    pollster::block_on(export_frames(out_dir, config, progress_callback))
}

fn run_export<S, F>(
    surface: S,
    out_dir: &Path,
    config: &ExportConfig,
    progress_callback: Option<Box<dyn Fn(f32)>>,
    save: F,
) -> Result<Vec<PathBuf>, PipelineError>
where
    S: Surface + Clone + 'static,
    F: Fn(&S, &Path) -> Result<(), PipelineError>,
{
    let host = ManualHost::new();
    let mut render_loop = RenderLoop::new(host.clone(), config.field.clone())?;
    render_loop.start(surface.clone())?;

    let total = config.frames;
    let mut paths = Vec::with_capacity(total as usize);
    for index in 0..total {
        host.tick();
        let path = out_dir.join(frame_file_name(index));
        save(&surface, &path)?;
        log::debug!("Wrote {}", path.display());
        paths.push(path);

        if let Some(ref callback) = progress_callback {
            callback((index + 1) as f32 / total as f32);
        }
    }

    render_loop.stop();
    Ok(paths)
}
