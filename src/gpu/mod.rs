//! GPU rasterisation using wgpu.
//!
//! Provides a headless [`GpuSurface`] that strokes the waveform field into an
//! offscreen texture. Used by the export pipeline when a GPU is available.

pub mod canvas;
pub mod context;
pub mod pipeline;
pub mod textures;

pub use canvas::{GpuCanvasContext, GpuSurface};
pub use context::{GpuContext, GpuError};
pub use pipeline::{StrokePipeline, StrokeVertex};
pub use textures::{ReadbackBuffer, RenderTarget};
