//! Ambient Waveform Field
//!
//! Procedural pseudo-3D waveform field for animated page backgrounds.
//!
//! # Features
//!
//! - Deterministic field model: sine/cosine displacement, perspective projection
//! - Frame-driven render loop with resize handling and clean cancellation
//! - Canvas-style 2D drawing surfaces: recording, CPU raster, GPU via wgpu
//! - Browser host via wasm-bindgen (when `web` feature is enabled)
//! - Offline PNG frame export

pub mod animation;
pub mod field;
pub mod gpu;
pub mod host;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use animation::{LoopState, RenderError, RenderLoop};
pub use field::{
    AnimationClock, ConfigError, FieldConfig, PerspectiveProjector, SamplePoint, ViewportState,
    WaveformField,
};
pub use gpu::{GpuContext, GpuError, GpuSurface};
pub use host::{FrameHandle, Host, HostError, ListenerId, ManualHost};
pub use pipeline::{
    export_frames, parse_hex_color, render_still, ExportConfig, PipelineError, RasterBackend,
};
pub use render::{Context2d, LineRenderer, PixelSurface, RecordingSurface, Rgba, Surface};

#[cfg(feature = "web")]
pub use host::{AmbientBackground, WebHost};

