//! Procedural waveform field.
//!
//! Provides the time- and viewport-driven math behind the background:
//! - Field constants and their validation
//! - Viewport state with degenerate-size clamping
//! - Frame-counted animation clock
//! - Perspective projector
//! - Closed-form waveform generator

pub mod clock;
pub mod generator;
pub mod params;
pub mod projector;
pub mod viewport;

pub use clock::AnimationClock;
pub use generator::{SamplePoint, WaveformField};
pub use params::{ConfigError, FieldConfig};
pub use projector::PerspectiveProjector;
pub use viewport::ViewportState;
