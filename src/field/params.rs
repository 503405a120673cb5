//! Field configuration.
//!
//! All constants that shape the waveform field. A `RenderLoop` copies its
//! `FieldConfig` when it is created; changing a value means building a new loop.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::projector::CAMERA_DISTANCE;

/// Errors produced while loading or validating a [`FieldConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("line_count must be at least 1")]
    NoLines,
    #[error("sample_step must be at least 1 pixel")]
    ZeroSampleStep,
    #[error("{name} must be finite and positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("max_alpha must be within 0.0..=1.0, got {0}")]
    AlphaOutOfRange(f64),
    #[error("perspective {perspective} with gap {gap} lets the projection denominator reach zero")]
    DegenerateProjection { perspective: f64, gap: f64 },
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Constants for the scrolling waveform field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of waveform lines stacked in depth.
    pub line_count: u32,
    /// Depth distance between two neighbouring lines.
    pub gap: f64,
    /// Peak height of the primary wave before projection.
    pub amplitude: f64,
    /// Clock increment per rendered frame.
    pub speed: f64,
    /// Focal distance of the perspective divide.
    pub perspective: f64,
    /// Horizontal distance between samples, in pixels.
    pub sample_step: u32,
    /// Stroke width in pixels.
    pub line_width: f64,
    /// Stroke hue; alpha comes from the line index.
    pub stroke_color: [u8; 3],
    /// Alpha reached by the last line.
    pub max_alpha: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            line_count: 40,
            gap: 40.0,
            amplitude: 50.0,
            speed: 0.002,
            perspective: 300.0,
            sample_step: 20,
            line_width: 1.0,
            stroke_color: [255, 255, 255],
            max_alpha: 0.15,
        }
    }
}

impl FieldConfig {
    /// Parse a config from JSON. Missing keys fall back to the defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Check that every constant keeps the projection well defined.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.line_count == 0 {
            return Err(ConfigError::NoLines);
        }
        if self.sample_step == 0 {
            return Err(ConfigError::ZeroSampleStep);
        }
        for (name, value) in [
            ("gap", self.gap),
            ("perspective", self.perspective),
            ("line_width", self.line_width),
            ("speed", self.speed),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        if !self.amplitude.is_finite() {
            return Err(ConfigError::NotFinite {
                name: "amplitude",
                value: self.amplitude,
            });
        }
        if !(0.0..=1.0).contains(&self.max_alpha) {
            return Err(ConfigError::AlphaOutOfRange(self.max_alpha));
        }
        // Nearest possible depth is just above -gap.
        if self.perspective + CAMERA_DISTANCE - self.gap <= 0.0 {
            return Err(ConfigError::DegenerateProjection {
                perspective: self.perspective,
                gap: self.gap,
            });
        }
        Ok(())
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
