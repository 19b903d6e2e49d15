//! Scenario files: an image description plus a scripted pointer session.

use hipaxis_core::{ImageInfo, PointerKind, PointerPhase, ToolConfig, Viewport};
use hipaxis_render::RendererError;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Scenario errors.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Render failed: {0}")]
    Render(#[from] RendererError),
}

/// Result type for scenario operations.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// How pixel values are generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PixelPattern {
    Fill {
        value: f64,
    },
    /// `origin + step_x * x + step_y * y`.
    Gradient {
        #[serde(default)]
        origin: f64,
        #[serde(default)]
        step_x: f64,
        #[serde(default)]
        step_y: f64,
    },
    /// Explicit row-major values.
    Values {
        values: Vec<f64>,
    },
}

impl Default for PixelPattern {
    fn default() -> Self {
        PixelPattern::Fill { value: 0.0 }
    }
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSpec {
    pub width: u32,
    pub height: u32,
    /// Canvas pixels per image pixel.
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub pattern: PixelPattern,
}

/// One scripted pointer event in image coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioEvent {
    pub phase: PointerPhase,
    /// Missing coordinates replay as an invalid event.
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub pointer: PointerKind,
    /// Milliseconds elapsed since the previous event.
    #[serde(default)]
    pub dt_ms: u64,
}

impl ScenarioEvent {
    pub fn image_point(&self) -> Option<Point> {
        Some(Point::new(self.x?, self.y?))
    }
}

/// A complete replay script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub image: ImageSpec,
    #[serde(default)]
    pub info: ImageInfo,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub config: ToolConfig,
    pub events: Vec<ScenarioEvent>,
}

impl Scenario {
    pub fn from_json(json: &str) -> ScenarioResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> ScenarioResult<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| ScenarioError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}
