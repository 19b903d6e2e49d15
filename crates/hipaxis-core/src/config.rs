//! Tool configuration.

use crate::error::AnnotationResult;
use serde::{Deserialize, Serialize};

/// Canvas-space radius (pixels) within which a handle can be grabbed.
pub const HANDLE_GRAB_RADIUS: f64 = 6.0;
/// Canvas-space distance to a shape vertex that starts a whole-shape drag (mouse).
pub const MOUSE_NEAR_DISTANCE: f64 = 15.0;
/// Same as [`MOUSE_NEAR_DISTANCE`] for touch input.
pub const TOUCH_NEAR_DISTANCE: f64 = 25.0;

/// Options recognised by the tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Add a `Min`/`Max` line to the label.
    pub show_min_max: bool,
    /// Append modality units (HU) and adjusted values (SUV) to the label.
    pub show_adjusted_units: bool,
    /// Handle radius passed through to the painter.
    pub handle_radius: Option<f64>,
    /// Only draw handles while the measurement is hovered.
    pub draw_handles_on_hover: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            show_min_max: false,
            show_adjusted_units: true,
            handle_radius: None,
            draw_handles_on_hover: false,
        }
    }
}

impl ToolConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> AnnotationResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnnotationError;

    #[test]
    fn test_defaults() {
        let config = ToolConfig::default();
        assert!(!config.show_min_max);
        assert!(config.show_adjusted_units);
        assert_eq!(config.handle_radius, None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ToolConfig::from_json(r#"{ "show_min_max": true }"#).unwrap();
        assert!(config.show_min_max);
        assert!(config.show_adjusted_units);
    }

    #[test]
    fn test_invalid_json() {
        let err = ToolConfig::from_json("{ show_min_max").unwrap_err();
        assert!(matches!(err, AnnotationError::Config(_)));
    }
}
