//! Renderer trait abstraction.

use hipaxis_core::ToolContext;
use kurbo::Point;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Text layout failed: {0}")]
    TextLayout(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Stroke parameters shared by the outline primitives.
#[derive(Debug, Clone, Copy)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    /// Viewport rotation in degrees captured when the shape was created.
    /// Painters that draw in a rotated frame use it to keep the outline upright.
    pub rotation: f64,
}

/// Handle drawing parameters.
#[derive(Debug, Clone, Copy)]
pub struct HandleStyle {
    pub color: Color,
    /// `None` leaves the size to the painter.
    pub radius: Option<f64>,
}

/// A label box linked to its shape by a connector line. All points are in
/// canvas pixels.
#[derive(Debug, Clone)]
pub struct LinkedTextBox {
    pub lines: Vec<String>,
    pub position: Point,
    /// Candidate endpoints for the connector; the painter picks the nearest.
    pub anchors: Vec<Point>,
    pub color: Color,
    pub line_width: f64,
    /// Horizontal gap between `position` and the box.
    pub x_offset: f64,
    /// Center the box vertically on `position`.
    pub y_center: bool,
}

/// Context for a single render frame.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    /// Host collaborators and the frame time.
    pub host: ToolContext<'a>,
    /// Color of hovered or selected measurements.
    pub active_color: Color,
    /// Color of every other measurement.
    pub inactive_color: Color,
    pub line_width: f64,
    pub text_x_offset: f64,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(host: ToolContext<'a>) -> Self {
        Self {
            host,
            active_color: Color::from_rgba8(173, 255, 47, 255), // greenyellow
            inactive_color: Color::from_rgba8(255, 255, 255, 255),
            line_width: 1.0,
            text_x_offset: 10.0,
        }
    }

    /// Set the active and inactive colors.
    pub fn with_colors(mut self, active: Color, inactive: Color) -> Self {
        self.active_color = active;
        self.inactive_color = inactive;
        self
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    /// Color for a measurement given its highlight flag.
    pub fn color_for(&self, active: bool) -> Color {
        if active { self.active_color } else { self.inactive_color }
    }
}

/// Drawing primitives a host exposes. Coordinates are canvas pixels.
pub trait Renderer {
    /// Closed outline through `points`.
    fn draw_polygon(&mut self, points: &[Point], style: StrokeStyle) -> RenderResult<()>;

    fn draw_line(&mut self, from: Point, to: Point, style: StrokeStyle) -> RenderResult<()>;

    fn draw_circle(&mut self, center: Point, radius: f64, style: StrokeStyle) -> RenderResult<()>;

    fn draw_handles(&mut self, handles: &[Point], style: HandleStyle) -> RenderResult<()>;

    fn draw_linked_text_box(&mut self, text_box: &LinkedTextBox) -> RenderResult<()>;

    /// Width of `text` in the label font. Defaults to one unit per char.
    fn measure_text(&self, text: &str) -> f64 {
        text.chars().count() as f64
    }
}
