//! Recorded draw commands.
//!
//! [`SceneRecorder`] implements [`Renderer`] by appending commands to a
//! [`Scene`], which headless hosts serialize and tests inspect.

use crate::renderer::{HandleStyle, LinkedTextBox, RenderResult, Renderer, StrokeStyle};
use kurbo::Point;
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// One drawing primitive invocation, in canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawCommand {
    Polygon {
        points: Vec<Point>,
        color: SerializableColor,
        width: f64,
        #[serde(default)]
        rotation: f64,
    },
    Line {
        from: Point,
        to: Point,
        color: SerializableColor,
        width: f64,
        #[serde(default)]
        rotation: f64,
    },
    Circle {
        center: Point,
        radius: f64,
        color: SerializableColor,
        width: f64,
    },
    Handles {
        points: Vec<Point>,
        color: SerializableColor,
        radius: Option<f64>,
    },
    TextBox {
        lines: Vec<String>,
        position: Point,
        anchors: Vec<Point>,
        color: SerializableColor,
    },
}

/// Commands of one frame, in drawing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// All label lines, in drawing order.
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::TextBox { lines, .. } => Some(lines),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
    }

    pub fn lines(&self) -> impl Iterator<Item = (Point, Point)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
    }
}

/// Renderer that records into a [`Scene`].
#[derive(Debug, Default)]
pub struct SceneRecorder {
    scene: Scene,
}

impl SceneRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take the recorded frame, leaving the recorder empty.
    pub fn finish(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }
}

impl Renderer for SceneRecorder {
    fn draw_polygon(&mut self, points: &[Point], style: StrokeStyle) -> RenderResult<()> {
        self.scene.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color: style.color.into(),
            width: style.width,
            rotation: style.rotation,
        });
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point, style: StrokeStyle) -> RenderResult<()> {
        self.scene.commands.push(DrawCommand::Line {
            from,
            to,
            color: style.color.into(),
            width: style.width,
            rotation: style.rotation,
        });
        Ok(())
    }

    fn draw_circle(&mut self, center: Point, radius: f64, style: StrokeStyle) -> RenderResult<()> {
        self.scene.commands.push(DrawCommand::Circle {
            center,
            radius,
            color: style.color.into(),
            width: style.width,
        });
        Ok(())
    }

    fn draw_handles(&mut self, handles: &[Point], style: HandleStyle) -> RenderResult<()> {
        self.scene.commands.push(DrawCommand::Handles {
            points: handles.to_vec(),
            color: style.color.into(),
            radius: style.radius,
        });
        Ok(())
    }

    fn draw_linked_text_box(&mut self, text_box: &LinkedTextBox) -> RenderResult<()> {
        self.scene.commands.push(DrawCommand::TextBox {
            lines: text_box.lines.clone(),
            position: text_box.position,
            anchors: text_box.anchors.clone(),
            color: text_box.color.into(),
        });
        Ok(())
    }
}
