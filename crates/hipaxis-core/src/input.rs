//! Pointer events delivered by the host.

use crate::error::{AnnotationError, AnnotationResult};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Input device class; touch gets a larger hit area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
}

/// Phase of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// A pointer event with the current position in both coordinate spaces.
///
/// Coordinates are optional because hosts may deliver partial payloads; the
/// tool rejects such events with [`AnnotationError::InvalidInputEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    /// Position in image coordinates.
    #[serde(default)]
    pub image: Option<Point>,
    /// Position in canvas (screen) pixels.
    #[serde(default)]
    pub canvas: Option<Point>,
    #[serde(default)]
    pub pointer: PointerKind,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, image: Point, canvas: Point) -> Self {
        Self {
            phase,
            image: Some(image),
            canvas: Some(canvas),
            pointer: PointerKind::Mouse,
        }
    }

    pub fn down(image: Point, canvas: Point) -> Self {
        Self::new(PointerPhase::Down, image, canvas)
    }

    pub fn moved(image: Point, canvas: Point) -> Self {
        Self::new(PointerPhase::Move, image, canvas)
    }

    pub fn up(image: Point, canvas: Point) -> Self {
        Self::new(PointerPhase::Up, image, canvas)
    }

    pub fn with_pointer(mut self, pointer: PointerKind) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn image_point(&self) -> AnnotationResult<Point> {
        self.image
            .filter(|p| p.is_finite())
            .ok_or(AnnotationError::InvalidInputEvent("missing image coordinates"))
    }

    pub fn canvas_point(&self) -> AnnotationResult<Point> {
        self.canvas
            .filter(|p| p.is_finite())
            .ok_or(AnnotationError::InvalidInputEvent("missing canvas coordinates"))
    }
}
