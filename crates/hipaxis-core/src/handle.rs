//! Handle definitions for measurement manipulation.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Role of a handle within its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleRole {
    Start,
    End,
    /// `(start.x, end.y)` on the shaft rectangle.
    Corner1,
    /// `(end.x, start.y)` on the shaft rectangle.
    Corner2,
}

/// A draggable point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handle {
    /// Position in image coordinates.
    pub(crate) position: Point,
    /// Nearest handle to the pointer while hovering.
    pub active: bool,
    /// True until the handle has been placed by a drag release.
    pub(crate) is_first: bool,
}

impl Handle {
    /// Create a new handle.
    pub fn new(position: Point) -> Self {
        Self {
            position,
            active: false,
            is_first: false,
        }
    }

    /// Mark the handle as not yet placed.
    pub(crate) fn first(mut self) -> Self {
        self.is_first = true;
        self
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_first(&self) -> bool {
        self.is_first
    }

    pub(crate) fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Check if a point hits this handle. Both points must share a space.
    pub fn hit_test(position: Point, point: Point, tolerance: f64) -> bool {
        let dx = point.x - position.x;
        let dy = point.y - position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}
