//! Measurement definitions: the shaft axis rectangle and the joint head circle.

mod axis;
mod head;

pub use axis::AxisRect;
pub use head::HeadCircle;

use crate::handle::{Handle, HandleRole};
use crate::stats::{SampleRegion, Stats};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Unique identifier for measurements.
pub type MeasurementId = Uuid;

/// The two kinds of shape a session can hold, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementKind {
    RectangularAxis,
    CircularHead,
}

/// Shape geometry of a measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    RectangularAxis(AxisRect),
    CircularHead(HeadCircle),
}

impl Shape {
    pub fn kind(&self) -> MeasurementKind {
        match self {
            Shape::RectangularAxis(_) => MeasurementKind::RectangularAxis,
            Shape::CircularHead(_) => MeasurementKind::CircularHead,
        }
    }

    pub fn handle(&self, role: HandleRole) -> Option<&Handle> {
        match self {
            Shape::RectangularAxis(r) => Some(r.handle(role)),
            Shape::CircularHead(c) => c.handle(role),
        }
    }

    /// Roles of the handles this shape owns, in drawing order.
    pub fn roles(&self) -> &'static [HandleRole] {
        match self {
            Shape::RectangularAxis(_) => &[HandleRole::Start, HandleRole::End, HandleRole::Corner1, HandleRole::Corner2],
            Shape::CircularHead(_) => &[HandleRole::Start, HandleRole::End],
        }
    }

    /// All handles with their roles.
    pub fn handles(&self) -> Vec<(HandleRole, &Handle)> {
        self.roles()
            .iter()
            .filter_map(|&role| self.handle(role).map(|h| (role, h)))
            .collect()
    }

    pub(crate) fn handle_mut(&mut self, role: HandleRole) -> Option<&mut Handle> {
        match self {
            Shape::RectangularAxis(r) => Some(r.handle_mut(role)),
            Shape::CircularHead(c) => c.handle_mut(role),
        }
    }

    /// Positions of the `start` and `end` handles.
    pub fn endpoints(&self) -> (Point, Point) {
        match self {
            Shape::RectangularAxis(r) => (r.start().position(), r.end().position()),
            Shape::CircularHead(c) => (c.start().position(), c.end().position()),
        }
    }

    /// Points used for hit-testing and label anchoring.
    pub fn vertices(&self) -> Vec<Point> {
        match self {
            Shape::RectangularAxis(r) => r.vertices().to_vec(),
            Shape::CircularHead(c) => c.vertices().to_vec(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::RectangularAxis(r) => r.bounds(),
            Shape::CircularHead(c) => c.bounds(),
        }
    }

    pub fn as_axis(&self) -> Option<&AxisRect> {
        match self {
            Shape::RectangularAxis(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_head(&self) -> Option<&HeadCircle> {
        match self {
            Shape::CircularHead(c) => Some(c),
            _ => None,
        }
    }

    pub fn region(&self) -> SampleRegion {
        match self {
            Shape::RectangularAxis(r) => r.region(),
            Shape::CircularHead(c) => c.region(),
        }
    }
}

/// State captured when a drag starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub shape: Shape,
    pub text_box: TextBox,
}

/// Label box attached to a measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    /// Whether the user dragged the label away from its default spot.
    pub has_moved: bool,
    /// Position in image coordinates, filled on first render.
    pub position: Option<Point>,
    pub active: bool,
    pub moves_independently: bool,
    pub drawn_independently: bool,
    pub allowed_outside_image: bool,
    pub has_bounding_box: bool,
}

impl Default for TextBox {
    fn default() -> Self {
        Self {
            has_moved: false,
            position: None,
            active: false,
            moves_independently: false,
            drawn_independently: true,
            allowed_outside_image: true,
            has_bounding_box: true,
        }
    }
}

/// One placed shape with its state and cached statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub(crate) id: MeasurementId,
    pub(crate) shape: Shape,
    pub visible: bool,
    /// Hover/selection highlight.
    pub active: bool,
    /// Cached statistics are stale.
    pub(crate) invalidated: bool,
    pub(crate) cached_stats: Option<Stats>,
    pub text_box: TextBox,
    /// When the cached statistics were last recomputed.
    #[serde(skip)]
    pub(crate) last_stats_refresh: Option<Instant>,
}

impl Measurement {
    fn with_shape(shape: Shape) -> Self {
        Self {
            id: Uuid::new_v4(),
            shape,
            visible: true,
            active: true,
            invalidated: true,
            cached_stats: None,
            text_box: TextBox::default(),
            last_stats_refresh: None,
        }
    }

    /// Create a zero-size shaft rectangle at `point`.
    pub fn axis(point: Point, rotation: f64) -> Self {
        Self::with_shape(Shape::RectangularAxis(AxisRect::new(point, rotation)))
    }

    /// Create a zero-radius head circle at `point`.
    pub fn head(point: Point) -> Self {
        Self::with_shape(Shape::CircularHead(HeadCircle::new(point)))
    }

    pub fn id(&self) -> MeasurementId {
        self.id
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn kind(&self) -> MeasurementKind {
        self.shape.kind()
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    pub fn cached_stats(&self) -> Option<&Stats> {
        self.cached_stats.as_ref()
    }

    pub fn last_stats_refresh(&self) -> Option<Instant> {
        self.last_stats_refresh
    }

    /// Move one handle, keeping derived corners consistent.
    /// Returns false if the shape has no such handle.
    pub fn update_handle(&mut self, role: HandleRole, point: Point) -> bool {
        let updated = match &mut self.shape {
            Shape::RectangularAxis(r) => {
                r.set_handle(role, point);
                true
            }
            Shape::CircularHead(c) => c.set_handle(role, point),
        };
        if updated {
            self.invalidated = true;
        }
        updated
    }

    /// Move every handle by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        match &mut self.shape {
            Shape::RectangularAxis(r) => r.translate(delta),
            Shape::CircularHead(c) => c.translate(delta),
        }
        if self.text_box.has_moved {
            if let Some(pos) = self.text_box.position.as_mut() {
                *pos += delta;
            }
        }
        self.invalidated = true;
    }

    /// Commit a finished placement.
    pub(crate) fn finalize_placement(&mut self) {
        if let Shape::RectangularAxis(r) = &mut self.shape {
            r.finalize();
        }
    }

    /// Whether any handle lies outside `bounds`. The label box may leave the image.
    pub fn any_handle_outside(&self, bounds: Rect) -> bool {
        self.shape
            .vertices()
            .iter()
            .any(|&p| !crate::geometry::point_in_bounds(p, bounds))
    }

    /// Set the hover flag on one handle, clearing it on the others.
    /// Returns true if any flag changed.
    pub(crate) fn activate_handle(&mut self, role: Option<HandleRole>) -> bool {
        let mut changed = false;
        for &r in self.shape.roles() {
            if let Some(handle) = self.shape.handle_mut(r) {
                let want = Some(r) == role;
                if handle.active != want {
                    handle.active = want;
                    changed = true;
                }
            }
        }
        changed
    }

    /// Geometry and label placement, for rolling back a drag.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            shape: self.shape.clone(),
            text_box: self.text_box.clone(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.shape = snapshot.shape;
        self.text_box = snapshot.text_box;
        self.invalidated = true;
    }

    pub(crate) fn store_stats(&mut self, stats: Stats, now: Instant) {
        self.cached_stats = Some(stats);
        self.invalidated = false;
        self.last_stats_refresh = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_measurement_state() {
        let m = Measurement::axis(Point::new(1.0, 1.0), 0.0);
        assert!(m.visible);
        assert!(m.is_invalidated());
        assert!(m.cached_stats().is_none());
        assert_eq!(m.kind(), MeasurementKind::RectangularAxis);
        assert_eq!(m.shape().handles().len(), 4);
        assert_eq!(Measurement::head(Point::ZERO).shape().handles().len(), 2);
    }

    #[test]
    fn test_update_handle_invalidates() {
        let mut m = Measurement::axis(Point::new(0.0, 0.0), 0.0);
        m.invalidated = false;
        assert!(m.update_handle(HandleRole::End, Point::new(10.0, 4.0)));
        assert!(m.is_invalidated());
        let corner1 = m.shape().handle(HandleRole::Corner1).map(|h| h.position());
        assert_eq!(corner1, Some(Point::new(0.0, 4.0)));
    }

    #[test]
    fn test_any_handle_outside() {
        let bounds = Rect::new(0.0, 0.0, 20.0, 20.0);
        let mut m = Measurement::axis(Point::new(2.0, 2.0), 0.0);
        m.update_handle(HandleRole::End, Point::new(10.0, 10.0));
        assert!(!m.any_handle_outside(bounds));
        m.update_handle(HandleRole::End, Point::new(-1.0, 3.0));
        assert!(m.any_handle_outside(bounds));
    }

    #[test]
    fn test_activate_handle_reports_change() {
        let mut m = Measurement::head(Point::new(5.0, 5.0));
        // End starts active.
        assert!(!m.activate_handle(Some(HandleRole::End)));
        assert!(m.activate_handle(Some(HandleRole::Start)));
        assert!(m.activate_handle(None));
        assert!(!m.activate_handle(None));
    }

    #[test]
    fn test_translate_moves_label_only_if_moved() {
        let mut m = Measurement::head(Point::new(5.0, 5.0));
        m.text_box.position = Some(Point::new(8.0, 8.0));
        m.translate(Vec2::new(1.0, 0.0));
        assert_eq!(m.text_box.position, Some(Point::new(8.0, 8.0)));
        m.text_box.has_moved = true;
        m.translate(Vec2::new(1.0, 0.0));
        assert_eq!(m.text_box.position, Some(Point::new(9.0, 8.0)));
    }
}
