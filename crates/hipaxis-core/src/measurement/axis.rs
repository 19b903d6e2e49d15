//! Shaft axis rectangle.

use crate::geometry::{AxisLine, long_axis_midline, rectangle_from_corners};
use crate::handle::{Handle, HandleRole};
use crate::stats::SampleRegion;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle spanned by `start` and `end`, marking the
/// prosthesis stem. The corners are derived and never set directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisRect {
    start: Handle,
    end: Handle,
    corner1: Handle,
    corner2: Handle,
    /// Viewport rotation in degrees when the rectangle was created.
    initial_rotation: f64,
}

impl AxisRect {
    /// Create a zero-size rectangle at `point`.
    pub fn new(point: Point, initial_rotation: f64) -> Self {
        let mut end = Handle::new(point);
        end.active = true;
        Self {
            start: Handle::new(point),
            end,
            corner1: Handle::new(point).first(),
            corner2: Handle::new(point).first(),
            initial_rotation,
        }
    }

    pub fn start(&self) -> &Handle {
        &self.start
    }

    pub fn end(&self) -> &Handle {
        &self.end
    }

    pub fn corner1(&self) -> &Handle {
        &self.corner1
    }

    pub fn corner2(&self) -> &Handle {
        &self.corner2
    }

    pub fn initial_rotation(&self) -> f64 {
        self.initial_rotation
    }

    pub fn handle(&self, role: HandleRole) -> &Handle {
        match role {
            HandleRole::Start => &self.start,
            HandleRole::End => &self.end,
            HandleRole::Corner1 => &self.corner1,
            HandleRole::Corner2 => &self.corner2,
        }
    }

    pub(crate) fn handle_mut(&mut self, role: HandleRole) -> &mut Handle {
        match role {
            HandleRole::Start => &mut self.start,
            HandleRole::End => &mut self.end,
            HandleRole::Corner1 => &mut self.corner1,
            HandleRole::Corner2 => &mut self.corner2,
        }
    }

    /// Move one handle. Dragging a corner moves the coordinates of `start`
    /// and `end` it is derived from.
    pub fn set_handle(&mut self, role: HandleRole, point: Point) {
        match role {
            HandleRole::Start => self.start.position = point,
            HandleRole::End => self.end.position = point,
            HandleRole::Corner1 => {
                self.start.position.x = point.x;
                self.end.position.y = point.y;
            }
            HandleRole::Corner2 => {
                self.end.position.x = point.x;
                self.start.position.y = point.y;
            }
        }
        self.sync_corners();
    }

    fn sync_corners(&mut self) {
        let (c1, c2) = rectangle_from_corners(self.start.position, self.end.position);
        self.corner1.position = c1;
        self.corner2.position = c2;
        if self.start.position != self.end.position {
            self.corner1.is_first = false;
            self.corner2.is_first = false;
        }
    }

    /// Commit the corners once the initial placement is released.
    pub(crate) fn finalize(&mut self) {
        self.sync_corners();
        self.corner1.is_first = false;
        self.corner2.is_first = false;
    }

    pub(crate) fn translate(&mut self, delta: Vec2) {
        self.start.translate(delta);
        self.end.translate(delta);
        self.sync_corners();
    }

    /// `[start, end, corner1, corner2]` in image coordinates.
    pub fn vertices(&self) -> [Point; 4] {
        [
            self.start.position,
            self.end.position,
            self.corner1.position,
            self.corner2.position,
        ]
    }

    /// Corners in perimeter order, for drawing the outline.
    pub fn outline(&self) -> [Point; 4] {
        [
            self.start.position,
            self.corner2.position,
            self.end.position,
            self.corner1.position,
        ]
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.start.position, self.end.position)
    }

    /// Midline running along the long dimension.
    pub fn midline(&self) -> AxisLine {
        long_axis_midline(&self.vertices())
    }

    pub(crate) fn region(&self) -> SampleRegion {
        SampleRegion::Rect(self.bounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero_size_with_first_corners() {
        let rect = AxisRect::new(Point::new(3.0, 4.0), 90.0);
        assert_eq!(rect.start().position(), rect.end().position());
        assert!(rect.corner1().is_first());
        assert!(rect.corner2().is_first());
        assert!(rect.end().active);
        assert_eq!(rect.initial_rotation(), 90.0);
    }

    #[test]
    fn test_set_end_updates_corners() {
        let mut rect = AxisRect::new(Point::new(0.0, 0.0), 0.0);
        rect.set_handle(HandleRole::End, Point::new(10.0, 4.0));
        assert_eq!(rect.corner1().position(), Point::new(0.0, 4.0));
        assert_eq!(rect.corner2().position(), Point::new(10.0, 0.0));
        assert!(!rect.corner1().is_first());
        assert!(!rect.corner2().is_first());
    }

    #[test]
    fn test_corner_drag_keeps_rectangle() {
        let mut rect = AxisRect::new(Point::new(0.0, 0.0), 0.0);
        rect.set_handle(HandleRole::End, Point::new(10.0, 4.0));
        rect.set_handle(HandleRole::Corner1, Point::new(-2.0, 6.0));
        assert_eq!(rect.start().position(), Point::new(-2.0, 0.0));
        assert_eq!(rect.end().position(), Point::new(10.0, 6.0));
        assert_eq!(rect.corner1().position(), Point::new(-2.0, 6.0));
        assert_eq!(rect.corner2().position(), Point::new(10.0, 0.0));

        rect.set_handle(HandleRole::Corner2, Point::new(12.0, -1.0));
        assert_eq!(rect.start().position(), Point::new(-2.0, -1.0));
        assert_eq!(rect.end().position(), Point::new(12.0, 6.0));
        assert_eq!(rect.corner2().position(), Point::new(12.0, -1.0));
    }

    #[test]
    fn test_translate_moves_all_vertices() {
        let mut rect = AxisRect::new(Point::new(0.0, 0.0), 0.0);
        rect.set_handle(HandleRole::End, Point::new(10.0, 4.0));
        rect.translate(Vec2::new(5.0, 5.0));
        assert_eq!(
            rect.vertices(),
            [
                Point::new(5.0, 5.0),
                Point::new(15.0, 9.0),
                Point::new(5.0, 9.0),
                Point::new(15.0, 5.0),
            ]
        );
    }

    #[test]
    fn test_midline_scenario() {
        let mut rect = AxisRect::new(Point::new(0.0, 0.0), 0.0);
        rect.set_handle(HandleRole::End, Point::new(10.0, 4.0));
        let line = rect.midline();
        assert_eq!(line.p1, Point::new(0.0, 2.0));
        assert_eq!(line.p2, Point::new(10.0, 2.0));
    }

    #[test]
    fn test_outline_walks_the_perimeter() {
        let mut rect = AxisRect::new(Point::new(0.0, 0.0), 0.0);
        rect.set_handle(HandleRole::End, Point::new(10.0, 4.0));
        let outline = rect.outline();
        for i in 0..4 {
            let (a, b) = (outline[i], outline[(i + 1) % 4]);
            // Consecutive corners share exactly one coordinate.
            assert!((a.x == b.x) != (a.y == b.y));
        }
    }
}
