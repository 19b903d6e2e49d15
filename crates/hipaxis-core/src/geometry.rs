//! Geometry kernel: pure functions over image-space points.
//!
//! Nothing here touches a rendering context, so every function can be
//! tested on its own.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Squared lengths below this are treated as zero.
const DEGENERATE_EPSILON: f64 = 1e-12;

/// A derived line segment, e.g. the long-axis midline of the shaft rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisLine {
    pub p1: Point,
    pub p2: Point,
}

impl AxisLine {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    /// Direction vector from `p1` to `p2`.
    pub fn direction(&self) -> Vec2 {
        self.p2 - self.p1
    }

    pub fn length(&self) -> f64 {
        self.direction().hypot()
    }

    /// Whether both endpoints coincide.
    pub fn is_degenerate(&self) -> bool {
        self.direction().hypot2() < DEGENERATE_EPSILON
    }

    /// Same line with the endpoints swapped.
    pub fn reversed(&self) -> Self {
        Self::new(self.p2, self.p1)
    }

    pub fn as_kurbo(&self) -> kurbo::Line {
        kurbo::Line::new(self.p1, self.p2)
    }
}

/// Corners of the axis-aligned rectangle spanned by `start` and `end`.
///
/// Returns `(corner1, corner2)` with `corner1 = (start.x, end.y)` and
/// `corner2 = (end.x, start.y)`.
pub fn rectangle_from_corners(start: Point, end: Point) -> (Point, Point) {
    (Point::new(start.x, end.y), Point::new(end.x, start.y))
}

/// Midline along the long dimension of a rectangle.
///
/// `vertices` is `[start, end, corner1, corner2]`, the order produced by
/// [`crate::measurement::AxisRect::vertices`]. The edges `start-corner1` and
/// `corner2-end` are one opposite pair, `start-corner2` and `corner1-end` the
/// other. The returned segment joins the midpoints of the short pair.
///
/// Ties (squares, zero-size rectangles) resolve to the `start-corner2` edge
/// being the long one, so the midline joins `mid(start, corner1)` and
/// `mid(corner2, end)`. Swapping `start` and `end` yields the same line with
/// its endpoints swapped.
pub fn long_axis_midline(vertices: &[Point; 4]) -> AxisLine {
    let [start, end, corner1, corner2] = *vertices;
    let edge_a = (corner1 - start).hypot();
    let edge_b = (corner2 - start).hypot();

    if edge_b >= edge_a {
        AxisLine::new(start.midpoint(corner1), corner2.midpoint(end))
    } else {
        AxisLine::new(start.midpoint(corner2), corner1.midpoint(end))
    }
}

/// Projection of `point` onto the infinite line through `line`.
///
/// A degenerate line (both endpoints equal) projects everything to `line.p1`.
pub fn perpendicular_foot(line: &AxisLine, point: Point) -> Point {
    let dir = line.direction();
    let len_sq = dir.hypot2();
    if len_sq < DEGENERATE_EPSILON {
        return line.p1;
    }
    let t = (point - line.p1).dot(dir) / len_sq;
    line.p1 + dir * t
}

pub fn euclidean_distance(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}

/// Whether `point` lies inside `bounds`, edges included.
pub fn point_in_bounds(point: Point, bounds: Rect) -> bool {
    point.x >= bounds.x0 && point.x <= bounds.x1 && point.y >= bounds.y0 && point.y <= bounds.y1
}

/// Normalized rectangle spanned by two points.
pub fn bounds_of(a: Point, b: Point) -> Rect {
    Rect::from_points(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point_eq(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9, "{a:?} != {b:?}");
    }

    fn vertices(start: Point, end: Point) -> [Point; 4] {
        let (c1, c2) = rectangle_from_corners(start, end);
        [start, end, c1, c2]
    }

    #[test]
    fn test_rectangle_from_corners() {
        let (c1, c2) = rectangle_from_corners(Point::new(0.0, 0.0), Point::new(10.0, 4.0));
        assert_point_eq(c1, Point::new(0.0, 4.0));
        assert_point_eq(c2, Point::new(10.0, 0.0));
    }

    #[test]
    fn test_rectangle_is_axis_aligned() {
        let pairs = [
            (Point::new(3.0, 7.0), Point::new(-2.0, 11.5)),
            (Point::new(100.0, 20.0), Point::new(40.0, 5.0)),
            (Point::new(0.0, 0.0), Point::new(0.0, 9.0)),
        ];
        for (start, end) in pairs {
            let (c1, c2) = rectangle_from_corners(start, end);
            // Every edge is horizontal or vertical.
            assert_eq!(start.x, c1.x);
            assert_eq!(c1.y, end.y);
            assert_eq!(end.x, c2.x);
            assert_eq!(c2.y, start.y);
            // Diagonals of a rectangle have equal length.
            let d1 = euclidean_distance(start, end);
            let d2 = euclidean_distance(c1, c2);
            assert!((d1 - d2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_midline_long_axis_along_x() {
        let line = long_axis_midline(&vertices(Point::new(0.0, 0.0), Point::new(10.0, 4.0)));
        assert_point_eq(line.p1, Point::new(0.0, 2.0));
        assert_point_eq(line.p2, Point::new(10.0, 2.0));
    }

    #[test]
    fn test_midline_long_axis_along_y() {
        let line = long_axis_midline(&vertices(Point::new(0.0, 0.0), Point::new(4.0, 10.0)));
        assert_point_eq(line.p1, Point::new(2.0, 0.0));
        assert_point_eq(line.p2, Point::new(2.0, 10.0));
    }

    #[test]
    fn test_midline_swap_invariance() {
        let cases = [
            (Point::new(0.0, 0.0), Point::new(10.0, 4.0)),
            (Point::new(5.0, 2.0), Point::new(1.0, 30.0)),
            (Point::new(7.0, 7.0), Point::new(12.0, 12.0)),
        ];
        for (start, end) in cases {
            let forward = long_axis_midline(&vertices(start, end));
            let swapped = long_axis_midline(&vertices(end, start));
            let same = (forward.p1 - swapped.p1).hypot() < 1e-9 && (forward.p2 - swapped.p2).hypot() < 1e-9;
            let flipped = (forward.p1 - swapped.p2).hypot() < 1e-9 && (forward.p2 - swapped.p1).hypot() < 1e-9;
            assert!(same || flipped, "{forward:?} vs {swapped:?}");
        }
    }

    #[test]
    fn test_midline_square_tie_break_is_horizontal() {
        let line = long_axis_midline(&vertices(Point::new(0.0, 0.0), Point::new(6.0, 6.0)));
        assert_point_eq(line.p1, Point::new(0.0, 3.0));
        assert_point_eq(line.p2, Point::new(6.0, 3.0));
    }

    #[test]
    fn test_midline_zero_size() {
        let p = Point::new(3.0, 4.0);
        let line = long_axis_midline(&vertices(p, p));
        assert!(line.is_degenerate());
        assert_point_eq(line.p1, p);
    }

    #[test]
    fn test_perpendicular_foot_scenario() {
        let line = AxisLine::new(Point::new(0.0, 2.0), Point::new(10.0, 2.0));
        assert_point_eq(perpendicular_foot(&line, Point::new(5.0, 10.0)), Point::new(5.0, 2.0));
    }

    #[test]
    fn test_perpendicular_foot_is_orthogonal() {
        let lines = [
            AxisLine::new(Point::new(1.0, 1.0), Point::new(4.0, 9.0)),
            AxisLine::new(Point::new(-3.0, 2.0), Point::new(8.0, -5.0)),
            AxisLine::new(Point::new(0.0, 0.0), Point::new(0.0, 1.0)),
        ];
        let points = [Point::new(10.0, -2.0), Point::new(0.5, 0.5), Point::new(-7.0, 13.0)];
        for line in &lines {
            for &p in &points {
                let foot = perpendicular_foot(line, p);
                let dot = (p - foot).dot(line.direction());
                assert!(dot.abs() < 1e-9, "dot = {dot}");
                // Foot is collinear with the line.
                let cross = (foot - line.p1).cross(line.direction());
                assert!(cross.abs() < 1e-9, "cross = {cross}");
            }
        }
    }

    #[test]
    fn test_perpendicular_foot_degenerate_line() {
        let p = Point::new(2.0, 2.0);
        let line = AxisLine::new(p, p);
        assert_point_eq(perpendicular_foot(&line, Point::new(9.0, -1.0)), p);
    }

    #[test]
    fn test_point_in_bounds_inclusive() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(point_in_bounds(Point::new(0.0, 10.0), bounds));
        assert!(!point_in_bounds(Point::new(-1.0, 3.0), bounds));
        assert!(!point_in_bounds(Point::new(5.0, 10.01), bounds));
    }
}
