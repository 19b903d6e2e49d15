//! Joint head circle.

use crate::geometry::euclidean_distance;
use crate::handle::{Handle, HandleRole};
use crate::stats::SampleRegion;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Circle centered on `start` passing through `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadCircle {
    start: Handle,
    end: Handle,
}

impl HeadCircle {
    /// Create a zero-radius circle at `point`.
    pub fn new(point: Point) -> Self {
        let mut end = Handle::new(point);
        end.active = true;
        Self {
            start: Handle::new(point),
            end,
        }
    }

    pub fn start(&self) -> &Handle {
        &self.start
    }

    pub fn end(&self) -> &Handle {
        &self.end
    }

    pub fn center(&self) -> Point {
        self.start.position
    }

    /// Radius in image pixels.
    pub fn radius(&self) -> f64 {
        euclidean_distance(self.start.position, self.end.position)
    }

    /// Circles have no corner handles.
    pub fn handle(&self, role: HandleRole) -> Option<&Handle> {
        match role {
            HandleRole::Start => Some(&self.start),
            HandleRole::End => Some(&self.end),
            HandleRole::Corner1 | HandleRole::Corner2 => None,
        }
    }

    pub(crate) fn handle_mut(&mut self, role: HandleRole) -> Option<&mut Handle> {
        match role {
            HandleRole::Start => Some(&mut self.start),
            HandleRole::End => Some(&mut self.end),
            HandleRole::Corner1 | HandleRole::Corner2 => None,
        }
    }

    /// Move a handle. Returns false for roles the circle does not have.
    pub fn set_handle(&mut self, role: HandleRole, point: Point) -> bool {
        match self.handle_mut(role) {
            Some(handle) => {
                handle.position = point;
                true
            }
            None => false,
        }
    }

    pub(crate) fn translate(&mut self, delta: Vec2) {
        self.start.translate(delta);
        self.end.translate(delta);
    }

    pub fn vertices(&self) -> [Point; 2] {
        [self.start.position, self.end.position]
    }

    pub fn bounds(&self) -> Rect {
        let r = self.radius();
        let c = self.center();
        Rect::new(c.x - r, c.y - r, c.x + r, c.y + r)
    }

    pub(crate) fn region(&self) -> SampleRegion {
        SampleRegion::Circle {
            center: self.center(),
            radius: self.radius(),
        }
    }
}
