//! Per-image collection of the axis and head measurements.

use crate::error::{AnnotationError, AnnotationResult};
use crate::handle::HandleRole;
use crate::host::{ImageInfo, PixelSampler, ValueAdjuster};
use crate::measurement::{AxisRect, HeadCircle, Measurement, MeasurementId, MeasurementKind};
use crate::stats::{RefreshDecision, StatsEngine};
use kurbo::Point;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Ordered pair of shapes on one display surface.
///
/// Holds at most one `RectangularAxis` and, only while that exists, at most
/// one `CircularHead`. The axis is always first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    measurements: Vec<Measurement>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the next shape at `point`: the axis if absent, else the head.
    pub fn create_measurement(&mut self, point: Point, rotation: f64) -> AnnotationResult<&mut Measurement> {
        let measurement = match self.next_kind() {
            Some(MeasurementKind::RectangularAxis) => Measurement::axis(point, rotation),
            Some(MeasurementKind::CircularHead) => Measurement::head(point),
            None => return Err(AnnotationError::SessionFull),
        };
        self.measurements.push(measurement);
        let index = self.measurements.len() - 1;
        Ok(&mut self.measurements[index])
    }

    /// Kind the next creation would produce, or `None` when complete.
    pub fn next_kind(&self) -> Option<MeasurementKind> {
        if !self.contains_kind(MeasurementKind::RectangularAxis) {
            Some(MeasurementKind::RectangularAxis)
        } else if !self.contains_kind(MeasurementKind::CircularHead) {
            Some(MeasurementKind::CircularHead)
        } else {
            None
        }
    }

    pub fn contains_kind(&self, kind: MeasurementKind) -> bool {
        self.measurements.iter().any(|m| m.kind() == kind)
    }

    /// Both shapes are present; pointer-down no longer creates.
    pub fn is_creation_complete(&self) -> bool {
        self.next_kind().is_none()
    }

    /// Remove a measurement by identity. Removing the axis also removes the
    /// head, which has nothing to align to without it. No-op if absent.
    pub fn remove_measurement(&mut self, id: MeasurementId) -> Vec<Measurement> {
        let Some(index) = self.index_of(id) else {
            return Vec::new();
        };
        let removed = self.measurements.remove(index);
        let mut out = Vec::new();
        if removed.kind() == MeasurementKind::RectangularAxis {
            out.extend(self.take_kind(MeasurementKind::CircularHead));
        }
        out.insert(0, removed);
        out
    }

    fn take_kind(&mut self, kind: MeasurementKind) -> Vec<Measurement> {
        let (taken, kept) = std::mem::take(&mut self.measurements)
            .into_iter()
            .partition(|m| m.kind() == kind);
        self.measurements = kept;
        taken
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.measurements.clear();
    }

    fn index_of(&self, id: MeasurementId) -> Option<usize> {
        self.measurements.iter().position(|m| m.id() == id)
    }

    pub fn get(&self, id: MeasurementId) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.id() == id)
    }

    pub fn get_mut(&mut self, id: MeasurementId) -> Option<&mut Measurement> {
        self.measurements.iter_mut().find(|m| m.id() == id)
    }

    /// Move a handle of a measurement.
    pub fn update_handle(&mut self, id: MeasurementId, role: HandleRole, point: Point) -> AnnotationResult<bool> {
        let measurement = self.get_mut(id).ok_or(AnnotationError::NotFound(id))?;
        Ok(measurement.update_handle(role, point))
    }

    /// Measurements in creation order.
    pub fn measurements(&self) -> impl Iterator<Item = &Measurement> {
        self.measurements.iter()
    }

    pub fn measurements_mut(&mut self) -> impl Iterator<Item = &mut Measurement> {
        self.measurements.iter_mut()
    }

    pub fn axis(&self) -> Option<&AxisRect> {
        self.measurements.iter().find_map(|m| m.shape().as_axis())
    }

    pub fn head(&self) -> Option<&HeadCircle> {
        self.measurements.iter().find_map(|m| m.shape().as_head())
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// Refresh stale statistics of visible measurements, honoring the throttle.
    /// Returns how many were recomputed.
    pub fn refresh_stats(
        &mut self,
        engine: &StatsEngine,
        sampler: &dyn PixelSampler,
        info: &ImageInfo,
        adjuster: &dyn ValueAdjuster,
        now: Instant,
    ) -> usize {
        let mut refreshed = 0;
        for measurement in self.measurements.iter_mut().filter(|m| m.visible) {
            if engine.refresh_if_needed(measurement, sampler, info, adjuster, now) {
                refreshed += 1;
            }
        }
        refreshed
    }

    /// Earliest instant at which a deferred refresh becomes eligible.
    pub fn next_stats_deadline(&self, engine: &StatsEngine, now: Instant) -> Option<Instant> {
        self.measurements
            .iter()
            .filter_map(|m| match engine.decide(m, now) {
                RefreshDecision::Deferred(at) => Some(at),
                _ => None,
            })
            .min()
    }

    /// Serialize the session to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NoAdjustment;
    use crate::stats::PixelBounds;
    use std::time::Duration;

    struct Flat;

    impl PixelSampler for Flat {
        fn sample_pixels(&self, bounds: PixelBounds) -> AnnotationResult<Vec<f64>> {
            Ok(vec![7.0; bounds.pixel_count()])
        }
    }

    fn kinds(session: &Session) -> Vec<MeasurementKind> {
        session.measurements().map(|m| m.kind()).collect()
    }

    #[test]
    fn test_creation_order() {
        let mut session = Session::new();
        let first = session.create_measurement(Point::new(1.0, 1.0), 0.0).unwrap();
        assert_eq!(first.kind(), MeasurementKind::RectangularAxis);
        assert_eq!(first.shape().handle(HandleRole::End).map(|h| h.position()), Some(Point::new(1.0, 1.0)));
        let second = session.create_measurement(Point::new(5.0, 5.0), 0.0).unwrap();
        assert_eq!(second.kind(), MeasurementKind::CircularHead);
        assert!(session.is_creation_complete());
    }

    #[test]
    fn test_third_creation_rejected_without_mutation() {
        let mut session = Session::new();
        session.create_measurement(Point::ZERO, 0.0).unwrap();
        session.create_measurement(Point::ZERO, 0.0).unwrap();
        let err = session.create_measurement(Point::ZERO, 0.0).unwrap_err();
        assert_eq!(err, AnnotationError::SessionFull);
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut session = Session::new();
        let id = session.create_measurement(Point::ZERO, 0.0).unwrap().id();
        assert_eq!(session.remove_measurement(id).len(), 1);
        assert!(session.remove_measurement(id).is_empty());
        assert!(session.is_empty());
    }

    #[test]
    fn test_removing_axis_removes_head() {
        let mut session = Session::new();
        let axis = session.create_measurement(Point::ZERO, 0.0).unwrap().id();
        session.create_measurement(Point::new(3.0, 3.0), 0.0).unwrap();
        let removed = session.remove_measurement(axis);
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].id(), axis);
        assert!(session.is_empty());
    }

    #[test]
    fn test_removed_kind_can_be_recreated() {
        let mut session = Session::new();
        session.create_measurement(Point::ZERO, 0.0).unwrap();
        let head = session.create_measurement(Point::new(3.0, 3.0), 0.0).unwrap().id();
        session.remove_measurement(head);
        assert_eq!(session.next_kind(), Some(MeasurementKind::CircularHead));
        session.create_measurement(Point::new(4.0, 4.0), 0.0).unwrap();
        assert_eq!(kinds(&session), vec![MeasurementKind::RectangularAxis, MeasurementKind::CircularHead]);
    }

    #[test]
    fn test_session_invariant_under_mixed_operations() {
        let mut session = Session::new();
        let mut ids = Vec::new();
        for step in 0..20 {
            if step % 3 == 2 {
                if let Some(id) = ids.pop() {
                    session.remove_measurement(id);
                }
            } else if let Ok(m) = session.create_measurement(Point::new(step as f64, 0.0), 0.0) {
                ids.push(m.id());
            }
            let k = kinds(&session);
            let axes = k.iter().filter(|k| **k == MeasurementKind::RectangularAxis).count();
            let heads = k.iter().filter(|k| **k == MeasurementKind::CircularHead).count();
            assert!(axes <= 1);
            assert!(heads <= 1);
            assert!(heads == 0 || axes == 1);
            ids.retain(|id| session.get(*id).is_some());
        }
    }

    #[test]
    fn test_update_handle_unknown_id() {
        let mut session = Session::new();
        let missing = uuid::Uuid::new_v4();
        assert_eq!(
            session.update_handle(missing, HandleRole::End, Point::ZERO),
            Err(AnnotationError::NotFound(missing))
        );
    }

    #[test]
    fn test_refresh_and_deadline() {
        let mut session = Session::new();
        let engine = StatsEngine::new();
        let id = session.create_measurement(Point::ZERO, 0.0).unwrap().id();
        session.update_handle(id, HandleRole::End, Point::new(4.0, 4.0)).unwrap();
        let t0 = Instant::now();
        assert_eq!(session.refresh_stats(&engine, &Flat, &ImageInfo::default(), &NoAdjustment, t0), 1);
        assert_eq!(session.get(id).and_then(|m| m.cached_stats()).map(|s| s.count), Some(16));

        session.update_handle(id, HandleRole::End, Point::new(5.0, 5.0)).unwrap();
        let t1 = t0 + Duration::from_millis(30);
        assert_eq!(session.refresh_stats(&engine, &Flat, &ImageInfo::default(), &NoAdjustment, t1), 0);
        assert_eq!(session.next_stats_deadline(&engine, t1), Some(t0 + engine.interval()));
    }
}
