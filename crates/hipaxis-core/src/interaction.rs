//! Pointer-driven interaction: placing, handle drags and whole-shape drags.
//!
//! Only one drag can be in flight at a time, so the state machine is the
//! single writer of measurement geometry between renders.

use crate::config::{HANDLE_GRAB_RADIUS, MOUSE_NEAR_DISTANCE, TOUCH_NEAR_DISTANCE, ToolConfig};
use crate::error::{AnnotationError, AnnotationResult};
use crate::geometry::euclidean_distance;
use crate::handle::{Handle, HandleRole};
use crate::host::{ImageInfo, ImageView, NoAdjustment, PixelSampler, ValueAdjuster, Viewport};
use crate::input::{PointerEvent, PointerKind, PointerPhase};
use crate::measurement::{Measurement, MeasurementId, Snapshot};
use crate::session::Session;
use crate::stats::StatsEngine;
use kurbo::Point;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Everything the tool needs from the host for one callback.
#[derive(Clone, Copy)]
pub struct ToolContext<'a> {
    pub view: &'a dyn ImageView,
    pub sampler: &'a dyn PixelSampler,
    pub info: &'a ImageInfo,
    pub adjuster: &'a dyn ValueAdjuster,
    pub viewport: Viewport,
    pub now: Instant,
}

impl<'a> ToolContext<'a> {
    pub fn new(view: &'a dyn ImageView, sampler: &'a dyn PixelSampler, info: &'a ImageInfo, now: Instant) -> Self {
        Self {
            view,
            sampler,
            info,
            adjuster: &NoAdjustment,
            viewport: Viewport::default(),
            now,
        }
    }

    pub fn with_adjuster(mut self, adjuster: &'a dyn ValueAdjuster) -> Self {
        self.adjuster = adjuster;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_now(mut self, now: Instant) -> Self {
        self.now = now;
        self
    }
}

/// State of the interaction.
#[derive(Debug, Clone, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// A new measurement whose `end` handle follows the pointer.
    Placing { id: MeasurementId },
    /// One handle follows the pointer.
    DraggingHandle {
        id: MeasurementId,
        role: HandleRole,
        /// State before the drag, restored if the tool is deactivated.
        original: Snapshot,
    },
    /// The whole shape follows the pointer.
    DraggingShape {
        id: MeasurementId,
        /// Last pointer position in image coordinates.
        last: Point,
        original: Snapshot,
    },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Measurement being placed or dragged.
    pub fn target(&self) -> Option<MeasurementId> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Placing { id }
            | InteractionState::DraggingHandle { id, .. }
            | InteractionState::DraggingShape { id, .. } => Some(*id),
        }
    }
}

/// Notifications for the host.
#[derive(Debug, Clone)]
pub enum ToolEvent {
    /// Emitted once per successfully finished placement.
    MeasurementCompleted(Measurement),
}

/// Result of a pointer release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Nothing was being dragged.
    Ignored,
    /// A new measurement was placed.
    Completed(MeasurementId),
    /// A drag of an existing measurement was committed.
    Committed(MeasurementId),
    /// A handle ended outside the image and the measurement was deleted.
    Discarded(MeasurementId),
}

/// What a canvas point hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Handle(HandleRole),
    /// Near one of the shape's vertices (not its edges).
    Shape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: MeasurementId,
    pub target: HitTarget,
}

/// Capability interface a host loop drives.
pub trait AnnotationTool {
    /// Returns true if the event was consumed.
    fn handle_pointer_down(&mut self, event: &PointerEvent, ctx: &ToolContext) -> AnnotationResult<bool>;

    /// Returns true if a redraw is needed.
    fn handle_pointer_move(&mut self, event: &PointerEvent, ctx: &ToolContext) -> AnnotationResult<bool>;

    fn handle_pointer_up(&mut self, event: &PointerEvent, ctx: &ToolContext) -> AnnotationResult<ReleaseOutcome>;

    /// Hit-test a canvas point against existing measurements.
    fn hit_test(&self, canvas: Point, pointer: PointerKind, view: &dyn ImageView) -> Option<Hit>;

    /// Abort any drag, restoring the last committed geometry.
    /// Returns true if anything changed.
    fn deactivate(&mut self) -> bool;

    /// Dispatch an event by phase. Returns true if a redraw is needed.
    fn handle_pointer_event(&mut self, event: &PointerEvent, ctx: &ToolContext) -> AnnotationResult<bool> {
        match event.phase {
            PointerPhase::Down => self.handle_pointer_down(event, ctx),
            PointerPhase::Move => self.handle_pointer_move(event, ctx),
            PointerPhase::Up => self
                .handle_pointer_up(event, ctx)
                .map(|outcome| outcome != ReleaseOutcome::Ignored),
        }
    }
}

/// The hip prosthesis tool: shaft axis rectangle, then joint head circle.
#[derive(Debug, Clone, Default)]
pub struct HipProsthesisTool {
    session: Session,
    state: InteractionState,
    config: ToolConfig,
    stats: StatsEngine,
    events: Vec<ToolEvent>,
}

impl HipProsthesisTool {
    pub fn new(config: ToolConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_stats_engine(mut self, stats: StatsEngine) -> Self {
        self.stats = stats;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable session access for render-time cache refreshes.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn stats_engine(&self) -> &StatsEngine {
        &self.stats
    }

    /// Drain pending host notifications.
    pub fn take_events(&mut self) -> Vec<ToolEvent> {
        std::mem::take(&mut self.events)
    }

    /// Refresh stale statistics, honoring the throttle. Returns the number
    /// of measurements recomputed.
    pub fn refresh_stats(&mut self, ctx: &ToolContext) -> usize {
        self.session
            .refresh_stats(&self.stats, ctx.sampler, ctx.info, ctx.adjuster, ctx.now)
    }

    /// When a deferred statistics refresh becomes due, if any.
    pub fn next_redraw_deadline(&self, now: Instant) -> Option<Instant> {
        self.session.next_stats_deadline(&self.stats, now)
    }

    fn near_distance(pointer: PointerKind) -> f64 {
        match pointer {
            PointerKind::Mouse => MOUSE_NEAR_DISTANCE,
            PointerKind::Touch => TOUCH_NEAR_DISTANCE,
        }
    }

    /// First handle of `measurement` within the grab radius of `canvas`.
    fn handle_near(measurement: &Measurement, canvas: Point, view: &dyn ImageView) -> Option<HandleRole> {
        measurement
            .shape()
            .handles()
            .into_iter()
            .find(|(_, h)| Handle::hit_test(view.image_to_canvas(h.position()), canvas, HANDLE_GRAB_RADIUS))
            .map(|(role, _)| role)
    }

    /// Closest handle within the grab radius, for hover highlighting.
    fn nearest_handle(measurement: &Measurement, canvas: Point, view: &dyn ImageView) -> Option<HandleRole> {
        measurement
            .shape()
            .handles()
            .into_iter()
            .map(|(role, h)| (role, euclidean_distance(view.image_to_canvas(h.position()), canvas)))
            .filter(|(_, d)| *d <= HANDLE_GRAB_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(role, _)| role)
    }

    /// Whether `canvas` is within reach of one of the shape's vertices.
    ///
    /// Only vertices are tested, not edges: grabbing the middle of a long
    /// edge does not start a drag.
    pub fn point_near_tool(measurement: &Measurement, canvas: Point, pointer: PointerKind, view: &dyn ImageView) -> bool {
        if !measurement.visible {
            return false;
        }
        let distance = Self::near_distance(pointer);
        measurement
            .shape()
            .vertices()
            .into_iter()
            .any(|v| euclidean_distance(view.image_to_canvas(v), canvas) <= distance)
    }

    fn begin_placement(&mut self, image: Point, ctx: &ToolContext) -> bool {
        match self.session.create_measurement(image, ctx.viewport.rotation) {
            Ok(measurement) => {
                let id = measurement.id();
                log::debug!("Placing {:?} {} at ({:.1}, {:.1})", measurement.kind(), id, image.x, image.y);
                self.state = InteractionState::Placing { id };
                true
            }
            Err(AnnotationError::SessionFull) => false,
            Err(err) => {
                log::warn!("Could not create measurement: {err}");
                false
            }
        }
    }

    /// Delete the target if any handle left the image.
    fn discard_if_outside(&mut self, id: MeasurementId, ctx: &ToolContext) -> bool {
        let bounds = ctx.view.image_bounds();
        let outside = self.session.get(id).is_some_and(|m| m.any_handle_outside(bounds));
        if outside {
            let removed = self.session.remove_measurement(id);
            log::debug!("Released outside the image; removed {} measurement(s)", removed.len());
        }
        outside
    }

    fn apply_pointer(&mut self, image: Point) {
        match &mut self.state {
            InteractionState::Idle => {}
            InteractionState::Placing { id } => {
                if let Some(m) = self.session.get_mut(*id) {
                    m.update_handle(HandleRole::End, image);
                }
            }
            InteractionState::DraggingHandle { id, role, .. } => {
                if let Some(m) = self.session.get_mut(*id) {
                    m.update_handle(*role, image);
                }
            }
            InteractionState::DraggingShape { id, last, .. } => {
                let delta = image - *last;
                *last = image;
                if let Some(m) = self.session.get_mut(*id) {
                    m.translate(delta);
                }
            }
        }
    }

    fn hover(&mut self, canvas: Point, pointer: PointerKind, view: &dyn ImageView) -> bool {
        let mut changed = false;
        for measurement in self.session.measurements_mut() {
            let role = Self::nearest_handle(measurement, canvas, view);
            changed |= measurement.activate_handle(role);

            let near = Self::point_near_tool(measurement, canvas, pointer, view);
            if near != measurement.active {
                measurement.active = near;
                changed = true;
            }
        }
        changed
    }
}

impl AnnotationTool for HipProsthesisTool {
    fn handle_pointer_down(&mut self, event: &PointerEvent, ctx: &ToolContext) -> AnnotationResult<bool> {
        if !self.state.is_idle() {
            return Ok(false);
        }
        let (image, canvas) = match (event.image_point(), event.canvas_point()) {
            (Ok(image), Ok(canvas)) => (image, canvas),
            (Err(err), _) | (_, Err(err)) => {
                log::warn!("Pointer down ignored: {err}");
                return Err(err);
            }
        };

        match self.hit_test(canvas, event.pointer, ctx.view) {
            Some(Hit { id, target: HitTarget::Handle(role) }) => {
                if let Some(m) = self.session.get_mut(id) {
                    m.active = true;
                    let original = m.snapshot();
                    self.state = InteractionState::DraggingHandle { id, role, original };
                }
                Ok(true)
            }
            Some(Hit { id, target: HitTarget::Shape }) => {
                for m in self.session.measurements_mut() {
                    m.active = m.id() == id;
                }
                if let Some(m) = self.session.get(id) {
                    let original = m.snapshot();
                    self.state = InteractionState::DraggingShape { id, last: image, original };
                }
                Ok(true)
            }
            None => Ok(self.begin_placement(image, ctx)),
        }
    }

    fn handle_pointer_move(&mut self, event: &PointerEvent, ctx: &ToolContext) -> AnnotationResult<bool> {
        if self.state.is_idle() {
            let canvas = event.canvas_point().inspect_err(|err| log::warn!("Hover ignored: {err}"))?;
            return Ok(self.hover(canvas, event.pointer, ctx.view));
        }
        let image = event.image_point().inspect_err(|err| log::warn!("Drag update ignored: {err}"))?;
        self.apply_pointer(image);
        Ok(true)
    }

    fn handle_pointer_up(&mut self, event: &PointerEvent, ctx: &ToolContext) -> AnnotationResult<ReleaseOutcome> {
        let Some(id) = self.state.target() else {
            return Ok(ReleaseOutcome::Ignored);
        };
        // The release position is optional; without it the last move stands.
        if let Ok(image) = event.image_point() {
            self.apply_pointer(image);
        }
        let placing = matches!(self.state, InteractionState::Placing { .. });
        self.state = InteractionState::Idle;

        if self.discard_if_outside(id, ctx) {
            return Ok(ReleaseOutcome::Discarded(id));
        }
        let Some(measurement) = self.session.get_mut(id) else {
            return Ok(ReleaseOutcome::Discarded(id));
        };
        if !placing {
            measurement.invalidated = true;
            return Ok(ReleaseOutcome::Committed(id));
        }

        measurement.finalize_placement();
        self.stats
            .refresh_now(measurement, ctx.sampler, ctx.info, ctx.adjuster, ctx.now);
        log::info!("Measurement {:?} {} completed", measurement.kind(), id);
        self.events
            .push(ToolEvent::MeasurementCompleted(measurement.clone()));
        Ok(ReleaseOutcome::Completed(id))
    }

    fn hit_test(&self, canvas: Point, pointer: PointerKind, view: &dyn ImageView) -> Option<Hit> {
        let visible = || self.session.measurements().filter(|m| m.visible);
        if let Some(hit) = visible().find_map(|m| {
            Self::handle_near(m, canvas, view).map(|role| Hit {
                id: m.id(),
                target: HitTarget::Handle(role),
            })
        }) {
            return Some(hit);
        }
        visible()
            .find(|m| Self::point_near_tool(m, canvas, pointer, view))
            .map(|m| Hit {
                id: m.id(),
                target: HitTarget::Shape,
            })
    }

    fn deactivate(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            InteractionState::Idle => false,
            InteractionState::Placing { id } => !self.session.remove_measurement(id).is_empty(),
            InteractionState::DraggingHandle { id, original, .. }
            | InteractionState::DraggingShape { id, original, .. } => match self.session.get_mut(id) {
                Some(m) => {
                    m.restore(original);
                    true
                }
                None => false,
            },
        }
    }
}
