//! Headless replay of a scenario against the measurement tool.

use crate::image::SyntheticImage;
use crate::scenario::{Scenario, ScenarioResult};
use hipaxis_core::{AnnotationTool, HipProsthesisTool, ImageView, Measurement, PointerEvent, ToolContext, ToolEvent};
use hipaxis_render::{Alignment, RenderContext, RenderTool, Scene, SceneRecorder};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Outcome of a replay, printed as JSON by the binary.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Measurements in the order their placement completed.
    pub completed: Vec<Measurement>,
    /// Session contents after the last event.
    pub measurements: Vec<Measurement>,
    pub alignment: Option<Alignment>,
    /// Events rejected as malformed.
    pub rejected_events: usize,
    /// Frames rendered after scripted events.
    pub frames: usize,
    /// Extra frames rendered at a throttle deadline so a deferred
    /// statistics refresh could run.
    pub settle_frames: usize,
    /// Scripted frames whose statistics refresh was deferred by the throttle.
    pub throttled_frames: usize,
    /// The last rendered frame.
    pub scene: Scene,
}

struct Replayer<'a> {
    scenario: &'a Scenario,
    image: SyntheticImage,
    tool: HipProsthesisTool,
    recorder: SceneRecorder,
    scene: Scene,
    alignment: Option<Alignment>,
}

impl Replayer<'_> {
    /// Render one frame at `now` and return the next throttle deadline.
    fn frame(&mut self, now: Instant) -> ScenarioResult<Option<Instant>> {
        let host = ToolContext::new(&self.image, &self.image, &self.scenario.info, now)
            .with_viewport(self.scenario.viewport);
        let report = self.tool.render(&RenderContext::new(host), &mut self.recorder)?;
        self.alignment = report.alignment;
        self.scene = self.recorder.finish();
        Ok(report.redraw_at)
    }
}

/// Drive the tool through every scripted event, rendering after each one.
///
/// Time is virtual: each event advances the clock by its `dt_ms`. A pending
/// throttle deadline that falls before the next event, or after the last
/// one, gets its own frame so deferred statistics are never lost.
pub fn replay(scenario: &Scenario) -> ScenarioResult<Report> {
    let mut replayer = Replayer {
        scenario,
        image: SyntheticImage::from_spec(&scenario.image)?,
        tool: HipProsthesisTool::new(scenario.config.clone()),
        recorder: SceneRecorder::new(),
        scene: Scene::default(),
        alignment: None,
    };

    let mut now = Instant::now();
    let mut pending: Option<Instant> = None;
    let mut completed = Vec::new();
    let mut rejected_events = 0;
    let mut frames = 0;
    let mut settle_frames = 0;
    let mut throttled_frames = 0;

    for (index, scripted) in scenario.events.iter().enumerate() {
        now += Duration::from_millis(scripted.dt_ms);
        if let Some(deadline) = pending.filter(|deadline| *deadline < now) {
            log::debug!("Settling deferred statistics before event {index}");
            pending = replayer.frame(deadline)?;
            settle_frames += 1;
        }

        let image_point = scripted.image_point();
        let event = PointerEvent {
            phase: scripted.phase,
            image: image_point,
            canvas: image_point.map(|p| replayer.image.image_to_canvas(p)),
            pointer: scripted.pointer,
        };
        let host = ToolContext::new(&replayer.image, &replayer.image, &scenario.info, now).with_viewport(scenario.viewport);
        if let Err(err) = replayer.tool.handle_pointer_event(&event, &host) {
            log::debug!("Event {index} rejected: {err}");
            rejected_events += 1;
        }
        completed.extend(replayer.tool.take_events().into_iter().map(|event| match event {
            ToolEvent::MeasurementCompleted(m) => m,
        }));

        pending = replayer.frame(now)?;
        frames += 1;
        if pending.is_some() {
            throttled_frames += 1;
        }
    }

    // A deadline that does not move forward would never settle.
    while let Some(deadline) = pending.filter(|deadline| *deadline > now) {
        now = deadline;
        pending = replayer.frame(now)?;
        settle_frames += 1;
    }

    log::info!(
        "Replayed {} events: {} completed, {} rejected",
        scenario.events.len(),
        completed.len(),
        rejected_events
    );
    Ok(Report {
        completed,
        measurements: replayer.tool.session().measurements().cloned().collect(),
        alignment: replayer.alignment,
        rejected_events,
        frames,
        settle_frames,
        throttled_frames,
        scene: replayer.scene,
    })
}
