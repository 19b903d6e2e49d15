//! Per-frame composition of measurement drawings and labels.

use crate::label::{default_text_box_position, label_lines};
use crate::renderer::{HandleStyle, LinkedTextBox, RenderContext, RenderResult, Renderer, StrokeStyle};
use hipaxis_core::{AxisLine, HipProsthesisTool, Measurement, Session, Shape, ToolConfig, perpendicular_foot};
use kurbo::Point;
use serde::Serialize;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Alignment derived from the two shapes, in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Alignment {
    /// Long-axis midline of the shaft rectangle.
    pub midline: AxisLine,
    pub head_center: Point,
    /// Foot of the perpendicular from `head_center` onto the midline.
    pub foot: Point,
}

impl Alignment {
    /// Length of the perpendicular in image pixels.
    pub fn offset(&self) -> f64 {
        self.head_center.distance(self.foot)
    }
}

/// Alignment of a creation-complete session, `None` otherwise.
pub fn alignment(session: &Session) -> Option<Alignment> {
    if !session.is_creation_complete() {
        return None;
    }
    let midline = session.axis()?.midline();
    let head_center = session.head()?.center();
    Some(Alignment {
        midline,
        head_center,
        foot: perpendicular_foot(&midline, head_center),
    })
}

/// What a frame did.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub drawn: usize,
    pub stats_refreshed: usize,
    pub alignment: Option<Alignment>,
    /// When to redraw so a throttled statistics refresh can run.
    pub redraw_at: Option<Instant>,
}

/// Draw every visible measurement of `tool` through `renderer`.
///
/// Stale statistics are refreshed first, within the throttle, and labels
/// that were never moved are placed at their default position.
pub fn render_frame(
    tool: &mut HipProsthesisTool,
    ctx: &RenderContext,
    renderer: &mut dyn Renderer,
) -> RenderResult<FrameReport> {
    let stats_refreshed = tool.refresh_stats(&ctx.host);
    let config = tool.config().clone();
    let alignment = alignment(tool.session());
    let axis_rotation = tool.session().axis().map_or(0.0, |axis| axis.initial_rotation());

    let mut drawn = 0;
    for measurement in tool.session_mut().measurements_mut().filter(|m| m.visible) {
        if draw_measurement(measurement, alignment.as_ref(), axis_rotation, &config, ctx, renderer)? {
            drawn += 1;
        }
    }

    Ok(FrameReport {
        drawn,
        stats_refreshed,
        alignment,
        redraw_at: tool.next_redraw_deadline(ctx.host.now),
    })
}

fn draw_measurement(
    measurement: &mut Measurement,
    alignment: Option<&Alignment>,
    axis_rotation: f64,
    config: &ToolConfig,
    ctx: &RenderContext,
    renderer: &mut dyn Renderer,
) -> RenderResult<bool> {
    let view = ctx.host.view;
    let to_canvas = |p: Point| view.image_to_canvas(p);
    if !measurement.shape().vertices().into_iter().map(to_canvas).all(|p| p.is_finite()) {
        log::warn!("Skipping measurement {}: non-finite canvas position", measurement.id());
        return Ok(false);
    }

    let color = ctx.color_for(measurement.active);
    let stroke = StrokeStyle {
        color,
        width: ctx.line_width,
        rotation: 0.0,
    };

    match measurement.shape() {
        Shape::RectangularAxis(rect) => {
            let stroke = StrokeStyle {
                rotation: rect.initial_rotation(),
                ..stroke
            };
            let outline = rect.outline().map(to_canvas);
            renderer.draw_polygon(&outline, stroke)?;
            let midline = rect.midline();
            renderer.draw_line(to_canvas(midline.p1), to_canvas(midline.p2), stroke)?;
        }
        Shape::CircularHead(circle) => {
            let center = to_canvas(circle.center());
            let radius = center.distance(to_canvas(circle.end().position()));
            renderer.draw_circle(center, radius, stroke)?;
            if let Some(alignment) = alignment {
                // The perpendicular lies in the shaft's frame.
                let stroke = StrokeStyle {
                    rotation: axis_rotation,
                    ..stroke
                };
                renderer.draw_line(to_canvas(alignment.head_center), to_canvas(alignment.foot), stroke)?;
            }
        }
    }

    let handles: Vec<Point> = measurement
        .shape()
        .handles()
        .into_iter()
        .filter(|(_, h)| !config.draw_handles_on_hover || h.active)
        .map(|(_, h)| to_canvas(h.position()))
        .collect();
    if !handles.is_empty() {
        renderer.draw_handles(
            &handles,
            HandleStyle {
                color,
                radius: config.handle_radius,
            },
        )?;
    }

    if !measurement.text_box.has_moved {
        let (start, end) = measurement.shape().endpoints();
        measurement.text_box.position = Some(default_text_box_position(&ctx.host.viewport, start, end));
    }
    let lines = {
        let measure = |text: &str| renderer.measure_text(text);
        label_lines(measurement.cached_stats(), ctx.host.info, config, &measure)
    };
    if let (false, Some(position)) = (lines.is_empty(), measurement.text_box.position) {
        renderer.draw_linked_text_box(&LinkedTextBox {
            lines,
            position: to_canvas(position),
            anchors: measurement.shape().vertices().into_iter().map(to_canvas).collect(),
            color,
            line_width: ctx.line_width,
            x_offset: ctx.text_x_offset,
            y_center: true,
        })?;
    }
    Ok(true)
}

/// The render half of the tool's capability interface.
pub trait RenderTool {
    fn render(&mut self, ctx: &RenderContext, renderer: &mut dyn Renderer) -> RenderResult<FrameReport>;
}

impl RenderTool for HipProsthesisTool {
    fn render(&mut self, ctx: &RenderContext, renderer: &mut dyn Renderer) -> RenderResult<FrameReport> {
        render_frame(self, ctx, renderer)
    }
}
