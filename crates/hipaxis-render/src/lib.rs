//! HipAxis Render Library
//!
//! Turns a measurement session into drawing primitives and label text.
//! Hosts implement [`Renderer`] to paint; [`SceneRecorder`] records a frame
//! for headless use.

mod composer;
pub mod label;
mod renderer;
mod scene;

pub use composer::{Alignment, FrameReport, RenderTool, alignment, render_frame};
pub use label::{default_text_box_position, format_area, format_number, label_lines};
pub use renderer::{HandleStyle, LinkedTextBox, RenderContext, RenderResult, Renderer, RendererError, StrokeStyle};
pub use scene::{DrawCommand, Scene, SceneRecorder, SerializableColor};
