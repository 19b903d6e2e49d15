//! HipAxis Core Library
//!
//! Platform-agnostic data model, geometry and interaction logic for the
//! hip prosthesis measurement tool: a rectangular shaft axis, a circular
//! joint head, and the perpendicular alignment line derived between them.

pub mod config;
pub mod error;
pub mod geometry;
pub mod handle;
pub mod host;
pub mod input;
pub mod interaction;
pub mod measurement;
pub mod session;
pub mod stats;

pub use config::ToolConfig;
pub use error::{AnnotationError, AnnotationResult};
pub use geometry::{AxisLine, euclidean_distance, long_axis_midline, perpendicular_foot, rectangle_from_corners};
pub use handle::{Handle, HandleRole};
pub use host::{ImageInfo, ImageView, Modality, NoAdjustment, PixelSampler, ValueAdjuster, Viewport};
pub use input::{PointerEvent, PointerKind, PointerPhase};
pub use interaction::{
    AnnotationTool, HipProsthesisTool, Hit, HitTarget, InteractionState, ReleaseOutcome, ToolContext, ToolEvent,
};
pub use measurement::{AxisRect, HeadCircle, Measurement, MeasurementId, MeasurementKind, Shape, Snapshot, TextBox};
pub use session::Session;
pub use stats::{PixelBounds, RefreshDecision, STATS_THROTTLE_INTERVAL, SampleRegion, Stats, StatsEngine, SuvStats};
