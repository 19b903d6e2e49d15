//! HipAxis Application
//!
//! Headless shell that loads a scenario, replays it through the tool and
//! reports the resulting measurements and scene.

mod image;
mod replay;
mod scenario;

pub use image::SyntheticImage;
pub use replay::{Report, replay};
pub use scenario::{ImageSpec, PixelPattern, Scenario, ScenarioError, ScenarioEvent, ScenarioResult};
