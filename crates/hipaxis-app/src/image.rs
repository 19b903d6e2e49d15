//! Synthetic grayscale image standing in for the host viewer.

use crate::scenario::{ImageSpec, PixelPattern, ScenarioError};
use hipaxis_core::{AnnotationError, AnnotationResult, ImageView, PixelBounds, PixelSampler};
use kurbo::{Point, Size};

/// Row-major grayscale image with a uniform canvas zoom.
#[derive(Debug, Clone)]
pub struct SyntheticImage {
    width: u32,
    height: u32,
    pixels: Vec<f64>,
    /// Canvas pixels per image pixel.
    scale: f64,
}

impl SyntheticImage {
    pub fn from_spec(spec: &ImageSpec) -> Result<Self, ScenarioError> {
        if spec.width == 0 || spec.height == 0 {
            return Err(ScenarioError::InvalidImage("image must not be empty".into()));
        }
        if !(spec.scale.is_finite() && spec.scale > 0.0) {
            return Err(ScenarioError::InvalidImage(format!("invalid canvas scale {}", spec.scale)));
        }
        let (width, height) = (spec.width, spec.height);
        let len = width as usize * height as usize;
        let pixels = match &spec.pattern {
            PixelPattern::Fill { value } => vec![*value; len],
            PixelPattern::Gradient { origin, step_x, step_y } => (0..len)
                .map(|i| {
                    let (x, y) = (i % width as usize, i / width as usize);
                    origin + step_x * x as f64 + step_y * y as f64
                })
                .collect(),
            PixelPattern::Values { values } => {
                if values.len() != len {
                    return Err(ScenarioError::InvalidImage(format!(
                        "expected {len} pixel values, got {}",
                        values.len()
                    )));
                }
                values.clone()
            }
        };
        Ok(Self {
            width,
            height,
            pixels,
            scale: spec.scale,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize).copied()
    }
}

impl ImageView for SyntheticImage {
    fn image_to_canvas(&self, point: Point) -> Point {
        Point::new(point.x * self.scale, point.y * self.scale)
    }

    fn image_size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }
}

impl PixelSampler for SyntheticImage {
    /// Pixels of `bounds` that lie outside the image come back as NaN so a
    /// region crossing the border is measured over its in-image part. A
    /// request with no pixel inside the image fails.
    fn sample_pixels(&self, bounds: PixelBounds) -> AnnotationResult<Vec<f64>> {
        let right = bounds.left + bounds.width as i64;
        let bottom = bounds.top + bounds.height as i64;
        if right <= 0 || bottom <= 0 || bounds.left >= self.width as i64 || bounds.top >= self.height as i64 {
            return Err(AnnotationError::SamplingFailure(format!(
                "region {}x{} at ({}, {}) lies outside the image",
                bounds.width, bounds.height, bounds.left, bounds.top
            )));
        }

        let mut values = Vec::with_capacity(bounds.pixel_count());
        for y in bounds.top..bottom {
            for x in bounds.left..right {
                let value = match (u32::try_from(x), u32::try_from(y)) {
                    (Ok(x), Ok(y)) => self.pixel(x, y),
                    _ => None,
                };
                values.push(value.unwrap_or(f64::NAN));
            }
        }
        Ok(values)
    }
}
