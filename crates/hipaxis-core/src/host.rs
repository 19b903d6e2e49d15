//! Interfaces to the host image viewer.
//!
//! The core never stores pixels or knows how the image is displayed. The
//! host supplies coordinate transforms, pixel access and metadata through
//! these traits.

use crate::error::AnnotationResult;
use crate::stats::PixelBounds;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Coordinate transforms and bounds of the displayed image.
pub trait ImageView {
    /// Convert an image-space point to canvas (screen) pixels.
    fn image_to_canvas(&self, point: Point) -> Point;

    /// Image size in pixels.
    fn image_size(&self) -> Size;

    /// Image bounds in image coordinates, edges included.
    fn image_bounds(&self) -> Rect {
        self.image_size().to_rect()
    }
}

/// Row-major pixel access over a rectangular region.
pub trait PixelSampler {
    /// Return the intensities covering exactly `bounds`, row by row.
    /// Non-finite values (e.g. pixels past the image edge) are left out of
    /// the statistics.
    fn sample_pixels(&self, bounds: PixelBounds) -> AnnotationResult<Vec<f64>>;
}

/// Modality-specific value adjustment (e.g. raw intensity to SUV).
pub trait ValueAdjuster {
    /// Adjust a raw statistic. `None` means the value could not be converted.
    fn adjust(&self, raw: f64, is_std_dev: bool) -> Option<f64>;
}

impl<F> ValueAdjuster for F
where
    F: Fn(f64, bool) -> Option<f64>,
{
    fn adjust(&self, raw: f64, is_std_dev: bool) -> Option<f64> {
        self(raw, is_std_dev)
    }
}

/// Adjuster for hosts without modality conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdjustment;

impl ValueAdjuster for NoAdjustment {
    fn adjust(&self, _raw: f64, _is_std_dev: bool) -> Option<f64> {
        None
    }
}

/// Imaging modality, as far as the tool cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modality {
    /// Computed tomography: values are Hounsfield units.
    Ct,
    /// Positron emission tomography: values convert to SUV.
    Pt,
    Other(String),
}

impl Modality {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "CT" => Modality::Ct,
            "PT" => Modality::Pt,
            other => Modality::Other(other.to_string()),
        }
    }
}

/// Image metadata consumed by the statistics engine and label composer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    #[serde(default)]
    pub modality: Option<String>,
    #[serde(default)]
    pub row_pixel_spacing: Option<f64>,
    #[serde(default)]
    pub col_pixel_spacing: Option<f64>,
    /// Color images get no statistical label text.
    #[serde(default)]
    pub is_color: bool,
}

impl ImageInfo {
    pub fn modality(&self) -> Option<Modality> {
        self.modality.as_deref().map(Modality::parse)
    }

    /// Row spacing, 1.0 when unknown.
    pub fn row_spacing(&self) -> f64 {
        self.row_pixel_spacing.filter(|s| *s > 0.0).unwrap_or(1.0)
    }

    /// Column spacing, 1.0 when unknown.
    pub fn col_spacing(&self) -> f64 {
        self.col_pixel_spacing.filter(|s| *s > 0.0).unwrap_or(1.0)
    }

    pub fn has_pixel_spacing(&self) -> bool {
        self.row_pixel_spacing.is_some_and(|s| s > 0.0) && self.col_pixel_spacing.is_some_and(|s| s > 0.0)
    }
}

/// Viewport state relevant to measurement placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub hflip: bool,
    #[serde(default)]
    pub vflip: bool,
}
