//! Region statistics with a rate-limited refresh.
//!
//! Statistics are cached on each measurement and recomputed only when the
//! geometry changed. While a cached value exists, recomputation is limited
//! to one run per [`STATS_THROTTLE_INTERVAL`]; a refresh that arrives too
//! early stays pending and runs on the first render after the window, with
//! whatever geometry is current by then.

use crate::error::{AnnotationError, AnnotationResult};
use crate::host::{ImageInfo, Modality, PixelSampler, ValueAdjuster};
use crate::measurement::Measurement;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

/// Minimum time between two recomputations of the same measurement.
pub const STATS_THROTTLE_INTERVAL: Duration = Duration::from_millis(110);

/// Rounds half up, matching how hosts round pixel coordinates.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Integer pixel rectangle handed to the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBounds {
    pub left: i64,
    pub top: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelBounds {
    /// Rounded bounding box of a rectangle in image coordinates.
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self {
            left: round_half_up(rect.x0),
            top: round_half_up(rect.y0),
            width: round_half_up(rect.width()).max(0) as u32,
            height: round_half_up(rect.height()).max(0) as u32,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Area of the image a measurement samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleRegion {
    /// Every pixel of the rectangle.
    Rect(Rect),
    /// Pixels whose centers fall inside the circle.
    Circle { center: Point, radius: f64 },
}

impl SampleRegion {
    pub fn pixel_bounds(&self) -> PixelBounds {
        match *self {
            SampleRegion::Rect(rect) => PixelBounds::from_rect(rect),
            SampleRegion::Circle { center, radius } => PixelBounds::from_rect(Rect::new(
                center.x - radius,
                center.y - radius,
                center.x + radius,
                center.y + radius,
            )),
        }
    }

    /// Physical area using pixel spacing (1.0 per axis when unknown).
    pub fn area(&self, info: &ImageInfo) -> f64 {
        let (col, row) = (info.col_spacing(), info.row_spacing());
        match *self {
            SampleRegion::Rect(rect) => rect.width().abs() * col * rect.height().abs() * row,
            SampleRegion::Circle { radius, .. } => std::f64::consts::PI * (radius * col) * (radius * row),
        }
    }

    fn contains_pixel(&self, bounds: &PixelBounds, index: usize) -> bool {
        match *self {
            SampleRegion::Rect(_) => true,
            SampleRegion::Circle { center, radius } => {
                let width = bounds.width.max(1) as usize;
                let x = bounds.left as f64 + (index % width) as f64 + 0.5;
                let y = bounds.top as f64 + (index / width) as f64 + 0.5;
                let (dx, dy) = (x - center.x, y - center.y);
                dx * dx + dy * dy <= radius * radius
            }
        }
    }
}

/// Modality-adjusted mean and standard deviation (SUV for PET).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SuvStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Statistics over the sampled region. Replaced wholesale on refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub area: f64,
    pub count: usize,
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub suv: Option<SuvStats>,
}

impl Stats {
    /// All-zero statistics, used when sampling is impossible.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Aggregate count/mean/variance/min/max over `values`.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return Self::zero();
        }
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            area: 0.0,
            count,
            mean,
            variance,
            std_dev: variance.sqrt(),
            min,
            max,
            suv: None,
        }
    }
}

/// What a render pass should do about a measurement's statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    /// Cached value is current.
    Fresh,
    /// Nothing cached yet: compute now.
    Immediate,
    /// Stale and the throttle window has passed: compute now.
    Due,
    /// Stale but throttled until the given instant.
    Deferred(Instant),
}

/// Computes region statistics and enforces the refresh rate limit.
#[derive(Debug, Clone)]
pub struct StatsEngine {
    interval: Duration,
}

impl Default for StatsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsEngine {
    pub fn new() -> Self {
        Self {
            interval: STATS_THROTTLE_INTERVAL,
        }
    }

    /// Engine with a custom throttle interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn decide(&self, measurement: &Measurement, now: Instant) -> RefreshDecision {
        if !measurement.invalidated {
            return RefreshDecision::Fresh;
        }
        if measurement.cached_stats.is_none() {
            return RefreshDecision::Immediate;
        }
        match measurement.last_stats_refresh {
            Some(last) => {
                let due_at = last + self.interval;
                if now >= due_at {
                    RefreshDecision::Due
                } else {
                    RefreshDecision::Deferred(due_at)
                }
            }
            None => RefreshDecision::Due,
        }
    }

    /// Recompute if the measurement is stale and not throttled.
    /// Returns true if statistics were recomputed.
    pub fn refresh_if_needed(
        &self,
        measurement: &mut Measurement,
        sampler: &dyn PixelSampler,
        info: &ImageInfo,
        adjuster: &dyn ValueAdjuster,
        now: Instant,
    ) -> bool {
        match self.decide(measurement, now) {
            RefreshDecision::Fresh => false,
            RefreshDecision::Deferred(until) => {
                log::debug!(
                    "Stats refresh for {} deferred by {:?}",
                    measurement.id,
                    until.saturating_duration_since(now)
                );
                false
            }
            RefreshDecision::Immediate | RefreshDecision::Due => {
                self.refresh_now(measurement, sampler, info, adjuster, now);
                true
            }
        }
    }

    /// Recompute unconditionally (placement completion, first paint).
    pub fn refresh_now(
        &self,
        measurement: &mut Measurement,
        sampler: &dyn PixelSampler,
        info: &ImageInfo,
        adjuster: &dyn ValueAdjuster,
        now: Instant,
    ) {
        let region = measurement.shape.region();
        let stats = self.compute(&region, sampler, info, adjuster);
        measurement.store_stats(stats, now);
    }

    /// Statistics for `region`. Sampling failures yield zero-valued stats.
    pub fn compute(
        &self,
        region: &SampleRegion,
        sampler: &dyn PixelSampler,
        info: &ImageInfo,
        adjuster: &dyn ValueAdjuster,
    ) -> Stats {
        let area = region.area(info);
        let mut stats = match sample_region(region, sampler) {
            Ok(stats) => stats,
            Err(err) => {
                log::debug!("{err}; reporting zero statistics");
                Stats::zero()
            }
        };
        stats.area = if area.is_finite() { area } else { 0.0 };

        if info.modality() == Some(Modality::Pt) {
            stats.suv = Some(SuvStats {
                mean: adjusted(adjuster, stats.mean, false),
                std_dev: adjusted(adjuster, stats.std_dev, true),
            });
        }
        stats
    }
}

fn adjusted(adjuster: &dyn ValueAdjuster, raw: f64, is_std_dev: bool) -> f64 {
    adjuster
        .adjust(raw, is_std_dev)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn sample_region(region: &SampleRegion, sampler: &dyn PixelSampler) -> AnnotationResult<Stats> {
    let bounds = region.pixel_bounds();
    if bounds.is_empty() {
        return Err(AnnotationError::SamplingFailure(format!(
            "degenerate region {}x{}",
            bounds.width, bounds.height
        )));
    }
    let pixels = sampler.sample_pixels(bounds)?;
    let inside = pixels
        .into_iter()
        .enumerate()
        .filter(|(i, _)| region.contains_pixel(&bounds, *i))
        .map(|(_, v)| v);
    Ok(Stats::from_values(inside))
}
