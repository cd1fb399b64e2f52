//! Growth-ratio complexity estimation.
//!
//! This is a heuristic proxy for asymptotic growth, not a proof. Each
//! consecutive pair of points contributes `metric[i] / metric[i-1]`; the mean
//! of those ratios is bucketed with fixed cut points (1.5, 3, 6). The cut
//! points have no statistical grounding and the verdict depends entirely on
//! how many sizes were measured and how they are spaced: with raw ratios a
//! linear workload only lands in the linear bucket when sizes grow by a
//! factor between 1.5 and 3. [`RatioMode::PerEFold`] rescales ratios to a
//! common step so the same cut points apply to any geometric spacing.

use std::fmt;

use crate::schema::{Complexity, MeasurementPoint, Verdicts};

/// Floor for a zero or negative denominator.
pub const EPSILON: f64 = 1e-4;

pub const CONSTANT_BELOW: f64 = 1.5;
pub const LINEAR_BELOW: f64 = 3.0;
pub const NEAR_LINEAR_BELOW: f64 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimension {
    Time,
    Memory,
}

impl Dimension {
    pub fn metric(&self, point: &MeasurementPoint) -> f64 {
        match self {
            Dimension::Time => point.time_ms,
            Dimension::Memory => point.memory_mb,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RatioMode {
    /// `metric[i] / metric[i-1]`, as measured.
    #[default]
    Raw,
    /// Raw ratio rescaled to the ratio expected over an e-fold size step:
    /// `raw^(1 / ln(size[i] / size[i-1]))`. Steps whose size does not grow
    /// keep the raw ratio.
    PerEFold,
}

impl RatioMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatioMode::Raw => "raw",
            RatioMode::PerEFold => "per-e-fold",
        }
    }
}

impl fmt::Display for RatioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buckets a mean growth ratio.
pub fn bucket(mean_ratio: f64) -> Complexity {
    if mean_ratio < CONSTANT_BELOW {
        Complexity::Constant
    } else if mean_ratio < LINEAR_BELOW {
        Complexity::Linear
    } else if mean_ratio < NEAR_LINEAR_BELOW {
        Complexity::NearLinear
    } else {
        Complexity::QuadraticOrWorse
    }
}

/// Ratio between two consecutive metrics, never negative.
fn step_ratio(prev: f64, next: f64) -> f64 {
    let denom = if prev > 0.0 { prev } else { EPSILON };
    // f64::max drops NaN in favour of 0.0
    (next / denom).max(0.0)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GrowthEstimator {
    pub mode: RatioMode,
}

impl GrowthEstimator {
    pub fn new(mode: RatioMode) -> Self {
        Self { mode }
    }

    /// One ratio per consecutive pair of points.
    pub fn ratios(&self, points: &[MeasurementPoint], dimension: Dimension) -> Vec<f64> {
        points
            .windows(2)
            .map(|pair| {
                let raw = step_ratio(dimension.metric(&pair[0]), dimension.metric(&pair[1]));
                match self.mode {
                    RatioMode::Raw => raw,
                    RatioMode::PerEFold => per_e_fold(raw, pair[0].input_size, pair[1].input_size),
                }
            })
            .collect()
    }

    /// Mean growth ratio, or `None` with fewer than two points.
    pub fn mean_ratio(&self, points: &[MeasurementPoint], dimension: Dimension) -> Option<f64> {
        let ratios = self.ratios(points, dimension);
        if ratios.is_empty() {
            return None;
        }
        Some(ratios.iter().sum::<f64>() / ratios.len() as f64)
    }

    /// Complexity bucket for one dimension, or `None` (indeterminate) with fewer than two points.
    pub fn classify(&self, points: &[MeasurementPoint], dimension: Dimension) -> Option<Complexity> {
        self.mean_ratio(points, dimension).map(bucket)
    }

    pub fn verdicts(&self, points: &[MeasurementPoint]) -> Verdicts {
        Verdicts {
            time: self.classify(points, Dimension::Time),
            memory: self.classify(points, Dimension::Memory),
        }
    }
}

fn per_e_fold(raw: f64, prev_size: usize, next_size: usize) -> f64 {
    if next_size <= prev_size || prev_size == 0 {
        return raw;
    }
    let log_step = (next_size as f64 / prev_size as f64).ln();
    let scaled = raw.powf(1.0 / log_step);
    if scaled.is_finite() {
        scaled
    } else {
        raw
    }
}

/// [`GrowthEstimator::classify`] with raw ratios.
pub fn classify(points: &[MeasurementPoint], dimension: Dimension) -> Option<Complexity> {
    GrowthEstimator::default().classify(points, dimension)
}
