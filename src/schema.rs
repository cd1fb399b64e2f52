use std::fmt;

use serde::{Deserialize, Serialize};

/// One (size, time, memory) observation from a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPoint {
    pub input_size: usize,
    pub time_ms: f64,
    /// Heap delta across the invocation; negative when the function freed more than it kept.
    pub memory_mb: f64,
}

/// Coarse growth bucket assigned from averaged growth ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Complexity {
    Constant,
    Linear,
    NearLinear,
    QuadraticOrWorse,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Constant => "constant",
            Complexity::Linear => "linear",
            Complexity::NearLinear => "near-linear",
            Complexity::QuadraticOrWorse => "quadratic-or-worse",
        }
    }

    pub fn big_o(&self) -> &'static str {
        match self {
            Complexity::Constant => "O(1)",
            Complexity::Linear => "O(n)",
            Complexity::NearLinear => "O(n log n)",
            Complexity::QuadraticOrWorse => "O(n^2)+",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_str(), self.big_o())
    }
}

/// Time and memory verdicts for one run. `None` means indeterminate (fewer than two points).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Verdicts {
    pub time: Option<Complexity>,
    pub memory: Option<Complexity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub profile: String,
    pub seed: u64,
    pub timestamp_utc: String,
    pub git_sha: Option<String>,
}

/// JSON form of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub name: String,
    pub ratio_mode: String,
    pub points: Vec<MeasurementPoint>,
    pub mean_time_ratio: Option<f64>,
    pub mean_memory_ratio: Option<f64>,
    pub verdicts: Verdicts,
    pub chart: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthReport {
    pub run: RunMeta,
    pub benchmarks: Vec<RunRecord>,
}
