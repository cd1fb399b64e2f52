//! Growth benchmarks: time and heap delta per input size, a coarse complexity
//! verdict from the growth ratios, and a trend chart.
//!
//! ```no_run
//! use growth_bench::run_benchmark;
//!
//! let summary = run_benchmark(
//!     "sum",
//!     |v: &Vec<u64>| v.iter().sum::<u64>(),
//!     |n| vec![1u64; n],
//!     &[400, 1_000, 2_500, 6_250],
//!     Some("sum.svg"),
//! )?;
//! println!("{:?}", summary.verdicts.time);
//! # Ok::<(), growth_bench::BenchError>(())
//! ```

pub mod alloc;
pub mod chart;
pub mod dataset;
pub mod error;
pub mod estimate;
pub mod harness;
pub mod report;
pub mod runner;
pub mod schema;
pub mod workloads;

pub use error::BenchError;
pub use estimate::{classify, Dimension, GrowthEstimator, RatioMode};
pub use harness::{Sample, Sampler};
pub use runner::{run_benchmark, RunConfig, RunSummary, Runner};
pub use schema::{Complexity, MeasurementPoint, Verdicts};
