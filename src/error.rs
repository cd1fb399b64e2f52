use std::io;

use thiserror::Error;

/// Errors surfaced by a benchmark run.
///
/// Panics raised by a generator or the function under test are not caught;
/// they unwind through the runner unchanged.
#[derive(Error, Debug)]
pub enum BenchError {
    /// A requested input size was zero.
    #[error("input size at position {index} is 0; sizes must be >= 1")]
    ZeroSize {
        /// Position of the offending size in the request.
        index: usize,
    },

    /// The chart file name was empty.
    #[error("chart file name must not be empty")]
    EmptyFileName,

    /// Writing the report, creating the output directory or writing the chart failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Serializing the JSON report failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
