use std::io::{self, Write};
use std::path::PathBuf;

use tracing::{debug, info, info_span, warn};

use crate::chart::{ChartData, ChartExporter, ChartTarget, SvgChartExporter, DEFAULT_OUTPUT_DIR};
use crate::error::BenchError;
use crate::estimate::{Dimension, GrowthEstimator};
use crate::harness::Sampler;
use crate::report;
use crate::schema::{MeasurementPoint, RunRecord, Verdicts};

/// What to measure and where the chart goes. Fixed for the duration of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub name: String,
    pub sizes: Vec<usize>,
    pub output: ChartTarget,
}

impl RunConfig {
    /// Config with the default chart target. Rejects a size of 0.
    pub fn new(name: impl Into<String>, sizes: Vec<usize>) -> Result<Self, BenchError> {
        if let Some(index) = sizes.iter().position(|&s| s == 0) {
            return Err(BenchError::ZeroSize { index });
        }
        Ok(Self {
            name: name.into(),
            sizes,
            output: ChartTarget::default(),
        })
    }

    pub fn with_output(mut self, output: ChartTarget) -> Self {
        self.output = output;
        self
    }

    pub fn with_file_name(self, file_name: &str) -> Result<Self, BenchError> {
        let dir = self.output.dir.clone();
        Ok(self.with_output(ChartTarget::new(dir, file_name)?))
    }
}

/// Everything a finished run produced.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub config: RunConfig,
    pub points: Vec<MeasurementPoint>,
    pub verdicts: Verdicts,
    pub chart: Option<PathBuf>,
}

impl RunSummary {
    pub fn record(&self, estimator: &GrowthEstimator) -> RunRecord {
        RunRecord {
            name: self.config.name.clone(),
            ratio_mode: estimator.mode.as_str().to_string(),
            points: self.points.clone(),
            mean_time_ratio: estimator.mean_ratio(&self.points, Dimension::Time),
            mean_memory_ratio: estimator.mean_ratio(&self.points, Dimension::Memory),
            verdicts: self.verdicts,
            chart: self.chart.as_ref().map(|p| p.to_string_lossy().to_string()),
        }
    }
}

/// Sample every size in order, classify, report, then export the chart.
pub struct Runner {
    sampler: Sampler,
    estimator: GrowthEstimator,
    exporter: Option<Box<dyn ChartExporter>>,
    sink: Box<dyn Write>,
}

impl Runner {
    /// Wall-clock sampler, raw ratios, SVG chart, report on stdout.
    pub fn new() -> Self {
        Self {
            sampler: Sampler::new(),
            estimator: GrowthEstimator::default(),
            exporter: Some(Box::new(SvgChartExporter::default())),
            sink: Box::new(io::stdout()),
        }
    }

    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_estimator(mut self, estimator: GrowthEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_exporter(mut self, exporter: impl ChartExporter + 'static) -> Self {
        self.exporter = Some(Box::new(exporter));
        self
    }

    /// Skip chart export.
    pub fn without_chart(mut self) -> Self {
        self.exporter = None;
        self
    }

    pub fn with_sink(mut self, sink: impl Write + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn estimator(&self) -> &GrowthEstimator {
        &self.estimator
    }

    /// Runs one benchmark. Generator and function panics unwind through here
    /// untouched; report and chart I/O errors are returned without retry.
    pub fn run<I, R>(
        &mut self,
        config: &RunConfig,
        mut generator: impl FnMut(usize) -> I,
        mut function: impl FnMut(&I) -> R,
    ) -> Result<RunSummary, BenchError> {
        let span = info_span!("benchmark", name = %config.name);
        let _guard = span.enter();

        if config.sizes.len() < 2 {
            warn!(sizes = config.sizes.len(), "fewer than two sizes; verdicts will be indeterminate");
        } else if config.sizes.windows(2).any(|w| w[1] <= w[0]) {
            warn!("sizes are not strictly ascending; growth verdicts may be meaningless");
        }

        let mut points = Vec::with_capacity(config.sizes.len());
        for &size in &config.sizes {
            let sample = self.sampler.measure(size, &mut generator, &mut function);
            debug!(
                size,
                time_ms = sample.point.time_ms,
                memory_mb = sample.point.memory_mb,
                "measured"
            );
            points.push(sample.point);
        }

        let verdicts = self.estimator.verdicts(&points);
        report::report(&mut self.sink, config, &points, &verdicts)?;

        let chart = match &self.exporter {
            Some(exporter) => {
                let data = ChartData {
                    name: &config.name,
                    points: &points,
                };
                let path = exporter.export(&data, &config.output)?;
                info!(path = %path.display(), "chart saved");
                Some(path)
            }
            None => None,
        };

        Ok(RunSummary {
            config: config.clone(),
            points,
            verdicts,
            chart,
        })
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

/// One-call benchmark: wall clock, raw ratios, report to stdout, SVG chart
/// under [`DEFAULT_OUTPUT_DIR`] named `output_file_name` (or the default name).
pub fn run_benchmark<I, R>(
    name: &str,
    function: impl FnMut(&I) -> R,
    generator: impl FnMut(usize) -> I,
    sizes: &[usize],
    output_file_name: Option<&str>,
) -> Result<RunSummary, BenchError> {
    let mut config = RunConfig::new(name, sizes.to_vec())?;
    if let Some(file_name) = output_file_name {
        config = config.with_output(ChartTarget::new(DEFAULT_OUTPUT_DIR, file_name)?);
    }
    Runner::new().run(&config, generator, function)
}
