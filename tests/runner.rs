use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use growth_bench::chart::{ChartData, ChartExporter, ChartTarget};
use growth_bench::estimate::Dimension;
use growth_bench::harness::{VirtualClock, VirtualHeap};
use growth_bench::schema::Complexity;
use growth_bench::{
    BenchError, GrowthEstimator, RatioMode, RunConfig, Runner, Sampler,
};

/// Report sink the test can read back after the runner is done with it.
#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runner whose clock only moves when the function under test charges it.
fn modelled_runner(clock: &VirtualClock, mode: RatioMode, sink: SharedBuf) -> Runner {
    Runner::new()
        .with_sampler(Sampler::new().with_clock(clock.clone()))
        .with_estimator(GrowthEstimator::new(mode))
        .with_sink(sink)
}

fn nanos(n: u64) -> Duration {
    Duration::from_nanos(n)
}

#[test]
fn quadratic_cost_on_decade_sizes_is_quadratic() {
    let tmp = tempfile::tempdir().unwrap();
    let clock = VirtualClock::new();
    let sink = SharedBuf::default();
    let config = RunConfig::new("pairwise-unique", vec![100, 1_000, 10_000])
        .unwrap()
        .with_output(ChartTarget::new(tmp.path(), "pairwise.svg").unwrap());

    let charge = clock.clone();
    let summary = modelled_runner(&clock, RatioMode::Raw, sink.clone())
        .run(
            &config,
            |n| n,
            |&n| {
                charge.advance(nanos((n * n) as u64));
                n
            },
        )
        .unwrap();

    assert_eq!(summary.verdicts.time, Some(Complexity::QuadraticOrWorse));
    let chart = summary.chart.expect("chart exported");
    assert_eq!(chart, tmp.path().join("pairwise.svg"));
    assert!(fs::read_to_string(chart).unwrap().contains("pairwise-unique"));
    assert!(sink.text().contains("time:   quadratic-or-worse"));
}

#[test]
fn linear_scan_on_decade_sizes_is_linear_per_e_fold() {
    let tmp = tempfile::tempdir().unwrap();
    let clock = VirtualClock::new();
    let config = RunConfig::new("single-pass", vec![100, 1_000, 10_000])
        .unwrap()
        .with_output(ChartTarget::new(tmp.path(), "scan.svg").unwrap());

    let charge = clock.clone();
    let mut runner = modelled_runner(&clock, RatioMode::PerEFold, SharedBuf::default());
    let summary = runner
        .run(
            &config,
            |n| vec![1u8; n],
            |v: &Vec<u8>| {
                charge.advance(nanos(40 * v.len() as u64));
                v.iter().map(|&b| b as u64).sum::<u64>()
            },
        )
        .unwrap();

    assert_eq!(summary.verdicts.time, Some(Complexity::Linear));

    // the same measurements under raw ratios land in the top bucket
    let raw = GrowthEstimator::new(RatioMode::Raw);
    assert_eq!(
        raw.classify(&summary.points, Dimension::Time),
        Some(Complexity::QuadraticOrWorse)
    );
}

#[test]
fn summing_a_generated_array_has_mean_ratio_in_linear_band() {
    let clock = VirtualClock::new();
    let config = RunConfig::new("sum", vec![10, 100, 1_000, 10_000]).unwrap();

    let charge = clock.clone();
    let mut runner = modelled_runner(&clock, RatioMode::PerEFold, SharedBuf::default())
        .without_chart();
    let summary = runner
        .run(
            &config,
            |n| (1..=n as u64).collect::<Vec<u64>>(),
            |v: &Vec<u64>| {
                charge.advance(nanos(3 * v.len() as u64));
                v.iter().sum::<u64>()
            },
        )
        .unwrap();

    let mean = runner
        .estimator()
        .mean_ratio(&summary.points, Dimension::Time)
        .unwrap();
    assert!((1.5..3.0).contains(&mean), "mean ratio {mean}");
    assert_eq!(summary.verdicts.time, Some(Complexity::Linear));
}

#[test]
fn points_match_requested_sizes_and_memory_is_signed() {
    let clock = VirtualClock::new();
    let heap = VirtualHeap::new(64 << 20);
    let sizes = vec![400, 1_000, 2_500, 6_250];
    let config = RunConfig::new("heap", sizes.clone()).unwrap();

    let charge = clock.clone();
    let alloc = heap.clone();
    let summary = Runner::new()
        .with_sampler(
            Sampler::new()
                .with_clock(clock.clone())
                .with_heap(heap.clone()),
        )
        .with_sink(io::sink())
        .without_chart()
        .run(
            &config,
            |n| n,
            |&n| {
                charge.advance(nanos(1_000 * n as u64));
                if n == 1_000 {
                    alloc.shrink(1 << 20);
                } else {
                    alloc.grow(n << 10);
                }
            },
        )
        .unwrap();

    let got: Vec<usize> = summary.points.iter().map(|p| p.input_size).collect();
    assert_eq!(got, sizes);
    assert_eq!(summary.points[1].memory_mb, -1.0);
    assert!(summary.points.iter().all(|p| p.time_ms >= 0.0));
    // 2.5x steps with cost proportional to size
    assert_eq!(summary.verdicts.time, Some(Complexity::Linear));
    assert!(summary.verdicts.memory.is_some());
}

struct Recording(Rc<RefCell<Vec<(String, usize)>>>);

impl ChartExporter for Recording {
    fn export(&self, chart: &ChartData<'_>, target: &ChartTarget) -> Result<PathBuf, BenchError> {
        self.0
            .borrow_mut()
            .push((chart.name.to_string(), chart.points.len()));
        Ok(target.path())
    }
}

#[test]
fn exporter_receives_run_name_and_all_points() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let config = RunConfig::new("custom", vec![1, 2, 3])
        .unwrap()
        .with_file_name("custom.png")
        .unwrap();

    let summary = Runner::new()
        .with_exporter(Recording(Rc::clone(&calls)))
        .with_sink(io::sink())
        .run(&config, |n| n, |n| *n)
        .unwrap();

    assert_eq!(*calls.borrow(), vec![("custom".to_string(), 3)]);
    assert_eq!(summary.chart, Some(config.output.path()));
}

#[test]
fn chart_failure_surfaces_after_report_is_written() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    fs::write(&blocker, b"occupied").unwrap();

    let sink = SharedBuf::default();
    let config = RunConfig::new("doomed", vec![5, 10])
        .unwrap()
        .with_output(ChartTarget::new(&blocker, "chart.svg").unwrap());

    let err = Runner::new()
        .with_sink(sink.clone())
        .run(&config, |n| n, |n| *n)
        .unwrap_err();

    assert!(matches!(err, BenchError::Io(_)));
    assert!(sink.text().contains("=== doomed ==="));
}

#[test]
fn record_carries_ratios_and_verdicts() {
    let clock = VirtualClock::new();
    let config = RunConfig::new("record", vec![100, 250, 625]).unwrap();
    let charge = clock.clone();
    let mut runner = modelled_runner(&clock, RatioMode::Raw, SharedBuf::default()).without_chart();

    let summary = runner
        .run(&config, |n| n, |&n| charge.advance(nanos(n as u64 * 100)))
        .unwrap();
    let record = summary.record(runner.estimator());

    assert_eq!(record.name, "record");
    assert_eq!(record.ratio_mode, "raw");
    assert_eq!(record.points.len(), 3);
    let mean = record.mean_time_ratio.unwrap();
    assert!((mean - 2.5).abs() < 1e-9, "mean {mean}");
    assert_eq!(record.verdicts.time, Some(Complexity::Linear));
    assert!(record.chart.is_none());

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["verdicts"]["time"], "linear");
}
