//! Wall-clock runs of the built-in workloads. Only the quadratic case is
//! asserted on real timings; its ratios (~100x per decade) dwarf timer noise.

use growth_bench::chart::ChartTarget;
use growth_bench::dataset::Generators;
use growth_bench::harness::BenchConfig;
use growth_bench::workloads::{max_window_sum, Workload};
use growth_bench::{Complexity, RunConfig, Runner};

#[test]
fn naive_window_sum_is_quadratic_on_decade_sizes() {
    let tmp = tempfile::tempdir().unwrap();
    let config = RunConfig::new("window-sum-naive", vec![100, 1_000, 10_000])
        .unwrap()
        .with_output(ChartTarget::new(tmp.path(), "naive.svg").unwrap());
    let gens = Generators::new(BenchConfig::default());

    let mut runner = Runner::new().with_sink(std::io::sink());
    let summary = Workload::WindowSumNaive
        .run(&mut runner, &config, &gens)
        .unwrap();

    assert_eq!(summary.points.len(), 3);
    assert_eq!(summary.verdicts.time, Some(Complexity::QuadraticOrWorse));
    assert!(tmp.path().join("naive.svg").is_file());
}

#[test]
fn every_workload_completes_with_a_verdict() {
    let config = RunConfig::new("smoke", vec![16, 40, 100]).unwrap();
    let gens = Generators::new(BenchConfig::default());
    let mut runner = Runner::new().without_chart().with_sink(std::io::sink());

    for workload in Workload::ALL {
        let summary = workload.run(&mut runner, &config, &gens).unwrap();
        assert_eq!(summary.points.len(), 3, "{}", workload.name());
        assert!(summary.verdicts.time.is_some());
    }
}

#[test]
fn sampled_output_matches_direct_call() {
    let gens = Generators::new(BenchConfig::default());
    let sampler = growth_bench::Sampler::new();
    let sample = sampler.measure(
        500,
        |n| gens.windowed_values(n),
        |(values, k): &(Vec<i64>, usize)| max_window_sum(values, *k),
    );
    let (values, k) = gens.windowed_values(500);
    assert_eq!(sample.output, max_window_sum(&values, k));
}
