//! Sliding-window string/array problems used as functions under test.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use clap::ValueEnum;

use crate::dataset::Generators;
use crate::error::BenchError;
use crate::runner::{RunConfig, RunSummary, Runner};
use crate::schema::Complexity;

/// Length of the longest run without a repeated element, one pass with a last-seen map.
pub fn longest_unique_run<T: Eq + Hash + Copy>(items: &[T]) -> usize {
    let mut last_seen: HashMap<T, usize> = HashMap::new();
    let mut start = 0;
    let mut best = 0;
    for (i, item) in items.iter().enumerate() {
        if let Some(&prev) = last_seen.get(item) {
            if prev >= start {
                start = prev + 1;
            }
        }
        last_seen.insert(*item, i);
        best = best.max(i + 1 - start);
    }
    best
}

/// Same answer as [`longest_unique_run`], restarting a fresh scan at every start index.
pub fn longest_unique_run_naive<T: Eq + Hash + Copy>(items: &[T]) -> usize {
    let mut best = 0;
    let mut seen = HashSet::new();
    for start in 0..items.len() {
        seen.clear();
        for item in &items[start..] {
            if !seen.insert(*item) {
                break;
            }
        }
        best = best.max(seen.len());
    }
    best
}

/// Largest sum of `k` consecutive values, or `None` when `k` is 0 or exceeds the input.
pub fn max_window_sum(values: &[i64], k: usize) -> Option<i64> {
    if k == 0 || k > values.len() {
        return None;
    }
    let mut window: i64 = values[..k].iter().sum();
    let mut best = window;
    for i in k..values.len() {
        window += values[i] - values[i - k];
        best = best.max(window);
    }
    Some(best)
}

/// [`max_window_sum`] recomputing every window from scratch.
pub fn max_window_sum_naive(values: &[i64], k: usize) -> Option<i64> {
    if k == 0 || k > values.len() {
        return None;
    }
    values.windows(k).map(|w| w.iter().sum::<i64>()).max()
}

/// Whether two equal values sit at most `k` positions apart.
pub fn contains_nearby_duplicate(values: &[i64], k: usize) -> bool {
    let mut window = HashSet::with_capacity(k.min(values.len()) + 1);
    for (i, v) in values.iter().enumerate() {
        if !window.insert(*v) {
            return true;
        }
        if i >= k {
            window.remove(&values[i - k]);
        }
    }
    false
}

pub fn sum(values: &[i64]) -> i64 {
    values.iter().sum()
}

/// Built-in functions under test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Workload {
    /// Longest substring without repeats, sliding window over random letters.
    LongestUnique,
    /// Longest run without repeats, restart-per-start scan over distinct values.
    LongestUniqueNaive,
    /// Maximum sum of a half-length window, sliding.
    WindowSum,
    /// Maximum sum of a half-length window, every window summed from scratch.
    WindowSumNaive,
    /// Duplicate within a half-length window, sliding set.
    NearbyDuplicate,
    /// Plain sum of the values.
    Sum,
}

impl Workload {
    pub const ALL: [Workload; 6] = [
        Workload::LongestUnique,
        Workload::LongestUniqueNaive,
        Workload::WindowSum,
        Workload::WindowSumNaive,
        Workload::NearbyDuplicate,
        Workload::Sum,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Workload::LongestUnique => "longest-unique",
            Workload::LongestUniqueNaive => "longest-unique-naive",
            Workload::WindowSum => "window-sum",
            Workload::WindowSumNaive => "window-sum-naive",
            Workload::NearbyDuplicate => "nearby-duplicate",
            Workload::Sum => "sum",
        }
    }

    /// Time complexity the workload should show on its generated inputs.
    pub fn expected_time(&self) -> Complexity {
        match self {
            Workload::LongestUniqueNaive | Workload::WindowSumNaive => Complexity::QuadraticOrWorse,
            _ => Complexity::Linear,
        }
    }

    pub fn chart_file_name(&self) -> String {
        format!("{}.svg", self.name())
    }

    /// Runs this workload over `config.sizes` with inputs from `gens`.
    pub fn run(
        &self,
        runner: &mut Runner,
        config: &RunConfig,
        gens: &Generators,
    ) -> Result<RunSummary, BenchError> {
        match self {
            Workload::LongestUnique => {
                runner.run(config, |n| gens.ascii(n), |s: &String| longest_unique_run(s.as_bytes()))
            }
            Workload::LongestUniqueNaive => runner.run(
                config,
                |n| gens.distinct_values(n),
                |values: &Vec<u64>| longest_unique_run_naive(values.as_slice()),
            ),
            Workload::WindowSum => runner.run(
                config,
                |n| gens.windowed_values(n),
                |(values, k): &(Vec<i64>, usize)| max_window_sum(values, *k),
            ),
            Workload::WindowSumNaive => runner.run(
                config,
                |n| gens.windowed_values(n),
                |(values, k): &(Vec<i64>, usize)| max_window_sum_naive(values, *k),
            ),
            Workload::NearbyDuplicate => runner.run(
                config,
                |n| gens.windowed_values(n),
                |(values, k): &(Vec<i64>, usize)| contains_nearby_duplicate(values, *k),
            ),
            Workload::Sum => runner.run(config, |n| gens.values(n), |values: &Vec<i64>| sum(values)),
        }
    }
}
