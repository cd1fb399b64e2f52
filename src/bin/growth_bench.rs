use clap::{Parser, Subcommand, ValueEnum};
use growth_bench::alloc::CountingAllocator;
use growth_bench::chart::{ChartTarget, DEFAULT_OUTPUT_DIR};
use growth_bench::dataset::Generators;
use growth_bench::harness::{BenchConfig, Profile};
use growth_bench::schema::{GrowthReport, RunMeta, RunRecord};
use growth_bench::workloads::Workload;
use growth_bench::{BenchError, GrowthEstimator, RatioMode, RunConfig, Runner};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static ALLOC: CountingAllocator = CountingAllocator::new();

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Quick,
    Full,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Quick => Profile::Quick,
            ProfileArg::Full => Profile::Full,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Measure one workload across a size ladder.
    Run {
        #[arg(long, value_enum)]
        workload: Workload,

        /// Comma-separated input sizes; defaults to the profile's ladder.
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        sizes: Option<Vec<usize>>,

        /// Chart directory.
        #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
        out_dir: PathBuf,

        /// Chart file name; defaults to `<workload>.svg`.
        #[arg(long, value_name = "NAME")]
        file: Option<String>,

        /// Rescale growth ratios to an e-fold size step before classifying.
        #[arg(long, default_value_t = false)]
        per_e_fold: bool,
    },

    /// Measure every workload with the profile's sizes.
    Suite {
        #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
        out_dir: PathBuf,

        #[arg(long, default_value_t = false)]
        per_e_fold: bool,
    },

    /// List workloads and the time complexity they should show.
    List,
}

#[derive(Parser, Debug)]
#[command(name = "growth-bench")]
#[command(about = "Single-sample growth benchmarks with coarse complexity verdicts")]
struct Args {
    #[arg(long, value_enum, default_value_t = ProfileArg::Quick, global = true)]
    profile: ProfileArg,

    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    /// Where to write the JSON report. If omitted, prints to stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

fn now_unix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

fn git_sha_short() -> Option<String> {
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

fn ratio_mode(per_e_fold: bool) -> RatioMode {
    if per_e_fold {
        RatioMode::PerEFold
    } else {
        RatioMode::Raw
    }
}

/// The table goes to stderr so stdout carries only the JSON report.
fn build_runner(mode: RatioMode) -> Runner {
    Runner::new()
        .with_estimator(GrowthEstimator::new(mode))
        .with_sink(std::io::stderr())
}

fn run_workload(
    runner: &mut Runner,
    workload: Workload,
    sizes: Vec<usize>,
    out_dir: &Path,
    file: &str,
    gens: &Generators,
) -> Result<RunRecord, BenchError> {
    let config =
        RunConfig::new(workload.name(), sizes)?.with_output(ChartTarget::new(out_dir, file)?);
    let summary = workload.run(runner, &config, gens)?;

    if summary.verdicts.time.is_some() && summary.verdicts.time != Some(workload.expected_time()) {
        warn!(
            workload = workload.name(),
            expected = workload.expected_time().as_str(),
            "time verdict differs from the workload's known complexity"
        );
    }
    Ok(summary.record(runner.estimator()))
}

fn main() -> Result<(), BenchError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = BenchConfig {
        profile: args.profile.into(),
        seed: args.seed,
    };
    let gens = Generators::new(cfg.clone());

    let mut benchmarks = Vec::new();

    match &args.cmd {
        Command::Run {
            workload,
            sizes,
            out_dir,
            file,
            per_e_fold,
        } => {
            let mut runner = build_runner(ratio_mode(*per_e_fold));
            let sizes = sizes.clone().unwrap_or_else(|| cfg.sizes());
            let file = file.clone().unwrap_or_else(|| workload.chart_file_name());
            benchmarks.push(run_workload(
                &mut runner,
                *workload,
                sizes,
                out_dir,
                &file,
                &gens,
            )?);
        }
        Command::Suite {
            out_dir,
            per_e_fold,
        } => {
            let mut runner = build_runner(ratio_mode(*per_e_fold));
            for workload in Workload::ALL {
                benchmarks.push(run_workload(
                    &mut runner,
                    workload,
                    cfg.sizes(),
                    out_dir,
                    &workload.chart_file_name(),
                    &gens,
                )?);
            }
        }
        Command::List => {
            for workload in Workload::ALL {
                println!("{:<22} {}", workload.name(), workload.expected_time());
            }
            return Ok(());
        }
    }

    if !ALLOC.is_active() {
        warn!("counting allocator inactive; memory deltas are zero");
    }

    let report = GrowthReport {
        run: RunMeta {
            schema_version: 1,
            bench_version: env!("CARGO_PKG_VERSION").to_string(),
            profile: cfg.profile.as_str().to_string(),
            seed: cfg.seed,
            timestamp_utc: now_unix(),
            git_sha: git_sha_short(),
        },
        benchmarks,
    };

    let json = serde_json::to_string_pretty(&report)?;
    if let Some(out) = args.out {
        fs::write(&out, json)?;
        info!(path = %out.display(), "json report written");
    } else {
        println!("{json}");
    }

    Ok(())
}
