//! Trend chart export.
//!
//! The runner only hands over a [`ChartData`] and a [`ChartTarget`]; how the
//! chart is drawn is up to the [`ChartExporter`]. [`SvgChartExporter`] draws
//! time and memory against input size as two line series, each with its own
//! y-axis (time on the left, memory on the right).

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::BenchError;
use crate::schema::MeasurementPoint;

pub const DEFAULT_OUTPUT_DIR: &str = "benchmark-results";
pub const DEFAULT_FILE_NAME: &str = "benchmark.svg";

/// Where a chart is written: `dir/file_name`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartTarget {
    pub dir: PathBuf,
    pub file_name: String,
}

impl ChartTarget {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Result<Self, BenchError> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(BenchError::EmptyFileName);
        }
        Ok(Self {
            dir: dir.into(),
            file_name,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

impl Default for ChartTarget {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

/// Everything a chart backend needs from a run.
#[derive(Clone, Copy, Debug)]
pub struct ChartData<'a> {
    pub name: &'a str,
    pub points: &'a [MeasurementPoint],
}

pub trait ChartExporter {
    /// Renders and persists the chart, returning the written path.
    fn export(&self, chart: &ChartData<'_>, target: &ChartTarget) -> Result<PathBuf, BenchError>;
}

/// Creates `dir` if it does not exist yet. Losing a creation race is fine.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SvgChartExporter {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgChartExporter {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
        }
    }
}

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 80.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const TICKS: usize = 5;
const TIME_COLOR: &str = "#1f77b4";
const MEMORY_COLOR: &str = "#d62728";

/// Linear map from a value range onto a pixel range.
struct Axis {
    lo: f64,
    hi: f64,
    px_lo: f64,
    px_hi: f64,
}

impl Axis {
    fn new(values: impl Iterator<Item = f64>, px_lo: f64, px_hi: f64) -> Self {
        let (mut lo, mut hi) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if (hi - lo).abs() < f64::EPSILON {
            lo -= 0.5;
            hi += 0.5;
        }
        Self { lo, hi, px_lo, px_hi }
    }

    fn px(&self, v: f64) -> f64 {
        self.px_lo + (v - self.lo) / (self.hi - self.lo) * (self.px_hi - self.px_lo)
    }

    fn tick(&self, i: usize) -> f64 {
        self.lo + (self.hi - self.lo) * i as f64 / TICKS as f64
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

impl SvgChartExporter {
    /// SVG document for `chart`. Sizes are placed at evenly spaced x positions in run order.
    pub fn render(&self, chart: &ChartData<'_>) -> String {
        let w = self.width as f64;
        let h = self.height as f64;
        let plot_left = MARGIN_LEFT;
        let plot_right = w - MARGIN_RIGHT;
        let plot_top = MARGIN_TOP;
        let plot_bottom = h - MARGIN_BOTTOM;

        let n = chart.points.len();
        let x_of = |i: usize| {
            if n <= 1 {
                (plot_left + plot_right) / 2.0
            } else {
                plot_left + (plot_right - plot_left) * i as f64 / (n - 1) as f64
            }
        };
        let time_axis = Axis::new(chart.points.iter().map(|p| p.time_ms), plot_bottom, plot_top);
        let mem_axis = Axis::new(chart.points.iter().map(|p| p.memory_mb), plot_bottom, plot_top);

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="28" text-anchor="middle" font-size="16">{}</text>"#,
            w / 2.0,
            escape(chart.name)
        );

        // frame
        let _ = writeln!(
            svg,
            r##"<rect x="{plot_left}" y="{plot_top}" width="{}" height="{}" fill="none" stroke="#888"/>"##,
            plot_right - plot_left,
            plot_bottom - plot_top
        );

        for i in 0..=TICKS {
            let t = time_axis.tick(i);
            let m = mem_axis.tick(i);
            let y = time_axis.px(t);
            let _ = writeln!(
                svg,
                r##"<line x1="{plot_left}" y1="{y:.1}" x2="{plot_right}" y2="{y:.1}" stroke="#eee"/>"##
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end" fill="{TIME_COLOR}">{t:.3}</text>"#,
                plot_left - 6.0,
                y + 4.0
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="start" fill="{MEMORY_COLOR}">{m:.3}</text>"#,
                plot_right + 6.0,
                mem_axis.px(m) + 4.0
            );
        }

        for (i, p) in chart.points.iter().enumerate() {
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
                x_of(i),
                plot_bottom + 18.0,
                p.input_size
            );
        }

        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">input size</text>"#,
            (plot_left + plot_right) / 2.0,
            h - 16.0
        );
        let _ = writeln!(
            svg,
            r#"<text x="18" y="{:.1}" text-anchor="middle" fill="{TIME_COLOR}" transform="rotate(-90 18 {:.1})">time (ms)</text>"#,
            (plot_top + plot_bottom) / 2.0,
            (plot_top + plot_bottom) / 2.0
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" fill="{MEMORY_COLOR}" transform="rotate(90 {:.1} {:.1})">memory (MB)</text>"#,
            w - 18.0,
            (plot_top + plot_bottom) / 2.0,
            w - 18.0,
            (plot_top + plot_bottom) / 2.0
        );

        for (axis, color, metric) in [
            (&time_axis, TIME_COLOR, Metric::Time),
            (&mem_axis, MEMORY_COLOR, Metric::Memory),
        ] {
            let coords: Vec<(f64, f64)> = chart
                .points
                .iter()
                .enumerate()
                .map(|(i, p)| (x_of(i), axis.px(metric.of(p))))
                .collect();
            let path: Vec<String> = coords.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
            let _ = writeln!(
                svg,
                r#"<polyline class="{}" points="{}" fill="none" stroke="{color}" stroke-width="2"/>"#,
                metric.label(),
                path.join(" ")
            );
            for (x, y) in coords {
                let _ = writeln!(svg, r#"<circle cx="{x:.1}" cy="{y:.1}" r="3" fill="{color}"/>"#);
            }
        }

        // legend
        let _ = writeln!(
            svg,
            r#"<rect x="{:.1}" y="{:.1}" width="12" height="12" fill="{TIME_COLOR}"/><text x="{:.1}" y="{:.1}">time (ms)</text>"#,
            plot_left + 10.0,
            plot_top + 10.0,
            plot_left + 28.0,
            plot_top + 20.0
        );
        let _ = writeln!(
            svg,
            r#"<rect x="{:.1}" y="{:.1}" width="12" height="12" fill="{MEMORY_COLOR}"/><text x="{:.1}" y="{:.1}">memory (MB)</text>"#,
            plot_left + 10.0,
            plot_top + 28.0,
            plot_left + 28.0,
            plot_top + 38.0
        );
        svg.push_str("</svg>\n");
        svg
    }
}

#[derive(Clone, Copy)]
enum Metric {
    Time,
    Memory,
}

impl Metric {
    fn of(&self, p: &MeasurementPoint) -> f64 {
        match self {
            Metric::Time => p.time_ms,
            Metric::Memory => p.memory_mb,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Metric::Time => "time",
            Metric::Memory => "memory",
        }
    }
}

impl ChartExporter for SvgChartExporter {
    fn export(&self, chart: &ChartData<'_>, target: &ChartTarget) -> Result<PathBuf, BenchError> {
        ensure_dir(&target.dir)?;
        let path = target.path();
        fs::write(&path, self.render(chart))?;
        debug!(path = %path.display(), points = chart.points.len(), "chart written");
        Ok(path)
    }
}
