use std::fmt::Write as _;
use std::io::{self, Write};

use crate::runner::RunConfig;
use crate::schema::{Complexity, MeasurementPoint, Verdicts};

fn verdict_label(verdict: Option<Complexity>) -> String {
    match verdict {
        Some(c) => c.to_string(),
        None => "indeterminate (need at least 2 sizes)".to_string(),
    }
}

/// Human-readable report: header, one table row per point, then the verdicts.
pub fn render(config: &RunConfig, points: &[MeasurementPoint], verdicts: &Verdicts) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "=== {} ===", config.name);
    let _ = writeln!(out, "{:>12} | {:>14} | {:>14}", "size", "time (ms)", "memory (MB)");
    let _ = writeln!(out, "{:-<12}-+-{:-<14}-+-{:-<14}", "", "", "");
    for p in points {
        let _ = writeln!(
            out,
            "{:>12} | {:>14.4} | {:>14.4}",
            p.input_size, p.time_ms, p.memory_mb
        );
    }
    let _ = writeln!(out, "Complexity estimate:");
    let _ = writeln!(out, "  time:   {}", verdict_label(verdicts.time));
    let _ = writeln!(out, "  memory: {}", verdict_label(verdicts.memory));
    out
}

/// Writes [`render`] to `w`. Write errors propagate as-is.
pub fn report<W: Write>(
    w: &mut W,
    config: &RunConfig,
    points: &[MeasurementPoint],
    verdicts: &Verdicts,
) -> io::Result<()> {
    w.write_all(render(config, points, verdicts).as_bytes())?;
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (RunConfig, Vec<MeasurementPoint>, Verdicts) {
        let config = RunConfig::new("window-sum", vec![100, 250]).unwrap();
        let points = vec![
            MeasurementPoint {
                input_size: 100,
                time_ms: 0.5,
                memory_mb: 0.0,
            },
            MeasurementPoint {
                input_size: 250,
                time_ms: 1.25,
                memory_mb: -0.125,
            },
        ];
        let verdicts = Verdicts {
            time: Some(Complexity::Linear),
            memory: None,
        };
        (config, points, verdicts)
    }

    #[test]
    fn renders_header_rows_and_verdicts() {
        let (config, points, verdicts) = fixture();
        let text = render(&config, &points, &verdicts);

        assert!(text.starts_with("=== window-sum ===\n"));
        assert!(text.contains("         100 |         0.5000 |         0.0000"));
        assert!(text.contains("         250 |         1.2500 |        -0.1250"));
        assert!(text.contains("time:   linear O(n)"));
        assert!(text.contains("memory: indeterminate"));
    }

    #[test]
    fn reporting_twice_is_identical() {
        let (config, points, verdicts) = fixture();
        let mut first = Vec::new();
        let mut second = Vec::new();
        report(&mut first, &config, &points, &verdicts).unwrap();
        report(&mut second, &config, &points, &verdicts).unwrap();
        assert_eq!(first, second);
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_propagates() {
        let (config, points, verdicts) = fixture();
        let err = report(&mut Broken, &config, &points, &verdicts).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
