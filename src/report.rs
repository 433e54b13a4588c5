use crate::aggregate::SignalValue;
use crate::error::Result;
use crate::level::LevelStats;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Shortest round-trip decimal with a `.0` on integral values (`2.5`, `3.0`).
/// Magnitudes outside `[1e-4, 1e16)` switch to exponent form (`1e+16`, `1.5e-05`).
pub fn fmt_real(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_owned();
    }
    if v.is_infinite() {
        return (if v > 0.0 { "inf" } else { "-inf" }).to_owned();
    }

    let mag = v.abs();
    if mag == 0.0 || (1e-4..1e16).contains(&mag) {
        // Debug prints the shortest round-trip digits and keeps a trailing `.0`.
        return format!("{v:?}");
    }

    // LowerExp gives e.g. `1.5e-5`; widen the exponent to a sign and two digits.
    let s = format!("{v:e}");
    let Some((mantissa, exp)) = s.split_once('e') else {
        return s;
    };
    let (sign, digits) = match exp.strip_prefix('-') {
        Some(d) => ('-', d),
        None => ('+', exp),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// `Zero` prints as a bare `0`, everything else through `fmt_real`.
impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SignalValue::Zero => f.write_str("0"),
            SignalValue::Real(v) => f.write_str(&fmt_real(v)),
        }
    }
}

impl fmt::Display for LevelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Level {}: Mean = {}, Max = {}, Min = {}, Sum = {}",
            self.level, self.mean, self.max, self.min, self.sum
        )
    }
}

pub fn report_lines(stats: &[LevelStats]) -> Vec<String> {
    stats.iter().map(|s| s.to_string()).collect()
}

/// Writes one line per level, in the order given.
pub fn write_report_to<W: Write>(w: &mut W, stats: &[LevelStats]) -> Result<()> {
    for line in report_lines(stats) {
        writeln!(w, "{line}")?;
    }
    Ok(())
}

/// Creates (or truncates) `path` and writes the report into it.
pub fn write_report<P: AsRef<Path>>(path: P, stats: &[LevelStats]) -> Result<()> {
    let mut w = BufWriter::new(File::create(path.as_ref())?);
    write_report_to(&mut w, stats)?;
    w.flush()?;
    info!(path = %path.as_ref().display(), n_lines = stats.len(), "wrote report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SignalValue::{Real, Zero};

    #[test]
    fn fmt_real_matches_plain_decimal_style() {
        assert_eq!(fmt_real(2.5), "2.5");
        assert_eq!(fmt_real(3.0), "3.0");
        assert_eq!(fmt_real(0.0), "0.0");
        assert_eq!(fmt_real(-0.0), "-0.0");
        assert_eq!(fmt_real(-12.25), "-12.25");
        assert_eq!(fmt_real(0.1), "0.1");
        assert_eq!(fmt_real(0.0001), "0.0001");
        assert_eq!(fmt_real(123456789.0), "123456789.0");
        assert_eq!(fmt_real(1e15), "1000000000000000.0");
    }

    #[test]
    fn fmt_real_switches_to_exponent_outside_range() {
        assert_eq!(fmt_real(1e16), "1e+16");
        assert_eq!(fmt_real(2.5e20), "2.5e+20");
        assert_eq!(fmt_real(1.5e-5), "1.5e-05");
        assert_eq!(fmt_real(-3e-7), "-3e-07");
        assert_eq!(fmt_real(1e-100), "1e-100");
        assert_eq!(fmt_real(f64::INFINITY), "inf");
        assert_eq!(fmt_real(f64::NEG_INFINITY), "-inf");
        assert_eq!(fmt_real(f64::NAN), "nan");
    }

    #[test]
    fn line_shape() {
        let stats = LevelStats {
            level: 1,
            mean: Real(2.5),
            max: Real(3.0),
            min: Real(2.0),
            sum: Real(5.0),
        };
        assert_eq!(
            stats.to_string(),
            "Level 1: Mean = 2.5, Max = 3.0, Min = 2.0, Sum = 5.0"
        );
    }

    #[test]
    fn regions_without_voxels_print_as_bare_zero() {
        let stats = LevelStats::from_values(1, &[Zero, Real(1.5)]).unwrap();
        assert_eq!(
            stats.to_string(),
            "Level 1: Mean = 0.75, Max = 1.5, Min = 0, Sum = 1.5"
        );

        let stats = LevelStats::from_values(0, &[Zero, Zero]).unwrap();
        assert_eq!(stats.to_string(), "Level 0: Mean = 0, Max = 0, Min = 0, Sum = 0");

        let stats = LevelStats::from_values(2, &[Real(0.0), Zero]).unwrap();
        assert_eq!(
            stats.to_string(),
            "Level 2: Mean = 0.0, Max = 0.0, Min = 0.0, Sum = 0.0"
        );
    }

    #[test]
    fn it_overwrites_existing_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale contents that are longer than the report\n".repeat(10)).unwrap();

        let stats = vec![
            LevelStats {
                level: 0,
                mean: Zero,
                max: Zero,
                min: Zero,
                sum: Zero,
            },
            LevelStats {
                level: 1,
                mean: Real(4.0),
                max: Real(5.0),
                min: Real(2.0),
                sum: Real(12.0),
            },
        ];
        write_report(&path, &stats).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Level 0: Mean = 0, Max = 0, Min = 0, Sum = 0\n\
             Level 1: Mean = 4.0, Max = 5.0, Min = 2.0, Sum = 12.0\n"
        );
    }

    #[test]
    fn empty_report_is_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_report(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("out.csv");
        assert!(write_report(&path, &[]).is_err());
    }
}
