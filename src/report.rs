//! Line-oriented text reports.
//!
//! One labeled line per scalar and a blank line after every record, so a
//! consumer can walk a file line by line. Floats use the shortest
//! representation that parses back to the same `f64`.
//!
//! Noise sweep record (6 lines plus blank):
//!
//! ```text
//! Error Rate: 0.25
//! Winning rate with x = 0 and y = 0: ...
//! Winning rate with x = 0 and y = 1: ...
//! Winning rate with x = 1 and y = 0: ...
//! Winning rate with x = 1 and y = 1: ...
//! Overall winning rate: 0.7632( 381600 / 500000 )
//! ```

use std::io::{BufRead, Write};

use crate::error::{ChshError, Result};
use crate::experiment::{NoisePoint, StrategyComparison, SurveyEntry};

/// Labeled strategy results.
pub fn write_comparison<W: Write + ?Sized>(w: &mut W, rows: &[StrategyComparison]) -> Result<()> {
    for row in rows {
        writeln!(w, "{}", row.label)?;
        writeln!(w, "{}", row.result)?;
        writeln!(w)?;
    }
    Ok(())
}

/// One record per noise rate.
pub fn write_noise_sweep<W: Write + ?Sized>(w: &mut W, points: &[NoisePoint]) -> Result<()> {
    for p in points {
        writeln!(w, "Error Rate: {}", p.err)?;
        writeln!(w, "{}", p.result)?;
        writeln!(w)?;
    }
    Ok(())
}

/// One record per surveyed noise rate; angles in degrees.
pub fn write_angle_survey<W: Write + ?Sized>(w: &mut W, entries: &[SurveyEntry]) -> Result<()> {
    for e in entries {
        let [a, zero, b] = e.search.angles.to_degrees();
        writeln!(w, "Error rate: {}", e.err)?;
        writeln!(w, "Diff_a: {} Diff_0: {} Diff_b: {}", a, zero, b)?;
        writeln!(
            w,
            "Search: {} after {} generations ({} evaluations)",
            e.search.status.label(),
            e.search.generations,
            e.search.evaluations
        )?;
        writeln!(w, "{}", e.result)?;
        writeln!(w)?;
    }
    Ok(())
}

/// Parse a noise sweep report back into `(err, overall win rate)` pairs.
pub fn read_noise_sweep<R: BufRead>(reader: R) -> Result<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut err = None;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = i + 1;
        if let Some(rest) = line.strip_prefix("Error Rate:") {
            err = Some(parse_float(rest, lineno)?);
        } else if let Some(rest) = line.strip_prefix("Overall winning rate:") {
            let rate = rest.split('(').next().unwrap_or_default();
            let e = err.take().ok_or_else(|| ChshError::ReportFormat {
                line: lineno,
                reason: "overall rate without a preceding error rate".to_string(),
            })?;
            out.push((e, parse_float(rate, lineno)?));
        }
    }
    if err.is_some() {
        return Err(ChshError::ReportFormat {
            line: 0,
            reason: "truncated record at end of report".to_string(),
        });
    }
    Ok(out)
}

fn parse_float(text: &str, line: usize) -> Result<f64> {
    text.trim().parse().map_err(|e| ChshError::ReportFormat {
        line,
        reason: format!("bad number {:?}: {}", text.trim(), e),
    })
}
