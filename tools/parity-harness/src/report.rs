//! Console report
//!
//! Line-oriented `key=value` output on stdout. Keys are prefixed with the adapter names so
//! a script can pick out e.g. `turboxl_median_sec`.

use crate::types::{RoundMeasurement, RunReport};
use std::io::{self, Write};
use std::time::Duration;

fn secs(duration: Duration) -> String {
    format!("{:.3}", duration.as_secs_f64())
}

/// One line per round, followed by the subject's timing line when it printed one
pub fn write_round<W: Write>(
    out: &mut W,
    subject_name: &str,
    reference_name: &str,
    measurement: &RoundMeasurement,
) -> io::Result<()> {
    let rows = measurement
        .row_count
        .map_or_else(|| "unknown".to_string(), |n| n.to_string());

    writeln!(
        out,
        "round={} {}_sec={} {}_sec={} rows={}",
        measurement.round,
        subject_name,
        secs(measurement.subject_duration),
        reference_name,
        secs(measurement.reference_duration),
        rows
    )?;

    if let Some(timing) = &measurement.subject_timing {
        writeln!(out, "{}", timing)?;
    }

    Ok(())
}

/// Parity block: sizes, digests, match flag and the first divergence on mismatch
pub fn write_parity<W: Write>(out: &mut W, report: &RunReport) -> io::Result<()> {
    let parity = &report.parity;

    writeln!(out)?;
    writeln!(out, "PARITY")?;
    writeln!(
        out,
        "{}_bytes={} sha256={}",
        report.subject_name, parity.left_bytes, parity.left_digest
    )?;
    writeln!(
        out,
        "{}_bytes={} sha256={}",
        report.reference_name, parity.right_bytes, parity.right_digest
    )?;
    let hash_match = if parity.matches { "True" } else { "False" };
    writeln!(out, "hash_match={}", hash_match)?;

    if let Some(divergence) = &parity.divergence {
        writeln!(out, "first_diff_line={}", divergence.line_number)?;
        writeln!(out, "{}: {}", report.subject_name, divergence.left)?;
        writeln!(out, "{}: {}", report.reference_name, divergence.right)?;
    }

    Ok(())
}

/// Summary block with the median duration of each side
pub fn write_summary<W: Write>(out: &mut W, report: &RunReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "SUMMARY")?;
    writeln!(
        out,
        "{}_median_sec={}",
        report.subject_name,
        secs(report.summary.subject.median)
    )?;
    writeln!(
        out,
        "{}_median_sec={}",
        report.reference_name,
        secs(report.summary.reference.median)
    )?;
    Ok(())
}

/// Full report: every round, then parity, then summary
pub fn write_report<W: Write>(out: &mut W, report: &RunReport) -> io::Result<()> {
    for measurement in &report.rounds {
        write_round(out, &report.subject_name, &report.reference_name, measurement)?;
    }
    write_parity(out, report)?;
    write_summary(out, report)
}
