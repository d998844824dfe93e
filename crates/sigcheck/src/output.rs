use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use console::style;
use serde_json::{Value, json};
use sigcheck_batch::{FileResult, Outcome, RunReport};
use tracing::error;

use crate::cli::OutputFormat;

pub const EXIT_SUCCESS: u8 = 0;
/// At least one entry did not verify.
pub const EXIT_FAILURE: u8 = 1;
/// Exit status for a fatal error raised before any file was checked.
pub const EXIT_FATAL: u8 = 2;

pub fn exit_status(report: &RunReport) -> u8 {
    if report.is_success() { EXIT_SUCCESS } else { EXIT_FAILURE }
}

/// Write the report and return the exit status of the run. The verdict does
/// not depend on whether the report could be written.
pub fn conclude(out: &mut impl Write, report: &RunReport, format: OutputFormat, verbose: bool) -> u8 {
    if let Err(err) = render(out, report, format, verbose) {
        error!(error = %err, "failed to write the report");
    }
    exit_status(report)
}

pub fn render(out: &mut impl Write, report: &RunReport, format: OutputFormat, verbose: bool) -> Result<()> {
    match format {
        OutputFormat::Text => write_text(out, report, verbose)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &report_json(report))?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

pub fn print_fatal(err: &anyhow::Error) {
    eprintln!("{} {err:#}", style("error:").red().bold());
}

fn write_text(out: &mut impl Write, report: &RunReport, verbose: bool) -> io::Result<()> {
    for result in sorted(report) {
        match result.outcome() {
            Outcome::Matched if verbose => {
                writeln!(out, "{} {}", style("ok:").green().bold(), result.name)?;
            }
            Outcome::Matched => {}
            Outcome::Mismatch => {
                writeln!(out, "{} {} mismatch", style("error:").red().bold(), result.name)?;
            }
            Outcome::Error => {
                let reason = result.error.as_ref().map(ToString::to_string).unwrap_or_default();
                writeln!(out, "{} {}: {reason}", style("error:").red().bold(), result.name)?;
            }
            Outcome::Skipped => {
                writeln!(out, "{} {} skipped", style("warning:").yellow().bold(), result.name)?;
            }
        }
    }

    if report.missing > 0 {
        writeln!(
            out,
            "{} {} file(s) never reported a result",
            style("error:").red().bold(),
            report.missing
        )?;
    }

    writeln!(
        out,
        "processed {} files in {}",
        report.processed(),
        format_duration(report.elapsed)
    )
}

fn report_json(report: &RunReport) -> Value {
    let names = |outcome| -> Vec<&str> {
        let mut names: Vec<&str> = report.with_outcome(outcome).map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        names
    };
    let errors: Vec<Value> = sorted(report)
        .into_iter()
        .filter(|r| r.outcome() == Outcome::Error)
        .map(|r| {
            json!({
                "file": r.name,
                "error": r.error.as_ref().map(ToString::to_string),
            })
        })
        .collect();

    json!({
        "success": report.is_success(),
        "total": report.total,
        "processed": report.processed(),
        "matched": report.tally.matched,
        "mismatched": names(Outcome::Mismatch),
        "errors": errors,
        "skipped": names(Outcome::Skipped),
        "missing": report.missing,
        "peak_in_flight": report.peak_in_flight,
        "elapsed_ms": report.elapsed.as_millis() as u64,
    })
}

fn sorted(report: &RunReport) -> Vec<&FileResult> {
    let mut results: Vec<&FileResult> = report.results.iter().collect();
    results.sort_by(|a, b| a.name.cmp(&b.name));
    results
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:02}s", secs, millis / 10)
    } else {
        format!("{millis}ms")
    }
}
