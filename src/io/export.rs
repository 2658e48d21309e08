//! CSV export for trial results and hourly dispatch records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::harness::TrialReport;
use crate::sim::types::HourRecord;

/// Column header for trial result export.
const TRIAL_HEADER: &str = "trial,algorithm,cost,iterations,capacity_kwh";

/// Exports every trial result in `report` to a CSV file at `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_trials_csv(report: &TrialReport, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_trials_csv(report, io::BufWriter::new(file))
}

/// Writes one row per (trial, algorithm), ordered by trial then registry order.
///
/// Failed runs have `cost = inf` and an empty capacity column.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_trials_csv(report: &TrialReport, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(TRIAL_HEADER.split(','))?;

    let mut rows: Vec<_> = report
        .algorithms
        .iter()
        .enumerate()
        .flat_map(|(slot, a)| a.trials.iter().map(move |t| (t.trial, slot, t)))
        .collect();
    rows.sort_by_key(|&(trial, slot, _)| (trial, slot));

    for (_, _, t) in rows {
        wtr.write_record(&[
            t.trial.to_string(),
            t.algorithm.clone(),
            format!("{:.4}", t.cost),
            t.history.len().to_string(),
            t.solution
                .as_ref()
                .map(|s| format!("{:.4}", s.capacity_kwh))
                .unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the hourly dispatch of one evaluated solution.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_dispatch_csv(records: &[HourRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_dispatch_csv(records, io::BufWriter::new(file))
}

/// Writes hourly records with a header derived from [`HourRecord`]'s fields.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_dispatch_csv(records: &[HourRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for r in records {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}
