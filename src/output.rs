//! Report serialization: CSV and JSON sinks.
//!
//! The sink is order-preserving: rows are written exactly as produced by the
//! aggregator, never re-sorted or deduplicated.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::metrics::ReportRow;

/// Logs report rows using Rust's debug pretty-print format.
pub fn print_pretty(rows: &[ReportRow]) {
    debug!("{:#?}", rows);
}

/// Writes the report as CSV: the header line first, then one line per row.
pub fn write_report<W: Write>(writer: W, rows: &[ReportRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    Ok(())
}

/// Writes the CSV report to `path`, replacing any existing file.
pub fn write_report_file(path: &Path, rows: &[ReportRow]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_report(file, rows)?;

    info!(path = %path.display(), rows = rows.len(), "Report written");
    Ok(())
}

/// Writes the report as a pretty-printed JSON array.
pub fn write_json<W: Write>(mut writer: W, rows: &[ReportRow]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Writes the JSON report to `path`, replacing any existing file.
pub fn write_json_file(path: &Path, rows: &[ReportRow]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_json(file, rows)?;

    info!(path = %path.display(), rows = rows.len(), "Report written");
    Ok(())
}
