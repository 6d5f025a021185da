//! Writing metrics tables and summaries back to disk.

use crate::source::CsvRecord;
use crate::summary::Summary;
use crate::table::MetricsTable;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Summary document with provenance
#[derive(Debug, Serialize)]
pub struct SummaryReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub source: &'a str,
    pub summary: &'a Summary,
}

fn create<P: AsRef<Path>>(path: P, what: &str) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path.as_ref())
        .with_context(|| format!("Failed to create {}: {}", what, path.as_ref().display()))
}

/// Write the base table in the simulation's CSV layout
pub fn write_table_csv<P: AsRef<Path>>(table: &MetricsTable, path: P) -> Result<()> {
    let file = create(&path, "CSV export")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    for row in table.rows() {
        writer.serialize(CsvRecord::from(row))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.as_ref().display()))?;

    log::info!(
        "Exported {} rows to {}",
        table.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Write the summary as pretty-printed JSON
pub fn write_summary_json<P: AsRef<Path>>(summary: &Summary, source: &str, path: P) -> Result<()> {
    let file = create(&path, "summary file")?;
    let mut writer = BufWriter::new(file);

    let report = SummaryReport {
        generated_at: Utc::now(),
        source,
        summary,
    };
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writeln!(writer)?;
    writer.flush()?;

    log::info!("Wrote summary to {}", path.as_ref().display());
    Ok(())
}
