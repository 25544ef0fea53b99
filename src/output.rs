//! Output formatting and CSV export of per-cell averages.
//!
//! Supports pretty-printing, JSON serialization, CSV export and gzip
//! compression of export files.

use anyhow::Result;
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fmt::Debug;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::types::CellAverage;

/// File name offered for the filtered-data download.
pub const DEFAULT_EXPORT_FILE: &str = "filtered_traffic_data.csv";

/// Export header, in [`CellAverage`] field order.
pub const EXPORT_COLUMNS: &[&str] = &[
    "cell_id",
    "latitude",
    "longitude",
    "min_speed",
    "max_speed",
    "avg_speed",
    "vehicle_count",
];

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes the header and one row per cell. The header is written even for
/// an empty table.
fn write_rows<W: Write>(writer: W, rows: &[CellAverage]) -> Result<W> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record(EXPORT_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))
}

/// Renders an export CSV in memory.
pub fn export_bytes(rows: &[CellAverage]) -> Result<Vec<u8>> {
    write_rows(Vec::new(), rows)
}

/// Writes an export CSV to `path`, replacing any existing file.
pub fn write_export(path: &str, rows: &[CellAverage]) -> Result<()> {
    debug!(path, rows = rows.len(), "Writing CSV export");

    let file = File::create(Path::new(path))?;
    write_rows(file, rows)?;

    Ok(())
}

/// Parses an export CSV back into per-cell rows.
pub fn read_export(bytes: &[u8]) -> Result<Vec<CellAverage>> {
    let mut rdr = csv::Reader::from_reader(bytes);
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let row: CellAverage = result?;
        rows.push(row);
    }

    Ok(rows)
}

/// Gzip-compresses a buffer.
pub fn gzip_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}
