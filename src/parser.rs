//! CSV loader for traffic density readings.
//!
//! Source files name their columns either with spaces (`MINIMUM SPEED`) or
//! underscores (`MINIMUM_SPEED`). Headers are mapped onto one canonical
//! schema before any row is read, so the rest of the crate only ever sees
//! [`TrafficRecord`].

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use tracing::debug;

use crate::analyzers::types::TrafficRecord;
use crate::error::DataLoadError;

/// Canonical column names every source must provide.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "cell_id",
    "timestamp",
    "latitude",
    "longitude",
    "min_speed",
    "max_speed",
    "avg_speed",
    "vehicle_count",
];

/// Normalized source header -> canonical column.
static COLUMN_ALIASES: &[(&str, &str)] = &[
    ("GEOHASH", "cell_id"),
    ("CELL_ID", "cell_id"),
    ("DATE_TIME", "timestamp"),
    ("TIMESTAMP", "timestamp"),
    ("LATITUDE", "latitude"),
    ("LONGITUDE", "longitude"),
    ("MINIMUM_SPEED", "min_speed"),
    ("MIN_SPEED", "min_speed"),
    ("MAXIMUM_SPEED", "max_speed"),
    ("MAX_SPEED", "max_speed"),
    ("AVERAGE_SPEED", "avg_speed"),
    ("AVG_SPEED", "avg_speed"),
    ("NUMBER_OF_VEHICLES", "vehicle_count"),
    ("VEHICLE_COUNT", "vehicle_count"),
];

/// Timestamp layouts tried after RFC 3339. `%.f` also matches no fraction.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Deserialize)]
struct RawRecord {
    cell_id: String,
    timestamp: String,
    latitude: f64,
    longitude: f64,
    min_speed: f64,
    max_speed: f64,
    avg_speed: f64,
    vehicle_count: f64,
}

/// Accepts counts written as `120` or `120.0`; anything fractional,
/// negative or out of range is rejected.
fn whole_count(value: f64) -> Option<u32> {
    let in_range = value >= 0.0 && value <= f64::from(u32::MAX);
    (in_range && value.fract() == 0.0).then_some(value as u32)
}

/// Upper-cases a header, drops a UTF-8 BOM and joins words with `_`.
fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}

/// Returns the canonical column for a source header, if it is one we read.
pub fn canonical_column(header: &str) -> Option<&'static str> {
    let normalized = normalize_header(header);
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, canonical)| *canonical)
}

/// Rewrites source headers to canonical names. Unrecognized headers pass
/// through untouched and are ignored when rows are deserialized.
fn canonicalize_headers(headers: &StringRecord) -> Result<StringRecord, DataLoadError> {
    let mut seen: HashMap<&'static str, &str> = HashMap::new();
    let mut renamed = StringRecord::new();

    for header in headers.iter() {
        match canonical_column(header) {
            Some(canonical) => {
                if let Some(first) = seen.insert(canonical, header) {
                    return Err(DataLoadError::DuplicateColumn {
                        canonical: canonical.to_string(),
                        first: first.to_string(),
                        second: header.to_string(),
                    });
                }
                renamed.push_field(canonical);
            }
            None => renamed.push_field(header),
        }
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !seen.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataLoadError::MissingColumns(missing));
    }

    Ok(renamed)
}

/// Parses a timestamp cell. Offsets in RFC 3339 values are dropped and the
/// local wall-clock time kept; a bare date means midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Reads every record from a CSV stream.
///
/// Row numbers in errors count data rows from 1.
///
/// # Errors
///
/// Returns a [`DataLoadError`] if the stream cannot be read, a required
/// column is missing or duplicated, or any row is malformed. Nothing is
/// returned from a partially valid file.
pub fn load<R: Read>(reader: R) -> Result<Vec<TrafficRecord>, DataLoadError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = canonicalize_headers(rdr.headers()?)?;
    rdr.set_headers(headers);

    let mut records = Vec::new();
    for (index, result) in rdr.deserialize::<RawRecord>().enumerate() {
        let row = index as u64 + 1;
        let raw = result.map_err(|source| DataLoadError::InvalidRow { row, source })?;

        let timestamp =
            parse_timestamp(&raw.timestamp).ok_or_else(|| DataLoadError::InvalidTimestamp {
                row,
                value: raw.timestamp.clone(),
            })?;

        let vehicle_count =
            whole_count(raw.vehicle_count).ok_or(DataLoadError::InvalidVehicleCount {
                row,
                value: raw.vehicle_count,
            })?;

        records.push(TrafficRecord {
            cell_id: raw.cell_id,
            timestamp,
            latitude: raw.latitude,
            longitude: raw.longitude,
            min_speed: raw.min_speed,
            max_speed: raw.max_speed,
            avg_speed: raw.avg_speed,
            vehicle_count,
        });
    }

    debug!(rows = records.len(), "Traffic records loaded");
    Ok(records)
}

/// Parses records from an in-memory CSV buffer.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<TrafficRecord>, DataLoadError> {
    load(bytes)
}

/// Opens and parses a CSV file on disk.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_path(path: &Path) -> Result<Vec<TrafficRecord>, DataLoadError> {
    let file = File::open(path)?;
    load(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPACED: &str = "\
GEOHASH,DATE_TIME,LATITUDE,LONGITUDE,MINIMUM SPEED,MAXIMUM SPEED,AVERAGE SPEED,NUMBER OF VEHICLES
sxk3xw,2024-12-01 00:00:00,41.0,28.9,12,96,48,120
sxk3xy,2024-12-01 01:00:00,41.1,29.0,20,80,50,35
";

    const UNDERSCORED: &str = "\
GEOHASH,DATE_TIME,LATITUDE,LONGITUDE,MINIMUM_SPEED,MAXIMUM_SPEED,AVERAGE_SPEED,NUMBER_OF_VEHICLES
sxk3xw,2024-12-01 00:00:00,41.0,28.9,12,96,48,120
sxk3xy,2024-12-01 01:00:00,41.1,29.0,20,80,50,35
";

    #[test]
    fn test_parse_spaced_headers() {
        let records = parse_records(SPACED.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].cell_id, "sxk3xw");
        assert_eq!(records[0].min_speed, 12.0);
        assert_eq!(records[0].vehicle_count, 120);
        assert_eq!(
            records[1].timestamp,
            NaiveDateTime::parse_from_str("2024-12-01 01:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
        );
    }

    #[test]
    fn test_header_conventions_agree() {
        assert_eq!(
            parse_records(SPACED.as_bytes()).unwrap(),
            parse_records(UNDERSCORED.as_bytes()).unwrap()
        );
    }

    #[test]
    fn test_extra_columns_and_column_order_ignored() {
        let csv = "\
NUMBER_OF_VEHICLES,GEOHASH,EXTRA,DATE_TIME,LATITUDE,LONGITUDE,MINIMUM_SPEED,MAXIMUM_SPEED,AVERAGE_SPEED
7,sxk3xw,foo,2024-12-01 00:00:00,41.0,28.9,12,96,48
";
        let records = parse_records(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vehicle_count, 7);
        assert_eq!(records[0].cell_id, "sxk3xw");
    }

    #[test]
    fn test_header_only_is_empty() {
        let csv = "GEOHASH,DATE_TIME,LATITUDE,LONGITUDE,MINIMUM_SPEED,MAXIMUM_SPEED,AVERAGE_SPEED,NUMBER_OF_VEHICLES\n";

        assert!(parse_records(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_column() {
        let csv = "GEOHASH,DATE_TIME,LATITUDE,LONGITUDE,MINIMUM_SPEED,MAXIMUM_SPEED,AVERAGE_SPEED\n";

        match parse_records(csv.as_bytes()) {
            Err(DataLoadError::MissingColumns(missing)) => {
                assert_eq!(missing, vec!["vehicle_count".to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_is_missing_columns() {
        assert!(matches!(
            parse_records(b""),
            Err(DataLoadError::MissingColumns(missing)) if missing.len() == REQUIRED_COLUMNS.len()
        ));
    }

    #[test]
    fn test_duplicate_column() {
        let csv = "GEOHASH,DATE_TIME,LATITUDE,LONGITUDE,MINIMUM SPEED,MINIMUM_SPEED,MAXIMUM_SPEED,AVERAGE_SPEED,NUMBER_OF_VEHICLES\n";

        assert!(matches!(
            parse_records(csv.as_bytes()),
            Err(DataLoadError::DuplicateColumn { canonical, .. }) if canonical == "min_speed"
        ));
    }

    #[test]
    fn test_invalid_timestamp_reports_row() {
        let csv = "\
GEOHASH,DATE_TIME,LATITUDE,LONGITUDE,MINIMUM_SPEED,MAXIMUM_SPEED,AVERAGE_SPEED,NUMBER_OF_VEHICLES
sxk3xw,2024-12-01 00:00:00,41.0,28.9,12,96,48,120
sxk3xw,yesterday,41.0,28.9,12,96,48,120
";
        match parse_records(csv.as_bytes()) {
            Err(DataLoadError::InvalidTimestamp { row, value }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "yesterday");
            }
            other => panic!("expected InvalidTimestamp, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_number_reports_row() {
        let csv = "\
GEOHASH,DATE_TIME,LATITUDE,LONGITUDE,MINIMUM_SPEED,MAXIMUM_SPEED,AVERAGE_SPEED,NUMBER_OF_VEHICLES
sxk3xw,2024-12-01 00:00:00,41.0,28.9,12,96,48,many
";
        assert!(matches!(
            parse_records(csv.as_bytes()),
            Err(DataLoadError::InvalidRow { row: 1, .. })
        ));
    }

    #[test]
    fn test_decimal_vehicle_count() {
        let csv = "\
GEOHASH,DATE_TIME,LATITUDE,LONGITUDE,MINIMUM_SPEED,MAXIMUM_SPEED,AVERAGE_SPEED,NUMBER_OF_VEHICLES
sxk3xw,2024-12-01 00:00:00,41.0,28.9,12,96,48,120.0
sxk3xw,2024-12-01 01:00:00,41.0,28.9,12,96,48,35
";
        let records = parse_records(csv.as_bytes()).unwrap();

        assert_eq!(records[0].vehicle_count, 120);
        assert_eq!(records[1].vehicle_count, 35);
    }

    #[test]
    fn test_rejects_fractional_and_negative_counts() {
        for bad in ["12.5", "-4", "NaN"] {
            let csv = format!(
                "GEOHASH,DATE_TIME,LATITUDE,LONGITUDE,MINIMUM_SPEED,MAXIMUM_SPEED,AVERAGE_SPEED,NUMBER_OF_VEHICLES\n\
                 sxk3xw,2024-12-01 00:00:00,41.0,28.9,12,96,48,{bad}\n"
            );
            assert!(
                matches!(
                    parse_records(csv.as_bytes()),
                    Err(DataLoadError::InvalidVehicleCount { row: 1, .. })
                ),
                "count {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_load_path_missing_file() {
        let path = std::env::temp_dir().join("traffic_density_no_such_file.csv");
        let _ = std::fs::remove_file(&path);

        assert!(matches!(load_path(&path), Err(DataLoadError::Io(_))));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected =
            NaiveDateTime::parse_from_str("2024-12-01 13:45:00", "%Y-%m-%d %H:%M:%S").unwrap();

        assert_eq!(parse_timestamp("2024-12-01 13:45:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-12-01T13:45:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-12-01 13:45"), Some(expected));
        assert_eq!(parse_timestamp("2024-12-01T13:45:00+03:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-12-01T13:45:00Z"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-12-01"),
            NaiveDate::from_ymd_opt(2024, 12, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert!(parse_timestamp("2024-12-01 13:45:00.250").is_some());
        assert_eq!(parse_timestamp("01/12/2024"), None);
    }

    #[test]
    fn test_canonical_column() {
        assert_eq!(canonical_column("NUMBER OF VEHICLES"), Some("vehicle_count"));
        assert_eq!(canonical_column(" number_of_vehicles "), Some("vehicle_count"));
        assert_eq!(canonical_column("\u{feff}GEOHASH"), Some("cell_id"));
        assert_eq!(canonical_column("avg_speed"), Some("avg_speed"));
        assert_eq!(canonical_column("EXTRA"), None);
    }
}
