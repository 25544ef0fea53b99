//! Error types returned by the aggregation engine.

/// Failure to turn a traffic CSV into records. Always fatal: nothing is
/// returned from a load that hits one of these.
#[derive(thiserror::Error, Debug)]
pub enum DataLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Column {canonical} appears more than once (as {first:?} and {second:?})")]
    DuplicateColumn {
        canonical: String,
        first: String,
        second: String,
    },
    #[error("Row {row}: cannot parse timestamp {value:?}")]
    InvalidTimestamp { row: u64, value: String },
    #[error("Row {row}: vehicle count {value} is not a non-negative whole number")]
    InvalidVehicleCount { row: u64, value: f64 },
    #[error("Row {row}: {source}")]
    InvalidRow {
        row: u64,
        #[source]
        source: csv::Error,
    },
}

/// A vehicle count outside the domain of the color thresholds.
#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Invalid vehicle count: {0}")]
pub struct InvalidVehicleCount(pub f64);
