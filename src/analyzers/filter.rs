use chrono::NaiveDate;

use crate::analyzers::types::TrafficRecord;

/// Records whose date falls within `start..=end`. Time of day is ignored.
///
/// An inverted range simply matches nothing.
pub fn filter_by_date_range(
    records: &[TrafficRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<TrafficRecord> {
    records
        .iter()
        .filter(|r| (start..=end).contains(&r.date()))
        .cloned()
        .collect()
}

/// Records for exactly one cell. Unknown cells yield an empty result.
pub fn filter_by_cell(records: &[TrafficRecord], cell_id: &str) -> Vec<TrafficRecord> {
    records
        .iter()
        .filter(|r| r.cell_id == cell_id)
        .cloned()
        .collect()
}
