use chrono::NaiveDateTime;

use crate::analyzers::types::TrafficRecord;

/// Builds a record with fixed position and speeds.
pub(crate) fn record(cell_id: &str, timestamp: &str, vehicle_count: u32) -> TrafficRecord {
    TrafficRecord {
        cell_id: cell_id.to_string(),
        timestamp: NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").unwrap(),
        latitude: 41.0,
        longitude: 29.0,
        min_speed: 10.0,
        max_speed: 90.0,
        avg_speed: 45.0,
        vehicle_count,
    }
}
