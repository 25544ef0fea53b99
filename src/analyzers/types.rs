//! Data types used by the aggregation engine.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single sensor reading for one geohash cell at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficRecord {
    pub cell_id: String,
    pub timestamp: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    pub avg_speed: f64,
    pub vehicle_count: u32,
}

impl TrafficRecord {
    /// Calendar date of the reading, the granularity date filters work on.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Per-cell mean of every numeric field. Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellAverage {
    pub cell_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    pub avg_speed: f64,
    pub vehicle_count: f64,
}

/// One row of a top/bottom traffic list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCell {
    pub cell_id: String,
    pub vehicle_count: f64,
}

/// Sort direction for ranked lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Headline numbers for a set of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub avg_vehicles: f64,
    pub avg_speed: f64,
    pub min_speed: f64,
    pub max_speed: f64,
}

/// One point of the vehicle-count time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub vehicle_count: u32,
}
