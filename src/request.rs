//! Filter selection passed into every dashboard computation.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analyzers::types::TrafficRecord;

/// Length of the top and bottom traffic lists unless configured otherwise.
pub const DEFAULT_LIST_LEN: usize = 10;

/// An immutable snapshot of the user's selections. Changing a filter means
/// building a new request, never mutating one that is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cell_id: Option<String>,
    pub list_len: usize,
}

impl DashboardRequest {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            cell_id: None,
            list_len: DEFAULT_LIST_LEN,
        }
    }

    /// Defaults derived from the data: the full date span of `records` and
    /// the lowest cell id. With no records the range is unbounded and no
    /// cell is selected.
    pub fn for_records(records: &[TrafficRecord]) -> Self {
        let start = records.iter().map(TrafficRecord::date).min();
        let end = records.iter().map(TrafficRecord::date).max();
        let first_cell = records.iter().map(|r| r.cell_id.as_str()).min();

        Self {
            start_date: start.unwrap_or(NaiveDate::MIN),
            end_date: end.unwrap_or(NaiveDate::MAX),
            cell_id: first_cell.map(str::to_string),
            list_len: DEFAULT_LIST_LEN,
        }
    }

    pub fn with_dates(mut self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    /// Replaces only the bounds that are given.
    pub fn with_optional_dates(self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let start_date = start.unwrap_or(self.start_date);
        let end_date = end.unwrap_or(self.end_date);
        self.with_dates(start_date, end_date)
    }

    pub fn with_cell(mut self, cell_id: impl Into<String>) -> Self {
        self.cell_id = Some(cell_id.into());
        self
    }

    pub fn with_list_len(mut self, list_len: usize) -> Self {
        self.list_len = list_len;
        self
    }
}
