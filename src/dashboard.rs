//! Everything a dashboard front end needs from one pass over the records.
//!
//! [`build_view`] runs the engine for a [`DashboardRequest`] and returns
//! plain, serializable rows. Panels with nothing to show are `None`, which
//! the renderer turns into a "no data" notice.

use serde::Serialize;
use tracing::debug;

use crate::analyzers::color::{ColorBucket, color_for};
use crate::analyzers::types::{
    CellAverage, RankedCell, SeriesPoint, SortOrder, SummaryStatistics, TrafficRecord,
};
use crate::analyzers::utility::mean;
use crate::analyzers::{
    bottom_n_excluding_idle, compute_cell_averages, filter_by_cell, filter_by_date_range,
    summary_statistics, top_n,
};
use crate::error::InvalidVehicleCount;
use crate::request::DashboardRequest;

pub const MAP_ZOOM: f64 = 10.0;
pub const MAP_PITCH: f64 = 50.0;
/// Scatter point radius in meters.
pub const MAP_POINT_RADIUS: f64 = 200.0;

/// A cell plotted on the density map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub cell_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub vehicle_count: f64,
    pub bucket: ColorBucket,
    pub color: [u8; 4],
}

/// Initial camera plus the points to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub point_radius: f64,
    pub points: Vec<MapPoint>,
}

/// Dashboard sections that can independently run out of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Details,
    Map,
    Chart,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub request: DashboardRequest,
    /// Averages over every loaded record.
    pub cells: Vec<CellAverage>,
    /// The selected cell's row of `cells`.
    pub selected: Option<CellAverage>,
    /// Averages over the records inside the date range. This is the export table.
    pub filtered_cells: Vec<CellAverage>,
    pub map: Option<MapView>,
    pub series: Option<Vec<SeriesPoint>>,
    pub summary: Option<SummaryStatistics>,
    pub top: Vec<RankedCell>,
    pub bottom: Vec<RankedCell>,
}

impl DashboardView {
    /// Panels that should show a "no data" notice instead of content.
    pub fn no_data_panels(&self) -> Vec<Panel> {
        let mut panels = Vec::new();
        if self.selected.is_none() {
            panels.push(Panel::Details);
        }
        if self.map.is_none() {
            panels.push(Panel::Map);
        }
        if self.series.is_none() {
            panels.push(Panel::Chart);
        }
        if self.summary.is_none() {
            panels.push(Panel::Summary);
        }
        panels
    }
}

/// Color-annotated map over `cells`, centered on their mean position.
/// `None` when there are no cells to plot.
pub fn map_view<'a>(
    cells: impl IntoIterator<Item = &'a CellAverage>,
) -> Result<Option<MapView>, InvalidVehicleCount> {
    let points = cells
        .into_iter()
        .map(|cell| -> Result<MapPoint, InvalidVehicleCount> {
            let bucket = color_for(cell.vehicle_count)?;
            Ok(MapPoint {
                cell_id: cell.cell_id.clone(),
                latitude: cell.latitude,
                longitude: cell.longitude,
                vehicle_count: cell.vehicle_count,
                bucket,
                color: bucket.rgba(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if points.is_empty() {
        return Ok(None);
    }

    let latitudes: Vec<f64> = points.iter().map(|p| p.latitude).collect();
    let longitudes: Vec<f64> = points.iter().map(|p| p.longitude).collect();

    Ok(Some(MapView {
        center_latitude: mean(&latitudes),
        center_longitude: mean(&longitudes),
        zoom: MAP_ZOOM,
        pitch: MAP_PITCH,
        point_radius: MAP_POINT_RADIUS,
        points,
    }))
}

/// Vehicle counts over time, in timestamp order.
pub fn time_series(records: &[TrafficRecord]) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = records
        .iter()
        .map(|r| SeriesPoint {
            timestamp: r.timestamp,
            vehicle_count: r.vehicle_count,
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);
    points
}

/// Runs every dashboard computation for `request`.
///
/// The date range narrows the map, the ranked lists and the export table.
/// The selected cell's details, chart and summary cover all of its records.
#[tracing::instrument(skip_all, fields(record_count = records.len(), cell = ?request.cell_id))]
pub fn build_view(
    records: &[TrafficRecord],
    request: &DashboardRequest,
) -> Result<DashboardView, InvalidVehicleCount> {
    let all_cells = compute_cell_averages(records);
    let selected = request
        .cell_id
        .as_deref()
        .and_then(|id| all_cells.get(id).cloned());

    let in_range = filter_by_date_range(records, request.start_date, request.end_date);
    let filtered = compute_cell_averages(&in_range);

    let cell_records = request
        .cell_id
        .as_deref()
        .map(|id| filter_by_cell(records, id))
        .unwrap_or_default();

    let map = map_view(filtered.values())?;
    let series = (!cell_records.is_empty()).then(|| time_series(&cell_records));
    let summary = summary_statistics(&cell_records);
    let top = top_n(&filtered, request.list_len, SortOrder::Descending);
    let bottom = bottom_n_excluding_idle(&filtered, request.list_len);

    debug!(
        cells = all_cells.len(),
        in_range = in_range.len(),
        filtered_cells = filtered.len(),
        cell_records = cell_records.len(),
        "Dashboard view built"
    );

    Ok(DashboardView {
        request: request.clone(),
        cells: all_cells.into_values().collect(),
        selected,
        filtered_cells: filtered.into_values().collect(),
        map,
        series,
        summary,
        top,
        bottom,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::record;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> Vec<TrafficRecord> {
        let mut far = record("sxk2", "2024-12-01 08:00:00", 150);
        far.latitude = 43.0;
        far.longitude = 31.0;
        vec![
            record("sxk1", "2024-12-01 00:00:00", 60),
            record("sxk1", "2024-12-03 00:00:00", 20),
            far,
            record("sxk3", "2024-12-02 00:00:00", 1),
        ]
    }

    #[test]
    fn test_build_view_defaults() {
        let records = sample();
        let request = DashboardRequest::for_records(&records);

        let view = build_view(&records, &request).unwrap();

        assert_eq!(view.cells.len(), 3);
        assert_eq!(view.filtered_cells.len(), 3);
        assert_eq!(view.selected.as_ref().unwrap().cell_id, "sxk1");
        assert_eq!(view.selected.as_ref().unwrap().vehicle_count, 40.0);
        assert_eq!(view.summary.as_ref().unwrap().avg_vehicles, 40.0);
        assert_eq!(view.series.as_ref().unwrap().len(), 2);
        assert_eq!(view.top[0].cell_id, "sxk2");
        assert!(view.bottom.iter().all(|r| r.cell_id != "sxk3"));
        assert!(view.no_data_panels().is_empty());
    }

    #[test]
    fn test_date_range_narrows_map_not_summary() {
        let records = sample();
        let request = DashboardRequest::for_records(&records)
            .with_dates(date("2024-12-01"), date("2024-12-01"));

        let view = build_view(&records, &request).unwrap();

        let map = view.map.unwrap();
        assert_eq!(map.points.len(), 2);
        let sxk1 = map.points.iter().find(|p| p.cell_id == "sxk1").unwrap();
        assert_eq!(sxk1.vehicle_count, 60.0);
        assert_eq!(sxk1.bucket, ColorBucket::Medium);
        assert_eq!(sxk1.color, [255, 255, 0, 160]);
        assert_eq!(map.center_latitude, 42.0);
        assert_eq!(map.center_longitude, 30.0);

        assert_eq!(view.summary.unwrap().avg_vehicles, 40.0);
    }

    #[test]
    fn test_empty_range_reports_no_data() {
        let records = sample();
        let request = DashboardRequest::for_records(&records)
            .with_dates(date("2025-01-01"), date("2025-01-02"))
            .with_cell("nope");

        let view = build_view(&records, &request).unwrap();

        assert!(view.filtered_cells.is_empty());
        assert!(view.top.is_empty());
        assert!(view.bottom.is_empty());
        assert_eq!(
            view.no_data_panels(),
            vec![Panel::Details, Panel::Map, Panel::Chart, Panel::Summary]
        );
    }

    #[test]
    fn test_build_view_on_no_records() {
        let view = build_view(&[], &DashboardRequest::for_records(&[])).unwrap();

        assert!(view.cells.is_empty());
        assert_eq!(view.summary, None);
    }

    #[test]
    fn test_time_series_sorted() {
        let records = vec![
            record("sxk1", "2024-12-02 00:00:00", 2),
            record("sxk1", "2024-12-01 00:00:00", 1),
        ];

        let series = time_series(&records);

        assert_eq!(series[0].vehicle_count, 1);
        assert_eq!(series[1].vehicle_count, 2);
    }

    #[test]
    fn test_map_view_rejects_negative_average() {
        let cell = CellAverage {
            cell_id: "bad".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            min_speed: 0.0,
            max_speed: 0.0,
            avg_speed: 0.0,
            vehicle_count: -3.0,
        };

        assert_eq!(map_view([&cell]), Err(InvalidVehicleCount(-3.0)));
    }
}
