use std::collections::BTreeMap;

use crate::analyzers::types::{CellAverage, TrafficRecord};

/// Running sums for one cell.
#[derive(Default)]
struct CellSums {
    count: usize,
    latitude: f64,
    longitude: f64,
    min_speed: f64,
    max_speed: f64,
    avg_speed: f64,
    vehicle_count: f64,
}

/// Groups records by cell and averages every numeric field.
///
/// Only cells that occur in `records` get an entry. Keys iterate in
/// ascending cell id order.
pub fn compute_cell_averages(records: &[TrafficRecord]) -> BTreeMap<String, CellAverage> {
    let mut sums: BTreeMap<&str, CellSums> = BTreeMap::new();

    for record in records {
        let s = sums.entry(record.cell_id.as_str()).or_default();
        s.count += 1;
        s.latitude += record.latitude;
        s.longitude += record.longitude;
        s.min_speed += record.min_speed;
        s.max_speed += record.max_speed;
        s.avg_speed += record.avg_speed;
        s.vehicle_count += f64::from(record.vehicle_count);
    }

    sums.into_iter()
        .map(|(cell_id, s)| {
            let n = s.count as f64;
            (
                cell_id.to_string(),
                CellAverage {
                    cell_id: cell_id.to_string(),
                    latitude: s.latitude / n,
                    longitude: s.longitude / n,
                    min_speed: s.min_speed / n,
                    max_speed: s.max_speed / n,
                    avg_speed: s.avg_speed / n,
                    vehicle_count: s.vehicle_count / n,
                },
            )
        })
        .collect()
}
