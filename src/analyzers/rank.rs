use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::analyzers::types::{CellAverage, RankedCell, SortOrder};

/// Vehicle count reported by a sensor that saw no real traffic. Cells
/// averaging at or below it are left out of the quietest-cells list.
pub const IDLE_SENSOR_COUNT: f64 = 1.0;

/// The first `n` cells sorted by vehicle count in `order`.
///
/// Equal counts are ordered by cell id ascending, whatever the direction.
pub fn top_n(
    averages: &BTreeMap<String, CellAverage>,
    n: usize,
    order: SortOrder,
) -> Vec<RankedCell> {
    ranked(averages.values(), n, order)
}

/// The `n` quietest cells, ignoring idle sensors (average count <= 1).
pub fn bottom_n_excluding_idle(
    averages: &BTreeMap<String, CellAverage>,
    n: usize,
) -> Vec<RankedCell> {
    ranked(
        averages
            .values()
            .filter(|a| a.vehicle_count > IDLE_SENSOR_COUNT),
        n,
        SortOrder::Ascending,
    )
}

fn ranked<'a>(
    cells: impl Iterator<Item = &'a CellAverage>,
    n: usize,
    order: SortOrder,
) -> Vec<RankedCell> {
    let mut rows: Vec<RankedCell> = cells
        .map(|a| RankedCell {
            cell_id: a.cell_id.clone(),
            vehicle_count: a.vehicle_count,
        })
        .collect();

    rows.sort_by(|a, b| {
        let by_count = match order {
            SortOrder::Ascending => a.vehicle_count.total_cmp(&b.vehicle_count),
            SortOrder::Descending => b.vehicle_count.total_cmp(&a.vehicle_count),
        };
        match by_count {
            Ordering::Equal => a.cell_id.cmp(&b.cell_id),
            other => other,
        }
    });
    rows.truncate(n);
    rows
}
