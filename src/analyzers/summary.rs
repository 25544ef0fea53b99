use crate::analyzers::types::{SummaryStatistics, TrafficRecord};
use crate::analyzers::utility::{max_of, mean, min_of};

/// Headline statistics over `records`, or `None` when there is nothing to
/// summarize.
pub fn summary_statistics(records: &[TrafficRecord]) -> Option<SummaryStatistics> {
    if records.is_empty() {
        return None;
    }

    let vehicles: Vec<f64> = records.iter().map(|r| f64::from(r.vehicle_count)).collect();
    let speeds: Vec<f64> = records.iter().map(|r| r.avg_speed).collect();

    Some(SummaryStatistics {
        avg_vehicles: mean(&vehicles),
        avg_speed: mean(&speeds),
        min_speed: min_of(records.iter().map(|r| r.min_speed))?,
        max_speed: max_of(records.iter().map(|r| r.max_speed))?,
    })
}
