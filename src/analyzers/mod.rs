//! Traffic aggregation engine.
//!
//! Stateless transformations over loaded [`types::TrafficRecord`]s: per-cell
//! averaging, date and cell filters, density color buckets, summary
//! statistics and ranked cell lists.

pub mod aggregate;
pub mod color;
pub mod filter;
pub mod rank;
pub mod summary;
pub mod types;
pub mod utility;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregate::compute_cell_averages;
pub use color::{ColorBucket, color_for};
pub use filter::{filter_by_cell, filter_by_date_range};
pub use rank::{bottom_n_excluding_idle, top_n};
pub use summary::summary_statistics;
