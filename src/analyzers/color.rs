use serde::Serialize;

use crate::error::InvalidVehicleCount;

/// Traffic density class of a cell, used to color map points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColorBucket {
    Low,
    Medium,
    High,
}

/// Lower bounds, checked top to bottom. `(threshold, inclusive, bucket)`.
///
/// | Vehicle count     | Bucket |
/// |-------------------|--------|
/// | > 100             | HIGH   |
/// | >= 50 and <= 100  | MEDIUM |
/// | < 50              | LOW    |
static THRESHOLDS: &[(f64, bool, ColorBucket)] = &[
    (100.0, false, ColorBucket::High),
    (50.0, true, ColorBucket::Medium),
];

impl ColorBucket {
    /// RGBA fill used for map points: red, yellow or green at 160 alpha.
    pub fn rgba(self) -> [u8; 4] {
        match self {
            ColorBucket::High => [255, 0, 0, 160],
            ColorBucket::Medium => [255, 255, 0, 160],
            ColorBucket::Low => [0, 255, 0, 160],
        }
    }
}

/// Classifies a (possibly averaged) vehicle count.
///
/// # Errors
///
/// Negative and NaN counts are rejected.
pub fn color_for(vehicle_count: f64) -> Result<ColorBucket, InvalidVehicleCount> {
    if vehicle_count.is_nan() || vehicle_count < 0.0 {
        return Err(InvalidVehicleCount(vehicle_count));
    }

    let bucket = THRESHOLDS
        .iter()
        .find(|(threshold, inclusive, _)| {
            if *inclusive {
                vehicle_count >= *threshold
            } else {
                vehicle_count > *threshold
            }
        })
        .map(|(_, _, bucket)| *bucket)
        .unwrap_or(ColorBucket::Low);

    Ok(bucket)
}
