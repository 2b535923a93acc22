//! Coordinate parsing and bounds checking.

use bikeshare_trip_models::RawValue;
use serde::{Deserialize, Serialize};

use crate::draft::{Endpoint, TripDraft};
use crate::normalize::normalize_coordinate;

/// Inclusive `[min, max]` range of accepted values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
}

impl ValidRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the range, bounds included.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Latitude range of the Munich region.
pub const MUNICH_LATITUDE: ValidRange = ValidRange::new(47.8, 48.5);

/// Longitude range of the Munich region.
pub const MUNICH_LONGITUDE: ValidRange = ValidRange::new(11.1, 12.0);

/// Accepted latitude and longitude ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateBounds {
    pub latitude: ValidRange,
    pub longitude: ValidRange,
}

impl Default for CoordinateBounds {
    fn default() -> Self {
        Self {
            latitude: MUNICH_LATITUDE,
            longitude: MUNICH_LONGITUDE,
        }
    }
}

impl CoordinateBounds {
    /// Parses a latitude cell. Values outside the latitude range are missing.
    #[must_use]
    pub fn latitude(&self, value: &RawValue) -> Option<f64> {
        within(normalize_coordinate(value)?, self.latitude, "latitude")
    }

    /// Parses a longitude cell. Values outside the longitude range are missing.
    #[must_use]
    pub fn longitude(&self, value: &RawValue) -> Option<f64> {
        within(normalize_coordinate(value)?, self.longitude, "longitude")
    }
}

fn within(value: f64, range: ValidRange, axis: &str) -> Option<f64> {
    if range.contains(value) {
        Some(value)
    } else {
        log::debug!(
            "Invalid {axis} {value} outside [{}, {}], treating as missing",
            range.min,
            range.max
        );
        None
    }
}

/// Parses and bounds-checks all four coordinates of every draft.
///
/// No row is removed here. Rows with a missing coordinate are dropped by the
/// null sweep.
#[must_use]
pub fn validate_coordinates<F>(
    drafts: Vec<TripDraft<RawValue, F>>,
    bounds: &CoordinateBounds,
) -> Vec<TripDraft<Option<f64>, F>> {
    drafts
        .into_iter()
        .map(|draft| {
            draft.map_endpoints(|endpoint| Endpoint {
                lat: bounds.latitude(&endpoint.lat),
                lon: bounds.longitude(&endpoint.lon),
                station_name: endpoint.station_name,
                is_station: endpoint.is_station,
            })
        })
        .collect()
}
