//! Per-station usage and locations.
//!
//! Only named stations are counted. Free-floating endpoints have an empty
//! station name and are skipped.

use std::collections::BTreeMap;

use bikeshare_analytics_models::{StationLocation, StationUsage};
use bikeshare_trip_models::TripRecord;

/// Rentals and returns per station, busiest first.
///
/// A station seen only on one side gets zero for the other. Stations with
/// the same total are ordered by name.
#[must_use]
pub fn station_usage(trips: &[TripRecord]) -> Vec<StationUsage> {
    let mut counts: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for trip in trips {
        if !trip.rental_station_name.is_empty() {
            counts.entry(&trip.rental_station_name).or_default().0 += 1;
        }
        if !trip.return_station_name.is_empty() {
            counts.entry(&trip.return_station_name).or_default().1 += 1;
        }
    }

    let mut usage: Vec<StationUsage> = counts
        .into_iter()
        .map(|(name, (rentals, returns))| StationUsage {
            name: name.to_owned(),
            rentals,
            returns,
        })
        .collect();
    // `counts` is name-ordered and the sort is stable.
    usage.sort_by_key(|station| std::cmp::Reverse(station.total()));
    usage
}

/// Mean position of each station over all its rental and return endpoints,
/// ordered by name.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn station_locations(trips: &[TripRecord]) -> Vec<StationLocation> {
    let mut sums: BTreeMap<&str, (f64, f64, u64)> = BTreeMap::new();
    let endpoints = trips.iter().flat_map(|trip| {
        [
            (trip.rental_station_name.as_str(), trip.start_lat, trip.start_lon),
            (trip.return_station_name.as_str(), trip.end_lat, trip.end_lon),
        ]
    });

    for (name, lat, lon) in endpoints.filter(|(name, ..)| !name.is_empty()) {
        let entry = sums.entry(name).or_default();
        entry.0 += lat;
        entry.1 += lon;
        entry.2 += 1;
    }

    sums.into_iter()
        .map(|(name, (lat, lon, n))| StationLocation {
            name: name.to_owned(),
            lat: lat / n as f64,
            lon: lon / n as f64,
        })
        .collect()
}
