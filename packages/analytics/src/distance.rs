//! Point and distance queries.

use bikeshare_analytics_models::GeoPoint;
use bikeshare_trip_models::TripRecord;
use geo::{Distance, Haversine, Point};

/// Great-circle distance between a trip's start and end, in kilometres.
#[must_use]
pub fn trip_distance_km(trip: &TripRecord) -> f64 {
    let start = Point::new(trip.start_lon, trip.start_lat);
    let end = Point::new(trip.end_lon, trip.end_lat);
    Haversine.distance(start, end) / 1000.0
}

/// Median of [`trip_distance_km`] over all trips, `None` for no trips.
#[must_use]
pub fn median_distance_km(trips: &[TripRecord]) -> Option<f64> {
    let mut distances: Vec<f64> = trips.iter().map(trip_distance_km).collect();
    distances.sort_unstable_by(f64::total_cmp);

    let mid = distances.len() / 2;
    match distances.len() {
        0 => None,
        n if n % 2 == 1 => Some(distances[mid]),
        _ => Some(f64::midpoint(distances[mid - 1], distances[mid])),
    }
}

/// Every start point followed by every end point, for density maps.
#[must_use]
pub fn heat_points(trips: &[TripRecord]) -> Vec<GeoPoint> {
    let starts = trips.iter().map(|t| GeoPoint {
        lat: t.start_lat,
        lon: t.start_lon,
    });
    let ends = trips.iter().map(|t| GeoPoint {
        lat: t.end_lat,
        lon: t.end_lon,
    });
    starts.chain(ends).collect()
}
