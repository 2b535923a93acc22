#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read-only queries over cleaned trips.
//!
//! Every function takes a slice of [`TripRecord`]s and never re-runs any
//! cleaning logic. Filters return owned copies so their results can be fed
//! into the aggregate queries.

pub mod distance;
pub mod filter;
pub mod stations;
pub mod summary;

use std::collections::BTreeMap;

use bikeshare_analytics_models::DailyCount;
use bikeshare_trip_models::TripRecord;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

pub use distance::{heat_points, median_distance_km, trip_distance_km};
pub use filter::{filter_days, filter_months};
pub use stations::{station_locations, station_usage};
pub use summary::{describe_duration, summarize};

/// Errors for invalid query parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    /// A month selection has no years or no months.
    #[error("Select at least one year and one month")]
    EmptySelection,

    /// The last day of a window is before the first.
    #[error("Last day {last_day} is before first day {first_day}")]
    InvertedDays {
        first_day: NaiveDate,
        last_day: NaiveDate,
    },

    /// The window's time of day ends before it starts.
    #[error("Latest time {to} is before earliest time {from}")]
    InvertedTimes { from: NaiveTime, to: NaiveTime },

    /// The window covers too many days.
    #[error("Day window spans {days} days, it must be less than {max}")]
    WindowTooLong {
        /// Days between first and last day.
        days: i64,
        /// Exclusive maximum.
        max: i64,
    },
}

/// Number of trips per start date, in ascending date order.
#[must_use]
pub fn daily_counts(trips: &[TripRecord]) -> Vec<DailyCount> {
    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for trip in trips {
        *counts.entry(trip.start_time.date()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(date, trips)| DailyCount { date, trips })
        .collect()
}
