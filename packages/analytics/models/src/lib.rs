#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parameter and result types for trip analytics queries.
//!
//! Everything here is plain data with `serde` support so results can be
//! printed as JSON or handed to a presentation layer unchanged.

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Longest span, in days, that a [`DayWindow`] may cover (exclusive).
pub const MAX_WINDOW_DAYS: i64 = 7;

/// Last selectable time of day.
pub const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 59) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// Number of trips that started on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    /// Calendar date of the trip start.
    pub date: NaiveDate,
    /// Trips started on that date.
    pub trips: u64,
}

/// Years and months to select trips by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSelection {
    /// Calendar years, e.g. `2023`.
    pub years: Vec<i32>,
    /// Months, `1..=12`.
    pub months: Vec<u32>,
}

/// A short range of days plus a time-of-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayWindow {
    /// First day, inclusive.
    pub first_day: NaiveDate,
    /// Last day, inclusive.
    pub last_day: NaiveDate,
    /// Earliest time of day, inclusive.
    pub from: NaiveTime,
    /// Latest time of day, inclusive.
    pub to: NaiveTime,
}

impl DayWindow {
    /// A window covering the whole of each day from `first_day` to
    /// `last_day`.
    #[must_use]
    pub const fn whole_days(first_day: NaiveDate, last_day: NaiveDate) -> Self {
        Self {
            first_day,
            last_day,
            from: NaiveTime::MIN,
            to: END_OF_DAY,
        }
    }

    /// Number of days between the first and last day.
    #[must_use]
    pub fn span_days(&self) -> i64 {
        (self.last_day - self.first_day).num_days()
    }
}

/// Station rentals or returns split by core service area membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySplit {
    /// Inside the core service area.
    pub inside: u64,
    /// Outside the core service area.
    pub outside: u64,
}

/// Headline figures for a set of trips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    /// Number of trips.
    pub trips: u64,
    /// Median trip duration, `None` for no trips.
    #[serde(with = "option_duration_secs")]
    pub median_duration: Option<TimeDelta>,
    /// Median great-circle distance between start and end, in kilometres.
    pub median_distance_km: Option<f64>,
    /// District where most trips started.
    pub popular_start_district: Option<String>,
    /// District where most trips ended.
    pub popular_end_district: Option<String>,
    /// Rentals at a station.
    pub station_rentals: CitySplit,
    /// Returns at a station.
    pub station_returns: CitySplit,
}

/// Rental and return counts of one named station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationUsage {
    /// Station name.
    pub name: String,
    /// Trips rented here.
    pub rentals: u64,
    /// Trips returned here.
    pub returns: u64,
}

impl StationUsage {
    /// Rentals plus returns.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.rentals + self.returns
    }
}

/// Mean observed position of a named station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationLocation {
    /// Station name.
    pub name: String,
    /// Mean latitude of its rental and return endpoints.
    pub lat: f64,
    /// Mean longitude of its rental and return endpoints.
    pub lon: f64,
}

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Serializes an optional [`TimeDelta`] as whole seconds.
mod option_duration_secs {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<TimeDelta>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.num_seconds()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<TimeDelta>, D::Error> {
        Option::<i64>::deserialize(deserializer)?
            .map(|secs| {
                TimeDelta::try_seconds(secs).ok_or_else(|| {
                    serde::de::Error::custom(format!("duration out of range: {secs}"))
                })
            })
            .transpose()
    }
}
