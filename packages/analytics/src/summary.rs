//! Headline figures for a selection of trips.

use std::collections::BTreeMap;

use bikeshare_analytics_models::{CitySplit, TripSummary};
use bikeshare_trip_models::TripRecord;
use chrono::TimeDelta;

use crate::distance::median_distance_km;

/// Summarizes a set of trips.
///
/// Station rentals are split by where the rental happened, station returns by
/// where the return happened.
#[must_use]
pub fn summarize(trips: &[TripRecord]) -> TripSummary {
    let mut station_rentals = CitySplit::default();
    let mut station_returns = CitySplit::default();

    for trip in trips {
        if trip.rental_is_station {
            count(&mut station_rentals, trip.rental_is_city);
        }
        if trip.return_is_station {
            count(&mut station_returns, trip.return_is_city);
        }
    }

    TripSummary {
        trips: trips.len() as u64,
        median_duration: median_duration(trips),
        median_distance_km: median_distance_km(trips),
        popular_start_district: most_common(trips.iter().map(|t| t.start_district.as_deref())),
        popular_end_district: most_common(trips.iter().map(|t| t.end_district.as_deref())),
        station_rentals,
        station_returns,
    }
}

const fn count(split: &mut CitySplit, in_city: bool) {
    if in_city {
        split.inside += 1;
    } else {
        split.outside += 1;
    }
}

/// Median trip duration. For an even count this is the mean of the two
/// middle values.
#[must_use]
pub fn median_duration(trips: &[TripRecord]) -> Option<TimeDelta> {
    let mut durations: Vec<TimeDelta> = trips.iter().map(|t| t.duration).collect();
    durations.sort_unstable();

    let mid = durations.len() / 2;
    match durations.len() {
        0 => None,
        n if n % 2 == 1 => Some(durations[mid]),
        _ => Some((durations[mid - 1] + durations[mid]) / 2),
    }
}

/// Most frequent non-empty value. Ties go to the alphabetically first value.
fn most_common<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Option<String> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for value in values.flatten() {
        *counts.entry(value).or_default() += 1;
    }

    counts
        .into_iter()
        .max_by(|(a_name, a_count), (b_name, b_count)| {
            a_count.cmp(b_count).then_with(|| b_name.cmp(a_name))
        })
        .map(|(name, _)| name.to_owned())
}

/// Formats a duration in whole minutes, switching to hours and minutes above
/// one hour.
#[must_use]
pub fn describe_duration(duration: TimeDelta) -> String {
    let minutes = duration.num_minutes();
    if minutes > 60 {
        format!("{} hours, {} minutes", minutes / 60, minutes % 60)
    } else {
        format!("{minutes} minutes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::trip;

    fn in_district(mut t: TripRecord, start: Option<&str>, end: Option<&str>) -> TripRecord {
        t.start_district = start.map(str::to_owned);
        t.end_district = end.map(str::to_owned);
        t
    }

    #[test]
    fn median_of_odd_and_even_counts() {
        let odd = [
            trip("2023-05-01 08:00", 30),
            trip("2023-05-01 08:00", 10),
            trip("2023-05-01 08:00", 20),
        ];
        assert_eq!(median_duration(&odd), Some(TimeDelta::minutes(20)));

        let even = [
            trip("2023-05-01 08:00", 10),
            trip("2023-05-01 08:00", 40),
            trip("2023-05-01 08:00", 20),
            trip("2023-05-01 08:00", 30),
        ];
        assert_eq!(median_duration(&even), Some(TimeDelta::minutes(25)));
        assert_eq!(median_duration(&[]), None);
    }

    #[test]
    fn popular_district_ignores_missing_and_breaks_ties_alphabetically() {
        let trips = [
            in_district(trip("2023-05-01 08:00", 10), Some("Schwabing"), None),
            in_district(trip("2023-05-01 08:00", 10), Some("Au"), None),
            in_district(trip("2023-05-01 08:00", 10), None, None),
            in_district(trip("2023-05-01 08:00", 10), None, None),
            in_district(trip("2023-05-01 08:00", 10), None, Some("Laim")),
        ];
        let summary = summarize(&trips);
        assert_eq!(summary.popular_start_district.as_deref(), Some("Au"));
        assert_eq!(summary.popular_end_district.as_deref(), Some("Laim"));
    }

    #[test]
    fn splits_station_rentals_and_returns_by_their_own_flags() {
        let mut a = trip("2023-05-01 08:00", 10);
        a.rental_is_station = true;
        a.rental_is_city = true;
        a.return_is_station = false;

        let mut b = trip("2023-05-01 09:00", 10);
        b.rental_is_station = false;
        b.return_is_station = true;
        b.return_is_city = false;

        let mut c = trip("2023-05-01 10:00", 10);
        c.rental_is_station = true;
        c.rental_is_city = false;
        c.return_is_station = true;
        c.return_is_city = true;

        let summary = summarize(&[a, b, c]);
        assert_eq!(summary.trips, 3);
        assert_eq!(
            summary.station_rentals,
            CitySplit {
                inside: 1,
                outside: 1
            }
        );
        assert_eq!(
            summary.station_returns,
            CitySplit {
                inside: 1,
                outside: 1
            }
        );
    }

    #[test]
    fn empty_selection_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary, TripSummary::default());
    }

    #[test]
    fn describes_durations() {
        assert_eq!(describe_duration(TimeDelta::seconds(59)), "0 minutes");
        assert_eq!(describe_duration(TimeDelta::minutes(17)), "17 minutes");
        assert_eq!(describe_duration(TimeDelta::minutes(60)), "60 minutes");
        assert_eq!(describe_duration(TimeDelta::minutes(61)), "1 hours, 1 minutes");
        assert_eq!(describe_duration(TimeDelta::minutes(135)), "2 hours, 15 minutes");
    }
}
