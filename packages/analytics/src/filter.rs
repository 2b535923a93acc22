//! Time-window filters.
//!
//! A trip belongs to a window when either its start or its end falls inside
//! it, so trips across midnight or a month boundary show up on both sides.

use bikeshare_analytics_models::{DayWindow, MAX_WINDOW_DAYS, MonthSelection};
use bikeshare_trip_models::TripRecord;
use chrono::{Datelike, NaiveDateTime};

use crate::AnalyticsError;

/// Trips that start or end in one of the selected years, and start or end in
/// one of the selected months.
///
/// Each trip appears at most once and the input order is kept.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptySelection`] if no year or no month is
/// selected.
pub fn filter_months(
    trips: &[TripRecord],
    selection: &MonthSelection,
) -> Result<Vec<TripRecord>, AnalyticsError> {
    if selection.years.is_empty() || selection.months.is_empty() {
        return Err(AnalyticsError::EmptySelection);
    }

    let in_years = |t: &NaiveDateTime| selection.years.contains(&t.year());
    let in_months = |t: &NaiveDateTime| selection.months.contains(&t.month());

    let selected: Vec<TripRecord> = trips
        .iter()
        .filter(|trip| in_years(&trip.start_time) || in_years(&trip.end_time))
        .filter(|trip| in_months(&trip.start_time) || in_months(&trip.end_time))
        .cloned()
        .collect();

    log::debug!(
        "Selected {} of {} trips for years {:?}, months {:?}",
        selected.len(),
        trips.len(),
        selection.years,
        selection.months
    );
    Ok(selected)
}

/// Checks that a window's last day is not before its first, that its time
/// of day does not end before it starts, and that it spans fewer than
/// [`MAX_WINDOW_DAYS`] days.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvertedDays`],
/// [`AnalyticsError::InvertedTimes`], or [`AnalyticsError::WindowTooLong`].
pub fn validate_window(window: &DayWindow) -> Result<(), AnalyticsError> {
    if window.last_day < window.first_day {
        return Err(AnalyticsError::InvertedDays {
            first_day: window.first_day,
            last_day: window.last_day,
        });
    }

    if window.to < window.from {
        return Err(AnalyticsError::InvertedTimes {
            from: window.from,
            to: window.to,
        });
    }

    let days = window.span_days();
    if days >= MAX_WINDOW_DAYS {
        return Err(AnalyticsError::WindowTooLong {
            days,
            max: MAX_WINDOW_DAYS,
        });
    }

    Ok(())
}

/// Trips that start or end on one of the window's days, and start or end
/// within its time of day.
///
/// # Errors
///
/// Returns an error if the window is invalid, see [`validate_window`].
pub fn filter_days(
    trips: &[TripRecord],
    window: &DayWindow,
) -> Result<Vec<TripRecord>, AnalyticsError> {
    validate_window(window)?;

    let on_days = |t: &NaiveDateTime| (window.first_day..=window.last_day).contains(&t.date());
    let at_time = |t: &NaiveDateTime| (window.from..=window.to).contains(&t.time());

    Ok(trips
        .iter()
        .filter(|trip| on_days(&trip.start_time) || on_days(&trip.end_time))
        .filter(|trip| at_time(&trip.start_time) || at_time(&trip.end_time))
        .cloned()
        .collect())
}
