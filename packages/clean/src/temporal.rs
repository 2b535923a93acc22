//! Timestamp parsing, trip durations, and interval validation.

use bikeshare_trip_models::RawValue;
use chrono::{NaiveDateTime, TimeDelta};

use crate::draft::TripDraft;

/// Accepted timestamp layouts, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses a timestamp cell.
///
/// Text is trimmed and matched against ISO-like layouts with either a space
/// or a `T` separator. Anything else, including empty and numeric cells, is
/// not a time and yields `None`.
#[must_use]
pub fn parse_timestamp(value: &RawValue) -> Option<NaiveDateTime> {
    let text = value.as_text()?.trim();
    if text.is_empty() {
        return None;
    }

    let parsed = TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok());

    if parsed.is_none() {
        log::warn!("Cannot parse timestamp {text:?}, treating as missing");
    }
    parsed
}

/// Duration between two timestamps, present only when both are.
///
/// The result is negative for reversed intervals. Those rows are removed by
/// [`retain_valid_intervals`].
#[must_use]
pub fn trip_duration(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Option<TimeDelta> {
    Some(end? - start?)
}

/// Fills in the duration of every draft.
#[must_use]
pub fn compute_durations<C, F>(drafts: Vec<TripDraft<C, F>>) -> Vec<TripDraft<C, F>> {
    drafts
        .into_iter()
        .map(|mut draft| {
            draft.duration = trip_duration(draft.start_time, draft.end_time);
            draft
        })
        .collect()
}

/// Whether a draft has both timestamps and does not end before it starts.
#[must_use]
pub fn has_valid_interval<C, F>(draft: &TripDraft<C, F>) -> bool {
    matches!((draft.start_time, draft.end_time), (Some(start), Some(end)) if end >= start)
}

/// Removes drafts with a missing timestamp or an end before the start.
///
/// Trips that end at the exact moment they start are kept.
#[must_use]
pub fn retain_valid_intervals<C, F>(mut drafts: Vec<TripDraft<C, F>>) -> Vec<TripDraft<C, F>> {
    let before = drafts.len();
    drafts.retain(has_valid_interval);
    let dropped = before - drafts.len();
    if dropped > 0 {
        log::debug!("Dropped {dropped} trips with a missing or reversed time interval");
    }
    drafts
}
