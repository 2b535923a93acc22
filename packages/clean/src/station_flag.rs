//! Station flag parsing and inference.
//!
//! A missing flag is inferred from the station name: a named endpoint is a
//! station, an unnamed one is not. Flags that are already present are kept,
//! even when they disagree with the name.

use bikeshare_trip_models::RawValue;

use crate::draft::{Endpoint, FlaggedDraft, LocatedDraft, ResolvedDraft};
use crate::normalize::normalize_station_flag;

/// Resolves a possibly missing flag against the endpoint's station name.
#[must_use]
pub fn resolve_flag(flag: Option<bool>, station_name: &str) -> bool {
    flag.unwrap_or_else(|| !station_name.is_empty())
}

/// Whether a present flag disagrees with the station name.
#[must_use]
pub fn is_inconsistent(flag: Option<bool>, station_name: &str) -> bool {
    flag.is_some_and(|is_station| is_station == station_name.is_empty())
}

/// Parses the raw flag cells of every draft.
#[must_use]
pub fn normalize_flags(drafts: Vec<LocatedDraft>) -> Vec<FlaggedDraft> {
    drafts
        .into_iter()
        .map(|draft| draft.map_endpoints(parse_endpoint_flag))
        .collect()
}

fn parse_endpoint_flag(endpoint: Endpoint<Option<f64>, RawValue>) -> Endpoint<Option<f64>, Option<bool>> {
    Endpoint {
        lat: endpoint.lat,
        lon: endpoint.lon,
        is_station: normalize_station_flag(&endpoint.is_station),
        station_name: endpoint.station_name,
    }
}

/// Counts endpoints whose present flag disagrees with their station name.
#[must_use]
pub fn count_inconsistencies(drafts: &[FlaggedDraft]) -> usize {
    drafts
        .iter()
        .flat_map(|draft| [&draft.start, &draft.end])
        .filter(|endpoint| is_inconsistent(endpoint.is_station, &endpoint.station_name))
        .count()
}

/// Resolves every missing flag. Afterwards no flag is missing.
#[must_use]
pub fn resolve_flags(drafts: Vec<FlaggedDraft>) -> Vec<ResolvedDraft> {
    drafts
        .into_iter()
        .map(|draft| {
            draft.map_endpoints(|endpoint| Endpoint {
                is_station: resolve_flag(endpoint.is_station, &endpoint.station_name),
                lat: endpoint.lat,
                lon: endpoint.lon,
                station_name: endpoint.station_name,
            })
        })
        .collect()
}
