//! Intermediate trip rows between pipeline stages.
//!
//! [`TripDraft`] is generic over the representation of its coordinates (`C`)
//! and station flags (`F`). Each stage changes one of them, so the type of a
//! draft records which stages it has been through:
//!
//! | alias            | coordinates   | flags          |
//! |------------------|---------------|----------------|
//! | [`RawDraft`]     | `RawValue`    | `RawValue`     |
//! | [`LocatedDraft`] | `Option<f64>` | `RawValue`     |
//! | [`FlaggedDraft`] | `Option<f64>` | `Option<bool>` |
//! | [`ResolvedDraft`]| `Option<f64>` | `bool`         |

use bikeshare_trip_models::{Column, RawTable, RawValue};
use chrono::{NaiveDateTime, TimeDelta};

use crate::PipelineError;
use crate::temporal::parse_timestamp;

/// One end of a trip: where it was rented or returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint<C, F> {
    /// Latitude.
    pub lat: C,
    /// Longitude.
    pub lon: C,
    /// Trimmed station name, empty when not at a station.
    pub station_name: String,
    /// Whether the endpoint is a station.
    pub is_station: F,
}

/// A trip row in the middle of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TripDraft<C, F> {
    /// Parsed rental time, `None` if not a time.
    pub start_time: Option<NaiveDateTime>,
    /// Parsed return time, `None` if not a time.
    pub end_time: Option<NaiveDateTime>,
    /// Derived trip duration.
    pub duration: Option<TimeDelta>,
    /// Rental endpoint.
    pub start: Endpoint<C, F>,
    /// Return endpoint.
    pub end: Endpoint<C, F>,
}

/// Draft straight from the raw table.
pub type RawDraft = TripDraft<RawValue, RawValue>;
/// Draft with validated coordinates.
pub type LocatedDraft = TripDraft<Option<f64>, RawValue>;
/// Draft with parsed station flags.
pub type FlaggedDraft = TripDraft<Option<f64>, Option<bool>>;
/// Draft with every station flag resolved.
pub type ResolvedDraft = TripDraft<Option<f64>, bool>;

impl<C, F> TripDraft<C, F> {
    /// Applies `f` to both endpoints, keeping the time fields.
    pub fn map_endpoints<C2, F2>(
        self,
        mut f: impl FnMut(Endpoint<C, F>) -> Endpoint<C2, F2>,
    ) -> TripDraft<C2, F2> {
        TripDraft {
            start_time: self.start_time,
            end_time: self.end_time,
            duration: self.duration,
            start: f(self.start),
            end: f(self.end),
        }
    }
}

/// A draft with every required field present. Output of the null sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteTrip {
    /// Rental time.
    pub start_time: NaiveDateTime,
    /// Return time.
    pub end_time: NaiveDateTime,
    /// `end_time - start_time`.
    pub duration: TimeDelta,
    /// Rental endpoint.
    pub start: Endpoint<f64, bool>,
    /// Return endpoint.
    pub end: Endpoint<f64, bool>,
}

impl ResolvedDraft {
    /// Returns the complete trip, or `None` if any required field is missing.
    #[must_use]
    pub fn into_complete(self) -> Option<CompleteTrip> {
        Some(CompleteTrip {
            start_time: self.start_time?,
            end_time: self.end_time?,
            duration: self.duration?,
            start: complete_endpoint(self.start)?,
            end: complete_endpoint(self.end)?,
        })
    }
}

fn complete_endpoint(endpoint: Endpoint<Option<f64>, bool>) -> Option<Endpoint<f64, bool>> {
    Some(Endpoint {
        lat: endpoint.lat?,
        lon: endpoint.lon?,
        station_name: endpoint.station_name,
        is_station: endpoint.is_station,
    })
}

/// Checks that every required column is present.
///
/// # Errors
///
/// Returns [`PipelineError::MissingColumn`] for the first absent column.
pub fn check_required_columns(table: &RawTable) -> Result<(), PipelineError> {
    for column in Column::all() {
        if !table.has_column(column.as_ref()) {
            return Err(PipelineError::MissingColumn {
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Positions of the required columns within a raw row, indexed by the
/// [`Column`] discriminant.
struct ColumnIndices([usize; 10]);

impl ColumnIndices {
    fn resolve(table: &RawTable) -> Result<Self, PipelineError> {
        let mut indices = [0; 10];
        for (slot, column) in indices.iter_mut().zip(Column::all()) {
            *slot = table
                .column_index(column.as_ref())
                .ok_or_else(|| PipelineError::MissingColumn {
                    column: column.to_string(),
                })?;
        }
        Ok(Self(indices))
    }

    /// Moves the cell of `column` out of `row`.
    fn take(&self, row: &mut [RawValue], column: Column) -> RawValue {
        std::mem::take(&mut row[self.0[column as usize]])
    }
}

/// Types the rows of a raw table: timestamps are parsed, station names are
/// turned into text, and coordinates and flags are carried over untouched.
///
/// Columns other than the required ones are discarded here.
///
/// # Errors
///
/// Returns [`PipelineError::MissingColumn`] if a required column is absent.
pub fn drafts_from_table(table: RawTable) -> Result<Vec<RawDraft>, PipelineError> {
    let indices = ColumnIndices::resolve(&table)?;
    let (_, rows) = table.into_parts();

    Ok(rows
        .into_iter()
        .map(|mut row| {
            let row = row.as_mut_slice();
            TripDraft {
                start_time: parse_timestamp(&indices.take(row, Column::StartTime)),
                end_time: parse_timestamp(&indices.take(row, Column::EndTime)),
                duration: None,
                start: Endpoint {
                    lat: indices.take(row, Column::StartLat),
                    lon: indices.take(row, Column::StartLon),
                    station_name: indices.take(row, Column::RentalStationName).into_text(),
                    is_station: indices.take(row, Column::RentalIsStation),
                },
                end: Endpoint {
                    lat: indices.take(row, Column::EndLat),
                    lon: indices.take(row, Column::EndLon),
                    station_name: indices.take(row, Column::ReturnStationName).into_text(),
                    is_station: indices.take(row, Column::ReturnIsStation),
                },
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RawTable {
        let mut columns: Vec<&str> = Column::all().iter().map(AsRef::as_ref).collect();
        columns.push("EXTRA");
        let mut t = RawTable::new(columns);
        t.push_row(
            [
                "2023-01-01 08:00:00",
                "not a time",
                "48,1",
                "11,5",
                "48,2",
                "11,6",
                "Marienplatz",
                "",
                "1",
                "",
                "ignored",
            ]
            .into_iter()
            .map(RawValue::from)
            .collect(),
        );
        t
    }

    #[test]
    fn types_rows_by_column_name() {
        let drafts = drafts_from_table(table()).unwrap();
        assert_eq!(drafts.len(), 1);
        let d = &drafts[0];
        assert!(d.start_time.is_some());
        assert_eq!(d.end_time, None);
        assert_eq!(d.start.lat, RawValue::Text("48,1".into()));
        assert_eq!(d.end.lon, RawValue::Text("11,6".into()));
        assert_eq!(d.start.station_name, "Marienplatz");
        assert_eq!(d.end.station_name, "");
        assert_eq!(d.start.is_station, RawValue::Text("1".into()));
        assert_eq!(d.end.is_station, RawValue::Empty);
    }

    #[test]
    fn reports_missing_column() {
        let t = table().drop_columns(&["ENDLAT"]);
        let err = drafts_from_table(t).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { column } if column == "ENDLAT"));
    }

    #[test]
    fn complete_requires_every_field() {
        let endpoint = |lat| Endpoint {
            lat,
            lon: Some(11.5),
            station_name: String::new(),
            is_station: false,
        };
        let t = NaiveDateTime::parse_from_str("2023-01-01 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let draft: ResolvedDraft = TripDraft {
            start_time: Some(t),
            end_time: Some(t),
            duration: Some(TimeDelta::zero()),
            start: endpoint(Some(48.1)),
            end: endpoint(Some(48.1)),
        };
        assert!(draft.clone().into_complete().is_some());

        let missing = TripDraft {
            end: endpoint(None),
            ..draft
        };
        assert!(missing.into_complete().is_none());
    }
}
