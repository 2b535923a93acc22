#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw and canonical bike-share trip record types.
//!
//! Source files are read into a loosely typed [`RawTable`] where every cell
//! is a [`RawValue`]. The cleaning pipeline turns that table into
//! [`TripRecord`]s, the canonical analysis-ready form consumed by every
//! downstream query.

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Format used when writing timestamps back out as text.
///
/// `%.f` only emits a fractional part when one is present, so whole-second
/// timestamps stay in the plain `YYYY-MM-DD HH:MM:SS` form.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Administrative row-index column present in the source extracts.
pub const INDEX_COLUMN: &str = "Row";

/// Columns the cleaning pipeline requires in its raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr)]
pub enum Column {
    /// Rental timestamp
    #[strum(serialize = "STARTTIME")]
    StartTime,
    /// Return timestamp
    #[strum(serialize = "ENDTIME")]
    EndTime,
    /// Rental latitude
    #[strum(serialize = "STARTLAT")]
    StartLat,
    /// Rental longitude
    #[strum(serialize = "STARTLON")]
    StartLon,
    /// Return latitude
    #[strum(serialize = "ENDLAT")]
    EndLat,
    /// Return longitude
    #[strum(serialize = "ENDLON")]
    EndLon,
    /// Name of the rental station, empty for free-floating rentals
    #[strum(serialize = "RENTAL_STATION_NAME")]
    RentalStationName,
    /// Name of the return station, empty for free-floating returns
    #[strum(serialize = "RETURN_STATION_NAME")]
    ReturnStationName,
    /// 0/1 flag: rental happened at a station
    #[strum(serialize = "RENTAL_IS_STATION")]
    RentalIsStation,
    /// 0/1 flag: return happened at a station
    #[strum(serialize = "RETURN_IS_STATION")]
    ReturnIsStation,
}

impl Column {
    /// Returns every required column, in source-file order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::StartTime,
            Self::EndTime,
            Self::StartLat,
            Self::StartLon,
            Self::EndLat,
            Self::EndLon,
            Self::RentalStationName,
            Self::ReturnStationName,
            Self::RentalIsStation,
            Self::ReturnIsStation,
        ]
    }
}

/// Column names of the canonical table, matching [`TripRecord::to_raw_row`].
pub const CANONICAL_COLUMNS: &[&str] = &[
    "STARTTIME",
    "ENDTIME",
    "DURATION",
    "STARTLAT",
    "STARTLON",
    "ENDLAT",
    "ENDLON",
    "RENTAL_STATION_NAME",
    "RETURN_STATION_NAME",
    "RENTAL_IS_STATION",
    "RETURN_IS_STATION",
    "RENTAL_IS_CITY",
    "RETURN_IS_CITY",
    "CITY_DISTRICT_START",
    "CITY_DISTRICT_END",
];

/// A single untyped cell.
///
/// Source files only ever produce [`RawValue::Text`] and [`RawValue::Empty`];
/// the numeric variants appear when a table is rebuilt from already-clean
/// records.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawValue {
    /// Textual cell, possibly padded or using a decimal comma.
    Text(String),
    /// Integer cell.
    Int(i64),
    /// Floating-point cell.
    Float(f64),
    /// Empty cell.
    #[default]
    Empty,
}

impl RawValue {
    /// Returns `true` for [`RawValue::Empty`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the text content if this is a [`RawValue::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Converts the cell into an owned string. Empty cells become `""`.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Empty => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Empty => Ok(()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_owned())
        }
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// A header row plus rows of [`RawValue`] cells, each row aligned to the
/// header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    /// Creates an empty table with the given column names. Names are trimmed
    /// since source headers carry fixed-width padding.
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|c| c.as_ref().trim().to_owned())
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding short rows with [`RawValue::Empty`] and
    /// truncating cells beyond the header width.
    pub fn push_row(&mut self, mut row: Vec<RawValue>) {
        row.resize(self.columns.len(), RawValue::Empty);
        self.rows.push(row);
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<RawValue>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Whether a column with this name exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Returns a new table with `f` applied to every cell of `name`.
    /// Tables without that column are returned unchanged.
    #[must_use]
    pub fn map_column(mut self, name: &str, mut f: impl FnMut(RawValue) -> RawValue) -> Self {
        if let Some(idx) = self.column_index(name) {
            for row in &mut self.rows {
                let cell = std::mem::take(&mut row[idx]);
                row[idx] = f(cell);
            }
        }
        self
    }

    /// Returns a new table without the named columns. Names that are not
    /// present are ignored.
    #[must_use]
    pub fn drop_columns<S: AsRef<str>>(self, names: &[S]) -> Self {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.iter().any(|n| n.as_ref() == c))
            .collect();

        let columns = self
            .columns
            .into_iter()
            .zip(&keep)
            .filter_map(|(c, k)| k.then_some(c))
            .collect();

        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&keep)
                    .filter_map(|(cell, k)| k.then_some(cell))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Concatenates tables row-wise.
    ///
    /// The resulting header is the union of all headers, in first-seen order.
    /// Cells for columns a table lacks are [`RawValue::Empty`].
    #[must_use]
    pub fn concat(tables: impl IntoIterator<Item = Self>) -> Self {
        let tables: Vec<Self> = tables.into_iter().collect();

        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut out = Self::new(&columns);
        for table in tables {
            let mapping: Vec<Option<usize>> = out
                .columns
                .iter()
                .map(|c| table.column_index(c))
                .collect();
            for mut row in table.rows {
                let aligned = mapping
                    .iter()
                    .map(|idx| {
                        idx.map_or(RawValue::Empty, |i| std::mem::take(&mut row[i]))
                    })
                    .collect();
                out.rows.push(aligned);
            }
        }
        out
    }

    /// Rebuilds a raw table from canonical records, using
    /// [`CANONICAL_COLUMNS`] as the header.
    #[must_use]
    pub fn from_trips(trips: &[TripRecord]) -> Self {
        let mut table = Self::new(CANONICAL_COLUMNS);
        for trip in trips {
            table.push_row(trip.to_raw_row());
        }
        table
    }

    /// Splits the table into its header and rows.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<RawValue>>) {
        (self.columns, self.rows)
    }
}

/// A cleaned, validated, and enriched trip. The output unit of the cleaning
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    /// When the bike was rented.
    pub start_time: NaiveDateTime,
    /// When the bike was returned. Never earlier than `start_time`.
    pub end_time: NaiveDateTime,
    /// `end_time - start_time`.
    #[serde(with = "duration_secs")]
    pub duration: TimeDelta,
    /// Rental latitude (WGS84).
    pub start_lat: f64,
    /// Rental longitude (WGS84).
    pub start_lon: f64,
    /// Return latitude (WGS84).
    pub end_lat: f64,
    /// Return longitude (WGS84).
    pub end_lon: f64,
    /// Rental station name, empty when not rented at a station.
    pub rental_station_name: String,
    /// Return station name, empty when not returned at a station.
    pub return_station_name: String,
    /// Whether the rental happened at a station.
    pub rental_is_station: bool,
    /// Whether the return happened at a station.
    pub return_is_station: bool,
    /// Whether the rental point lies inside the core service area.
    pub rental_is_city: bool,
    /// Whether the return point lies inside the core service area.
    pub return_is_city: bool,
    /// Name of the district containing the rental point.
    pub start_district: Option<String>,
    /// Name of the district containing the return point.
    pub end_district: Option<String>,
}

impl TripRecord {
    /// Cells for this record, aligned to [`CANONICAL_COLUMNS`].
    ///
    /// Flags are written as `0`/`1` so the row can be fed back through the
    /// cleaning pipeline unchanged.
    #[must_use]
    pub fn to_raw_row(&self) -> Vec<RawValue> {
        vec![
            RawValue::Text(self.start_time.format(TIMESTAMP_FORMAT).to_string()),
            RawValue::Text(self.end_time.format(TIMESTAMP_FORMAT).to_string()),
            RawValue::Int(self.duration.num_seconds()),
            RawValue::Float(self.start_lat),
            RawValue::Float(self.start_lon),
            RawValue::Float(self.end_lat),
            RawValue::Float(self.end_lon),
            RawValue::from(self.rental_station_name.as_str()),
            RawValue::from(self.return_station_name.as_str()),
            RawValue::Int(i64::from(self.rental_is_station)),
            RawValue::Int(i64::from(self.return_is_station)),
            RawValue::Int(i64::from(self.rental_is_city)),
            RawValue::Int(i64::from(self.return_is_city)),
            self.start_district
                .as_deref()
                .map_or(RawValue::Empty, RawValue::from),
            self.end_district
                .as_deref()
                .map_or(RawValue::Empty, RawValue::from),
        ]
    }
}

/// Serializes a [`TimeDelta`] as whole seconds.
mod duration_secs {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let secs = i64::deserialize(deserializer)?;
        TimeDelta::try_seconds(secs)
            .ok_or_else(|| serde::de::Error::custom(format!("duration out of range: {secs}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> RawTable {
        let mut t = RawTable::new(columns);
        for row in rows {
            t.push_row(row.iter().map(|c| RawValue::from(*c)).collect());
        }
        t
    }

    #[test]
    fn trims_padded_header_names() {
        let t = RawTable::new(["STARTTIME       ", "  Row"]);
        assert_eq!(t.columns(), ["STARTTIME", "Row"]);
    }

    #[test]
    fn pads_short_rows() {
        let t = table(&["a", "b", "c"], &[&["1"]]);
        assert_eq!(
            t.rows()[0],
            vec![RawValue::Text("1".into()), RawValue::Empty, RawValue::Empty]
        );
    }

    #[test]
    fn drops_named_columns_only() {
        let t = table(&["Row", "a", "b"], &[&["0", "x", "y"]]).drop_columns(&["Row", "missing"]);
        assert_eq!(t.columns(), ["a", "b"]);
        assert_eq!(
            t.rows()[0],
            vec![RawValue::Text("x".into()), RawValue::Text("y".into())]
        );
    }

    #[test]
    fn concat_aligns_columns_by_name() {
        let a = table(&["a", "b"], &[&["1", "2"]]);
        let b = table(&["b", "c"], &[&["3", "4"]]);
        let t = RawTable::concat([a, b]);
        assert_eq!(t.columns(), ["a", "b", "c"]);
        assert_eq!(t.len(), 2);
        assert_eq!(
            t.rows()[1],
            vec![
                RawValue::Empty,
                RawValue::Text("3".into()),
                RawValue::Text("4".into())
            ]
        );
    }

    #[test]
    fn map_column_ignores_unknown_column() {
        let t = table(&["a"], &[&["x"]]);
        let mapped = t.clone().map_column("nope", |_| RawValue::Empty);
        assert_eq!(mapped, t);
    }

    #[test]
    fn into_text_formats_numbers() {
        assert_eq!(RawValue::Empty.into_text(), "");
        assert_eq!(RawValue::Int(7).into_text(), "7");
        assert_eq!(RawValue::Float(48.1).into_text(), "48.1");
    }

    #[test]
    fn column_names_match_source_headers() {
        assert_eq!(Column::StartTime.as_ref(), "STARTTIME");
        assert_eq!(Column::ReturnIsStation.to_string(), "RETURN_IS_STATION");
        assert_eq!("ENDLON".parse::<Column>().unwrap(), Column::EndLon);
        assert_eq!(Column::all().len(), 10);
    }

    #[test]
    fn raw_row_matches_canonical_columns() {
        let start = NaiveDateTime::parse_from_str("2023-01-01 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let trip = TripRecord {
            start_time: start,
            end_time: start + TimeDelta::minutes(20),
            duration: TimeDelta::minutes(20),
            start_lat: 48.1,
            start_lon: 11.5,
            end_lat: 48.2,
            end_lon: 11.6,
            rental_station_name: String::new(),
            return_station_name: "Hauptbahnhof".into(),
            rental_is_station: false,
            return_is_station: true,
            rental_is_city: true,
            return_is_city: false,
            start_district: Some("Altstadt".into()),
            end_district: None,
        };
        let row = trip.to_raw_row();
        assert_eq!(row.len(), CANONICAL_COLUMNS.len());
        assert_eq!(row[0], RawValue::Text("2023-01-01 08:00:00".into()));
        assert_eq!(row[2], RawValue::Int(1200));
        assert_eq!(row[7], RawValue::Empty);
        assert_eq!(row[10], RawValue::Int(1));
        assert_eq!(row[14], RawValue::Empty);
    }

    #[test]
    fn trip_record_json_uses_seconds_for_duration() {
        let start = NaiveDateTime::parse_from_str("2023-01-01 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let trip = TripRecord {
            start_time: start,
            end_time: start + TimeDelta::minutes(5),
            duration: TimeDelta::minutes(5),
            start_lat: 48.1,
            start_lon: 11.5,
            end_lat: 48.1,
            end_lon: 11.5,
            rental_station_name: String::new(),
            return_station_name: String::new(),
            rental_is_station: false,
            return_is_station: false,
            rental_is_city: false,
            return_is_city: false,
            start_district: None,
            end_district: None,
        };
        let json = serde_json::to_value(&trip).unwrap();
        assert_eq!(json["duration"], 300);
        assert_eq!(json["rentalIsStation"], false);

        let back: TripRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, trip);
    }
}
