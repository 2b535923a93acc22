//! Canonical table writers.

use std::io::Write;
use std::path::Path;

use bikeshare_trip_models::{CANONICAL_COLUMNS, TripRecord};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::IngestError;

/// Output formats for the canonical table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Semicolon-separated, re-ingestable by the trip reader.
    #[default]
    Csv,
    /// Array of trip objects.
    Json,
}

/// Writes trips as semicolon-separated CSV with the canonical header.
///
/// Flags are written as `0`/`1`, so the output can be fed back through the
/// cleaning pipeline.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] if writing fails.
pub fn write_trips_csv<W: Write>(writer: W, trips: &[TripRecord]) -> Result<(), IngestError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(writer);

    wtr.write_record(CANONICAL_COLUMNS)?;
    for trip in trips {
        wtr.write_record(trip.to_raw_row().iter().map(ToString::to_string))?;
    }
    wtr.flush().map_err(csv::Error::from)?;

    Ok(())
}

/// Writes trips as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns [`IngestError::Json`] if serialization or writing fails.
pub fn write_trips_json<W: Write>(writer: W, trips: &[TripRecord]) -> Result<(), IngestError> {
    serde_json::to_writer_pretty(writer, trips)?;
    Ok(())
}

/// Writes trips to `path` in the given format.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the file cannot be created, or any error
/// from the format writer.
pub fn write_trips_file(
    path: &Path,
    format: OutputFormat,
    trips: &[TripRecord],
) -> Result<(), IngestError> {
    let file = std::fs::File::create(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let writer = std::io::BufWriter::new(file);

    match format {
        OutputFormat::Csv => write_trips_csv(writer, trips)?,
        OutputFormat::Json => write_trips_json(writer, trips)?,
    }

    log::info!("Wrote {} trips to {} ({format})", trips.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use bikeshare_clean::{Pipeline, PipelineConfig};
    use bikeshare_spatial::{DistrictIndex, ServiceArea};
    use chrono::{NaiveDateTime, TimeDelta};

    use super::*;
    use crate::reader::read_trip_csv;

    fn trip() -> TripRecord {
        let start =
            NaiveDateTime::parse_from_str("2023-06-01 17:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        TripRecord {
            start_time: start,
            end_time: start + TimeDelta::minutes(12),
            duration: TimeDelta::minutes(12),
            start_lat: 48.137,
            start_lon: 11.575,
            end_lat: 48.15,
            end_lon: 11.58,
            rental_station_name: "Marienplatz".into(),
            return_station_name: String::new(),
            rental_is_station: true,
            return_is_station: false,
            rental_is_city: false,
            return_is_city: false,
            start_district: None,
            end_district: None,
        }
    }

    #[test]
    fn csv_output_uses_semicolons_and_numeric_flags() {
        let mut buf = Vec::new();
        write_trips_csv(&mut buf, &[trip()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some(CANONICAL_COLUMNS.join(";").as_str()));
        assert_eq!(
            lines.next(),
            Some(
                "2023-06-01 17:30:00;2023-06-01 17:42:00;720;48.137;11.575;48.15;11.58;Marienplatz;;1;0;0;0;;"
            )
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_output_can_be_cleaned_again() {
        let mut buf = Vec::new();
        write_trips_csv(&mut buf, &[trip()]).unwrap();

        let table = read_trip_csv(buf.as_slice()).unwrap();
        let pipeline = Pipeline::new(PipelineConfig::new(
            ServiceArea::empty(),
            DistrictIndex::empty(),
        ));
        let report = pipeline.run(table).unwrap();
        assert_eq!(report.trips, vec![trip()]);
    }

    #[test]
    fn json_output_is_an_array_of_trips() {
        let mut buf = Vec::new();
        write_trips_json(&mut buf, &[trip()]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["rentalStationName"], "Marienplatz");
        assert_eq!(value[0]["duration"], 720);
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn unknown_format_error_converts_to_boxed_error() {
        let err: Box<dyn std::error::Error + Send + Sync> =
            "xml".parse::<OutputFormat>().unwrap_err().into();
        assert!(!err.to_string().is_empty());
    }
}
