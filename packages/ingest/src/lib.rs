#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loading bike-share trip extracts and producing cleaned datasets.
//!
//! Yearly extracts are read into a [`RawTable`](bikeshare_trip_models::RawTable),
//! cleaned with the [`bikeshare_clean`] pipeline configured from a
//! [`CityProfile`], and kept in a process-wide [`DatasetCache`].

pub mod cache;
pub mod paths;
pub mod profile;
pub mod progress;
pub mod reader;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bikeshare_clean::{Pipeline, PipelineError};
use bikeshare_spatial::SpatialError;
use bikeshare_trip_models::TripRecord;
use thiserror::Error;

pub use bikeshare_clean::{CleanReport, CleanStats};
pub use cache::{DatasetCache, DatasetKey, shared_cache};
pub use profile::CityProfile;
pub use progress::{LoadProgress, NullProgress, null_progress};
pub use reader::{load_years, read_trip_csv, read_year_file};
pub use writer::{OutputFormat, write_trips_csv, write_trips_file, write_trips_json};

/// Errors that can occur while loading, cleaning, or writing trips.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A file could not be opened, read, or created.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A trip extract is not valid CSV, or the CSV writer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A city profile is not valid.
    #[error("Invalid city profile: {0}")]
    Toml(#[from] toml::de::Error),

    /// A geodata layer could not be loaded.
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    /// The cleaning pipeline rejected the input.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The first year of a range is after the last.
    #[error("Invalid year range: {start_year} is after {end_year}")]
    InvalidYearRange {
        /// First requested year.
        start_year: i32,
        /// Last requested year.
        end_year: i32,
    },
}

/// Reads the extracts for `start_year..=end_year` and runs the cleaning
/// pipeline over them.
///
/// # Errors
///
/// Returns an error if the year range is invalid, a file cannot be read, a
/// geodata layer cannot be loaded, or a required column is missing.
pub fn clean_years(
    profile: &CityProfile,
    data_dir: &Path,
    start_year: i32,
    end_year: i32,
    progress: &Arc<dyn LoadProgress>,
) -> Result<CleanReport, IngestError> {
    let table = load_years(profile, data_dir, start_year, end_year, progress)?;
    let pipeline = Pipeline::new(profile.pipeline_config(data_dir)?);
    Ok(pipeline.run(table)?)
}

/// Returns the cleaned trips for `start_year..=end_year`, from the shared
/// cache when available.
///
/// # Errors
///
/// Returns any error from [`clean_years`] on a cache miss.
pub fn load_dataset(
    profile: &CityProfile,
    data_dir: &Path,
    start_year: i32,
    end_year: i32,
    progress: &Arc<dyn LoadProgress>,
) -> Result<Arc<[TripRecord]>, IngestError> {
    let key = DatasetKey::new(profile.name.clone(), start_year, end_year);
    shared_cache().get_or_try_insert_with(key, || {
        clean_years(profile, data_dir, start_year, end_year, progress).map(|report| report.trips)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEIGHBOURHOODS: &str = r#"{"type":"FeatureCollection","features":[
{"type":"Feature","properties":{"name":"Altstadt-Lehel"},"geometry":{"type":"Polygon","coordinates":[[[11.55,48.12],[11.60,48.12],[11.60,48.15],[11.55,48.15],[11.55,48.12]]]}}
]}"#;

    const CITY_AREA: &str = r#"{"type":"FeatureCollection","features":[
{"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[11.50,48.10],[11.65,48.10],[11.65,48.20],[11.50,48.20],[11.50,48.10]]]}}
]}"#;

    const EXTRACT_2022: &str = "\
Row;STARTTIME       ;ENDTIME         ;STARTLAT;STARTLON;ENDLAT;ENDLON;RENTAL_STATION_NAME;RETURN_STATION_NAME;RENTAL_IS_STATION;RETURN_IS_STATION
0;2022-07-01 08:00;2022-07-01 08:20;48,13;11,57;48,30;11,70;Marienplatz ;;;
1;2022-07-01 09:00;2022-07-01 08:00;48,13;11,57;48,14;11,58;;;;
2;2022-07-01 10:00;2022-07-01 10:05;abc;11,57;48,14;11,58;;;;
";

    fn data_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bikeshare_{name}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("neighbourhoods.geojson"), NEIGHBOURHOODS).unwrap();
        std::fs::write(dir.join("city_area.geojson"), CITY_AREA).unwrap();
        std::fs::write(dir.join("MVG_Rad_Fahrten_2022.csv"), EXTRACT_2022).unwrap();
        dir
    }

    #[test]
    fn cleans_a_yearly_extract_end_to_end() {
        let dir = data_dir("clean");
        let report = clean_years(&CityProfile::munich(), &dir, 2022, 2022, &null_progress());
        std::fs::remove_dir_all(&dir).unwrap();
        let report = report.unwrap();

        assert_eq!(report.stats.input_rows, 3);
        assert_eq!(report.stats.invalid_interval_rows, 1);
        assert_eq!(report.stats.incomplete_rows, 1);
        assert_eq!(report.trips.len(), 1);

        let trip = &report.trips[0];
        assert_eq!(trip.rental_station_name, "Marienplatz");
        assert!(trip.rental_is_station);
        assert!(!trip.return_is_station);
        assert_eq!(trip.start_district.as_deref(), Some("Altstadt-Lehel"));
        assert_eq!(trip.end_district, None);
        assert!(trip.rental_is_city);
        assert!(!trip.return_is_city);
    }

    #[test]
    fn dataset_is_cached_per_profile_and_years() {
        let dir = data_dir("cache");
        let mut profile = CityProfile::munich();
        profile.name = format!("cache-test-{}", std::process::id());

        let first = load_dataset(&profile, &dir, 2022, 2022, &null_progress()).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
        // Files are gone, so this must come from the cache.
        let second = load_dataset(&profile, &dir, 2022, 2022, &null_progress()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }
}
