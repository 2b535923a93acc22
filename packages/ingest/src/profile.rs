//! City profiles: where a city's extracts and geodata live and how to clean
//! them.
//!
//! The Munich profile is embedded at compile time. Other cities can be
//! described in a TOML file of the same shape and loaded with
//! [`CityProfile::load`].

use std::path::{Path, PathBuf};

use bikeshare_clean::{CoordinateBounds, PipelineConfig, ValidRange};
use bikeshare_spatial::{DistrictIndex, ServiceArea};
use bikeshare_trip_models::INDEX_COLUMN;
use serde::{Deserialize, Serialize};

use crate::IngestError;

/// Embedded Munich profile.
const MUNICH_TOML: &str = include_str!("../profiles/munich.toml");

/// Placeholder replaced by the year in [`CityProfile::trip_file_pattern`].
const YEAR_PLACEHOLDER: &str = "{year}";

/// Describes one city's data set. File names are relative to the data
/// directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityProfile {
    /// Short identifier, also used as the dataset cache key.
    pub name: String,
    /// Accepted latitude range.
    pub latitude: ValidRange,
    /// Accepted longitude range.
    pub longitude: ValidRange,
    /// Yearly extract file name containing a `{year}` placeholder.
    pub trip_file_pattern: String,
    /// Administrative columns to drop before cleaning.
    #[serde(default = "default_dropped_columns")]
    pub dropped_columns: Vec<String>,
    /// District polygons `GeoJSON`.
    pub districts_file: String,
    /// Feature property holding the district name.
    #[serde(default = "default_district_name_property")]
    pub district_name_property: String,
    /// Core service area `GeoJSON`.
    pub core_area_file: String,
}

fn default_dropped_columns() -> Vec<String> {
    vec![INDEX_COLUMN.to_owned()]
}

fn default_district_name_property() -> String {
    "name".to_owned()
}

impl CityProfile {
    /// The embedded Munich profile.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed, which the tests rule out.
    #[must_use]
    pub fn munich() -> Self {
        Self::from_toml_str(MUNICH_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse munich.toml: {e}"))
    }

    /// Parses a profile from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Toml`] if the text is not a valid profile.
    pub fn from_toml_str(text: &str) -> Result<Self, IngestError> {
        Ok(toml::de::from_str(text)?)
    }

    /// Reads a profile from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Io`] if the file cannot be read and
    /// [`IngestError::Toml`] if it is not a valid profile.
    pub fn load(path: &Path) -> Result<Self, IngestError> {
        let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let profile = Self::from_toml_str(&text)?;
        log::info!("Loaded city profile {} from {}", profile.name, path.display());
        Ok(profile)
    }

    /// Returns the profile at `path`, or the Munich profile when `None`.
    ///
    /// # Errors
    ///
    /// Returns any error from [`CityProfile::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, IngestError> {
        path.map_or_else(|| Ok(Self::munich()), Self::load)
    }

    /// Coordinate bounds for the cleaning pipeline.
    #[must_use]
    pub const fn bounds(&self) -> CoordinateBounds {
        CoordinateBounds {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Path of the extract for `year`.
    #[must_use]
    pub fn trip_file(&self, data_dir: &Path, year: i32) -> PathBuf {
        data_dir.join(
            self.trip_file_pattern
                .replace(YEAR_PLACEHOLDER, &year.to_string()),
        )
    }

    /// Loads both geodata layers and builds the pipeline configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Spatial`] if either layer cannot be loaded.
    pub fn pipeline_config(&self, data_dir: &Path) -> Result<PipelineConfig, IngestError> {
        let districts = DistrictIndex::load(
            &data_dir.join(&self.districts_file),
            &self.district_name_property,
        )?;
        let core_area = ServiceArea::load(&data_dir.join(&self.core_area_file))?;

        Ok(PipelineConfig::new(core_area, districts)
            .with_bounds(self.bounds())
            .with_dropped_columns(self.dropped_columns.iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_munich_profile_parses() {
        let profile = CityProfile::munich();
        assert_eq!(profile.name, "munich");
        assert_eq!(profile.bounds(), CoordinateBounds::default());
        assert_eq!(profile.dropped_columns, ["Row"]);
        assert_eq!(profile.district_name_property, "name");
    }

    #[test]
    fn trip_file_substitutes_year() {
        let profile = CityProfile::munich();
        assert_eq!(
            profile.trip_file(Path::new("/data"), 2022),
            Path::new("/data/MVG_Rad_Fahrten_2022.csv")
        );
    }

    #[test]
    fn optional_fields_have_defaults() {
        let profile = CityProfile::from_toml_str(
            r#"
name = "berlin"
latitude = { min = 52.3, max = 52.7 }
longitude = { min = 13.0, max = 13.8 }
trip_file_pattern = "trips_{year}.csv"
districts_file = "bezirke.geojson"
core_area_file = "ring.geojson"
"#,
        )
        .unwrap();
        assert_eq!(profile.dropped_columns, ["Row"]);
        assert_eq!(profile.district_name_property, "name");
        assert!(profile.bounds().latitude.contains(52.5));
    }

    #[test]
    fn rejects_incomplete_profile() {
        assert!(matches!(
            CityProfile::from_toml_str("name = \"nowhere\""),
            Err(IngestError::Toml(_))
        ));
    }

    #[test]
    fn missing_layers_fail_pipeline_config() {
        let err = CityProfile::munich()
            .pipeline_config(Path::new("/nonexistent"))
            .unwrap_err();
        assert!(matches!(err, IngestError::Spatial(_)));
    }
}
