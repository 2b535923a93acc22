#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Trip record cleaning pipeline.
//!
//! Converts a [`RawTable`](bikeshare_trip_models::RawTable) of
//! inconsistently formatted trip rows into validated
//! [`TripRecord`](bikeshare_trip_models::TripRecord)s:
//!
//! 1. station names are trimmed,
//! 2. administrative columns are dropped,
//! 3. coordinates are parsed and bounds-checked,
//! 4. station flags are parsed and missing ones inferred from station names,
//! 5. trip durations are derived,
//! 6. trips with missing or reversed timestamps are removed,
//! 7. rows still missing a required field are removed,
//! 8. endpoints are classified against the district and service-area layers.
//!
//! Value-level problems never abort a run; they degrade the value to missing
//! and the row is removed later. Only a structurally absent input column is
//! fatal.

pub mod config;
pub mod coordinates;
pub mod draft;
pub mod normalize;
pub mod pipeline;
pub mod station_flag;
pub mod temporal;

use thiserror::Error;

pub use config::PipelineConfig;
pub use coordinates::{CoordinateBounds, ValidRange};
pub use pipeline::{CleanReport, CleanStats, Pipeline};

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required input column is not present in the raw table.
    #[error("Missing required column: {column}")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },
}
