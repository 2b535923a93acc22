//! Pipeline configuration.

use bikeshare_spatial::{DistrictIndex, ServiceArea};
use bikeshare_trip_models::INDEX_COLUMN;

use crate::coordinates::CoordinateBounds;

/// Everything a [`Pipeline`](crate::Pipeline) run needs besides its input.
///
/// Built once and never mutated during a run.
#[derive(Debug)]
pub struct PipelineConfig {
    /// Accepted coordinate ranges.
    pub bounds: CoordinateBounds,
    /// Core service area polygon for the `*_IS_CITY` flags.
    pub core_area: ServiceArea,
    /// District polygons for the `CITY_DISTRICT_*` columns.
    pub districts: DistrictIndex,
    /// Administrative columns removed before typing.
    pub dropped_columns: Vec<String>,
}

impl PipelineConfig {
    /// Creates a config for the given layers with the Munich coordinate
    /// bounds, dropping only the row index column.
    #[must_use]
    pub fn new(core_area: ServiceArea, districts: DistrictIndex) -> Self {
        Self {
            bounds: CoordinateBounds::default(),
            core_area,
            districts,
            dropped_columns: vec![INDEX_COLUMN.to_owned()],
        }
    }

    #[must_use]
    pub const fn with_bounds(mut self, bounds: CoordinateBounds) -> Self {
        self.bounds = bounds;
        self
    }

    #[must_use]
    pub fn with_dropped_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dropped_columns = columns.into_iter().map(Into::into).collect();
        self
    }
}
