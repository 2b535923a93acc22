//! Core service area polygon.

use std::path::Path;

use geo::{BoundingRect, Contains, Coord, MultiPolygon, Rect};
use geojson::GeoJson;

use crate::{SpatialError, features_of, geometry_to_multipolygon, read_layer};

/// The area inside which bikes may be returned away from a station.
///
/// Every polygon in the source layer is merged into one [`MultiPolygon`].
#[derive(Debug)]
pub struct ServiceArea {
    polygon: MultiPolygon<f64>,
    bounds: Option<Rect<f64>>,
}

impl ServiceArea {
    /// A service area that contains nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            polygon: MultiPolygon(Vec::new()),
            bounds: None,
        }
    }

    /// Wraps an existing polygon.
    #[must_use]
    pub fn from_polygon(polygon: MultiPolygon<f64>) -> Self {
        let bounds = polygon.bounding_rect();
        Self { polygon, bounds }
    }

    /// Loads the service area from a `GeoJSON` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid `GeoJSON`,
    /// or contains no polygon.
    pub fn load(path: &Path) -> Result<Self, SpatialError> {
        let text = read_layer(path)?;
        let area = Self::from_geojson_str(&text).map_err(|e| match e {
            SpatialError::NoPolygons { .. } => SpatialError::NoPolygons {
                layer: path.display().to_string(),
            },
            other => other,
        })?;
        log::info!(
            "Loaded service area with {} polygons from {}",
            area.polygon.0.len(),
            path.display()
        );
        Ok(area)
    }

    /// Builds the service area from `GeoJSON` text. Properties are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid `GeoJSON` or contains no
    /// polygon.
    pub fn from_geojson_str(text: &str) -> Result<Self, SpatialError> {
        let geojson: GeoJson = text.parse()?;

        let polygons: Vec<_> = features_of(geojson)
            .into_iter()
            .filter_map(|(_, geometry)| geometry.and_then(geometry_to_multipolygon))
            .flat_map(|mp| mp.0)
            .collect();

        if polygons.is_empty() {
            return Err(SpatialError::NoPolygons {
                layer: "service area".to_owned(),
            });
        }

        Ok(Self::from_polygon(MultiPolygon(polygons)))
    }

    /// Whether the point lies strictly inside the service area.
    #[must_use]
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let Some(bounds) = self.bounds else {
            return false;
        };
        let coord = Coord { x: lon, y: lat };
        if !within_bounds(&bounds, coord) {
            return false;
        }
        self.polygon.contains(&geo::Point::from(coord))
    }
}

fn within_bounds(rect: &Rect<f64>, c: Coord<f64>) -> bool {
    (rect.min().x..=rect.max().x).contains(&c.x) && (rect.min().y..=rect.max().y).contains(&c.y)
}
