#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial layers for trip endpoint classification.
//!
//! Two independent layers are loaded from `GeoJSON` files (WGS84,
//! longitude/latitude order):
//!
//! * [`DistrictIndex`]: named neighborhood polygons in an R-tree, answering
//!   "which district contains this point".
//! * [`ServiceArea`]: the core service area polygon, answering "is this point
//!   inside the free-floating return zone".
//!
//! Both are built once per pipeline run and are read-only afterwards.

mod districts;
mod service_area;

use std::path::{Path, PathBuf};

use geo::MultiPolygon;
use geojson::GeoJson;
use thiserror::Error;

pub use districts::DistrictIndex;
pub use service_area::ServiceArea;

/// Errors that can occur while loading spatial layers.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// The layer file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path of the layer file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The layer is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The layer contains no polygonal geometry at all.
    #[error("Layer {layer} contains no polygon geometry")]
    NoPolygons {
        /// Name of the layer (usually the file name).
        layer: String,
    },
}

/// District and service-area membership of a single trip endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EndpointClass {
    /// Name of the containing district, if any.
    pub district: Option<String>,
    /// Whether the point lies inside the core service area.
    pub in_city: bool,
}

/// Classifies one endpoint against both layers.
///
/// A missing coordinate yields no district and `in_city = false`.
#[must_use]
pub fn classify_endpoint(
    districts: &DistrictIndex,
    core_area: &ServiceArea,
    lat: Option<f64>,
    lon: Option<f64>,
) -> EndpointClass {
    let (Some(lat), Some(lon)) = (lat, lon) else {
        return EndpointClass::default();
    };

    EndpointClass {
        district: districts.lookup(lon, lat).map(str::to_owned),
        in_city: core_area.contains(lon, lat),
    }
}

/// Classifies a batch of `(lat, lon)` endpoints against both layers.
#[must_use]
pub fn classify_endpoints(
    districts: &DistrictIndex,
    core_area: &ServiceArea,
    points: impl IntoIterator<Item = (Option<f64>, Option<f64>)>,
) -> Vec<EndpointClass> {
    points
        .into_iter()
        .map(|(lat, lon)| classify_endpoint(districts, core_area, lat, lon))
        .collect()
}

/// Reads a layer file into a string.
fn read_layer(path: &Path) -> Result<String, SpatialError> {
    std::fs::read_to_string(path).map_err(|source| SpatialError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
///
/// Handles `Polygon`, `MultiPolygon`, and collections of those. Returns
/// `None` for geometries without any polygon part.
fn geometry_to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    let mut polygons = Vec::new();
    collect_polygons(geo_geom, &mut polygons);
    if polygons.is_empty() {
        None
    } else {
        Some(MultiPolygon(polygons))
    }
}

fn collect_polygons(geometry: geo::Geometry<f64>, out: &mut Vec<geo::Polygon<f64>>) {
    match geometry {
        geo::Geometry::Polygon(p) => out.push(p),
        geo::Geometry::MultiPolygon(mp) => out.extend(mp.0),
        geo::Geometry::GeometryCollection(gc) => {
            for g in gc.0 {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}

/// Flattens any `GeoJSON` document into `(properties, geometry)` pairs.
///
/// A bare geometry becomes a single pair without properties.
fn features_of(geojson: GeoJson) -> Vec<(Option<geojson::JsonObject>, Option<geojson::Geometry>)> {
    match geojson {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .map(|f| (f.properties, f.geometry))
            .collect(),
        GeoJson::Feature(f) => vec![(f.properties, f.geometry)],
        GeoJson::Geometry(g) => vec![(None, Some(g))],
    }
}
