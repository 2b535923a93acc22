//! Named district polygons in an R-tree.

use std::path::Path;

use geo::{BoundingRect, Contains, MultiPolygon};
use geojson::GeoJson;
use rstar::{AABB, RTree, RTreeObject};

use crate::{SpatialError, features_of, geometry_to_multipolygon, read_layer};

/// A district polygon stored in the R-tree with its metadata.
#[derive(Debug)]
struct DistrictEntry {
    name: String,
    /// Position of the feature in the source collection.
    order: usize,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for DistrictEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index over named district polygons.
///
/// Districts are expected to tile the city without overlap. When they do
/// overlap, the district that appears first in the source collection wins,
/// so results never depend on R-tree traversal order.
#[derive(Debug)]
pub struct DistrictIndex {
    tree: RTree<DistrictEntry>,
}

impl DistrictIndex {
    /// An index with no districts. Every lookup returns `None`.
    #[must_use]
    pub fn empty() -> Self {
        Self { tree: RTree::new() }
    }

    /// Loads districts from a `GeoJSON` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid `GeoJSON`.
    pub fn load(path: &Path, name_property: &str) -> Result<Self, SpatialError> {
        let text = read_layer(path)?;
        let index = Self::from_geojson_str(&text, name_property)?;
        log::info!(
            "Loaded {} districts from {}",
            index.len(),
            path.display()
        );
        Ok(index)
    }

    /// Builds the index from `GeoJSON` text.
    ///
    /// Each feature needs a polygonal geometry and a non-empty
    /// `name_property`. Features lacking either are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid `GeoJSON`.
    pub fn from_geojson_str(text: &str, name_property: &str) -> Result<Self, SpatialError> {
        let geojson: GeoJson = text.parse()?;
        let mut entries = Vec::new();

        for (order, (properties, geometry)) in features_of(geojson).into_iter().enumerate() {
            let Some(name) = properties
                .as_ref()
                .and_then(|p| p.get(name_property))
                .and_then(property_to_name)
            else {
                log::warn!("Skipping district feature {order}: no '{name_property}' property");
                continue;
            };

            let Some(polygon) = geometry.and_then(geometry_to_multipolygon) else {
                log::warn!("Skipping district {name}: no polygon geometry");
                continue;
            };

            let envelope = compute_envelope(&polygon);

            entries.push(DistrictEntry {
                name,
                order,
                envelope,
                polygon,
            });
        }

        Ok(Self {
            tree: RTree::bulk_load(entries),
        })
    }

    /// Number of indexed districts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index holds no districts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Looks up the district containing a point.
    ///
    /// Points on a district boundary are not contained.
    #[must_use]
    pub fn lookup(&self, lon: f64, lat: f64) -> Option<&str> {
        let point = geo::Point::new(lon, lat);
        let query_env = AABB::from_point([lon, lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.polygon.contains(&point))
            .min_by_key(|entry| entry.order)
            .map(|entry| entry.name.as_str())
    }
}

/// Reads a district name from a property value. Numeric identifiers are
/// accepted and rendered as text.
fn property_to_name(value: &geojson::JsonValue) -> Option<String> {
    let name = match value {
        geojson::JsonValue::String(s) => s.trim().to_owned(),
        geojson::JsonValue::Number(n) => n.to_string(),
        _ => return None,
    };
    (!name.is_empty()).then_some(name)
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}
