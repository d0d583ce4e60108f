//! Point-in-polygon lookup of electoral divisions.
//!
//! Boundaries are loaded once and held read-only for the run. Polygons are
//! kept sorted by region name, so a point covered by more than one polygon
//! (overlapping vintages, shared edges) always resolves to the alphabetically
//! first one, independent of dataset order.

mod loader;
mod normalize;

use std::path::Path;

use geo::{Contains, Intersects, MultiPolygon, Point, Rect};

use crate::error_handling::ElectorateError;

pub use loader::{load_boundaries, parse_boundaries};
pub use normalize::normalize_electorate;

/// One named division.
#[derive(Debug, Clone)]
pub struct BoundaryPolygon {
    pub region_name: String,
    pub geometry: MultiPolygon<f64>,
    pub bbox: Rect<f64>,
}

impl BoundaryPolygon {
    /// Builds a boundary; `None` if the geometry is empty.
    pub fn new(region_name: impl Into<String>, geometry: MultiPolygon<f64>) -> Option<Self> {
        use geo::BoundingRect;
        let bbox = geometry.bounding_rect()?;
        Some(Self {
            region_name: region_name.into(),
            geometry,
            bbox,
        })
    }

    /// Bounding-box test, inclusive of the edges.
    fn bbox_covers(&self, point: &Point<f64>) -> bool {
        let (min, max) = (self.bbox.min(), self.bbox.max());
        (min.x..=max.x).contains(&point.x()) && (min.y..=max.y).contains(&point.y())
    }
}

/// In-memory division lookup. Linear scan with a bounding-box prefilter.
#[derive(Debug, Clone)]
pub struct ElectorateMatcher {
    polygons: Vec<BoundaryPolygon>,
}

impl ElectorateMatcher {
    pub fn from_polygons(mut polygons: Vec<BoundaryPolygon>) -> Result<Self, ElectorateError> {
        if polygons.is_empty() {
            return Err(ElectorateError::Empty);
        }
        polygons.sort_by(|a, b| a.region_name.cmp(&b.region_name));
        Ok(Self { polygons })
    }

    pub fn from_geojson_path(path: &Path) -> Result<Self, ElectorateError> {
        Self::from_polygons(load_boundaries(path)?)
    }

    pub fn from_geojson_str(raw: &str) -> Result<Self, ElectorateError> {
        Self::from_polygons(parse_boundaries(raw)?)
    }

    /// Name of the division containing (`longitude`, `latitude`), if any.
    ///
    /// Interior containment is preferred; a point lying exactly on a boundary
    /// edge falls back to the first polygon touching it.
    pub fn locate(&self, longitude: f64, latitude: f64) -> Option<&str> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return None;
        }
        let point = Point::new(longitude, latitude);
        let mut nearby = self
            .polygons
            .iter()
            .filter(|polygon| polygon.bbox_covers(&point));

        let interior = nearby
            .clone()
            .find(|polygon| polygon.geometry.contains(&point));

        interior
            .or_else(|| nearby.find(|polygon| polygon.geometry.intersects(&point)))
            .map(|polygon| polygon.region_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Region names in lookup order.
    pub fn region_names(&self) -> impl Iterator<Item = &str> {
        self.polygons.iter().map(|p| p.region_name.as_str())
    }
}
