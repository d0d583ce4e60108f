//! Boundary dataset loading (GeoJSON).

use std::path::Path;

use geo::{BoundingRect, Geometry, MultiPolygon};
use geojson::{Feature, GeoJson};
use log::{debug, info, warn};

use super::normalize::normalize_electorate;
use super::BoundaryPolygon;
use crate::config::REGION_NAME_PROPERTIES;
use crate::error_handling::ElectorateError;

/// Reads every polygon feature from a GeoJSON file.
pub fn load_boundaries(path: &Path) -> Result<Vec<BoundaryPolygon>, ElectorateError> {
    if !path.is_file() {
        return Err(ElectorateError::NotFound(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path)?;
    let polygons = parse_boundaries(&raw)?;
    info!(
        "Loaded {} electoral boundaries from {}",
        polygons.len(),
        path.display()
    );
    Ok(polygons)
}

/// Parses a GeoJSON `FeatureCollection` (or single `Feature`) into boundaries.
///
/// Features without polygon geometry are skipped; a polygon feature without a
/// region name is an error.
pub fn parse_boundaries(raw: &str) -> Result<Vec<BoundaryPolygon>, ElectorateError> {
    let features = match raw.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(ElectorateError::MissingRegionName {
                feature_index: 0,
                expected: REGION_NAME_PROPERTIES,
            })
        }
    };

    let mut polygons = Vec::with_capacity(features.len());
    for (feature_index, feature) in features.into_iter().enumerate() {
        let region_name = region_name(&feature).ok_or(ElectorateError::MissingRegionName {
            feature_index,
            expected: REGION_NAME_PROPERTIES,
        })?;

        let Some(geometry) = feature.geometry else {
            warn!("Skipping boundary {region_name:?}: feature has no geometry");
            continue;
        };

        let geometry = match Geometry::<f64>::try_from(geometry.value)? {
            Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
            Geometry::MultiPolygon(multi) => multi,
            other => {
                warn!(
                    "Skipping boundary {region_name:?}: unsupported geometry {:?}",
                    geometry_kind(&other)
                );
                continue;
            }
        };

        let Some(bbox) = geometry.bounding_rect() else {
            warn!("Skipping boundary {region_name:?}: empty geometry");
            continue;
        };

        debug!("Loaded boundary {region_name}");
        polygons.push(BoundaryPolygon {
            region_name,
            geometry,
            bbox,
        });
    }

    Ok(polygons)
}

/// First non-empty string property among the known name fields, normalized.
fn region_name(feature: &Feature) -> Option<String> {
    REGION_NAME_PROPERTIES.iter().find_map(|key| {
        feature
            .property(key)
            .and_then(|value| value.as_str())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(normalize_electorate)
    })
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_DIVISIONS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "Elect_div": "Sydney", "Sortname": "SYDNEY" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[151.0, -34.0], [151.4, -34.0], [151.4, -33.6], [151.0, -33.6], [151.0, -34.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "Sortname": "EDEN-MONARO" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[149.0, -37.0], [150.0, -37.0], [150.0, -36.0], [149.0, -36.0], [149.0, -37.0]]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "Elect_div": "Marker" },
                "geometry": { "type": "Point", "coordinates": [150.0, -35.0] }
            }
        ]
    }"#;

    #[test]
    fn test_parses_polygons_and_multipolygons() {
        let polygons = parse_boundaries(TWO_DIVISIONS).unwrap();
        let names: Vec<_> = polygons.iter().map(|p| p.region_name.as_str()).collect();
        assert_eq!(names, vec!["Sydney", "Eden-Monaro"]);
    }

    #[test]
    fn test_human_readable_name_preferred() {
        let polygons = parse_boundaries(TWO_DIVISIONS).unwrap();
        // Elect_div wins over Sortname when both are present
        assert_eq!(polygons[0].region_name, "Sydney");
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "code": 12 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                }
            }]
        }"#;
        assert!(matches!(
            parse_boundaries(raw),
            Err(ElectorateError::MissingRegionName { feature_index: 0, .. })
        ));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let result = load_boundaries(Path::new("/nonexistent/boundaries.geojson"));
        assert!(matches!(result, Err(ElectorateError::NotFound(_))));
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(matches!(
            parse_boundaries("not geojson"),
            Err(ElectorateError::GeoJson(_))
        ));
    }
}
