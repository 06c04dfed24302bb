//! GeoJSON glue around the skeleton builder.

use crate::error::{Result, SkeletonError};
use crate::skeleton::Skeleton;
use geo::Geometry as GeoGeometry;
use geo_types::{MultiPolygon, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use serde_json::json;
use std::convert::TryInto;
use std::str::FromStr;

/// Collects every polygon of a GeoJSON document.
///
/// Accepts a bare geometry, a `Feature` or a `FeatureCollection`. Only
/// `Polygon`, `MultiPolygon` and polygons nested in a `GeometryCollection`
/// are kept; other geometries are skipped.
pub fn parse_multi_polygon(input: &str) -> Result<MultiPolygon<f64>> {
    let geojson = GeoJson::from_str(input)
        .map_err(|e| SkeletonError::GeoJson(format!("failed to parse GeoJSON: {}", e)))?;

    let mut polygons = Vec::new();
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in fc.features {
                if let Some(geometry) = feature.geometry {
                    collect_polygons(geometry, &mut polygons)?;
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geometry) = feature.geometry {
                collect_polygons(geometry, &mut polygons)?;
            }
        }
        GeoJson::Geometry(geometry) => collect_polygons(geometry, &mut polygons)?,
    }
    Ok(MultiPolygon::new(polygons))
}

fn collect_polygons(geometry: Geometry, polygons: &mut Vec<Polygon<f64>>) -> Result<()> {
    let geometry: GeoGeometry<f64> = geometry
        .try_into()
        .map_err(|e: geojson::Error| SkeletonError::GeoJson(e.to_string()))?;
    push_polygonal(geometry, polygons);
    Ok(())
}

fn push_polygonal(geometry: GeoGeometry<f64>, polygons: &mut Vec<Polygon<f64>>) {
    match geometry {
        GeoGeometry::Polygon(polygon) => polygons.push(polygon),
        GeoGeometry::MultiPolygon(multi) => polygons.extend(multi.0),
        GeoGeometry::GeometryCollection(collection) => {
            for geometry in collection.0 {
                push_polygonal(geometry, polygons);
            }
        }
        _ => {}
    }
}

/// One `Polygon` feature per face, carrying the source `edge` and the
/// `heights` of the face points in ring order.
pub fn skeleton_to_geojson(skeleton: &Skeleton) -> FeatureCollection {
    let faces = skeleton.to_multi_polygon();

    let features = skeleton
        .edges
        .iter()
        .zip(faces.0.iter())
        .map(|(face, polygon)| {
            let mut feature = Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::from(polygon))),
                id: None,
                properties: None,
                foreign_members: None,
            };
            let (start, end) = (face.edge.start, face.edge.end);
            let heights: Vec<Option<f64>> =
                face.polygon.iter().map(|p| skeleton.distance(*p)).collect();

            feature.set_property("edge", json!([[start.x, start.y], [end.x, end.y]]));
            feature.set_property("heights", json!(heights));
            feature
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SkeletonBuilder;

    const SQUARE: &str = r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}"#;

    #[test]
    fn test_parse_bare_polygon() {
        let mp = parse_multi_polygon(SQUARE).unwrap();
        assert_eq!(mp.0.len(), 1);
        assert_eq!(mp.0[0].exterior().0.len(), 5);
    }

    #[test]
    fn test_parse_feature_collection_skips_lines() {
        let input = format!(
            r#"{{"type":"FeatureCollection","features":[
                {{"type":"Feature","properties":null,"geometry":{}}},
                {{"type":"Feature","properties":null,"geometry":{{"type":"LineString","coordinates":[[0,0],[1,1]]}}}},
                {{"type":"Feature","properties":null,"geometry":{{"type":"MultiPolygon","coordinates":[
                    [[[5,5],[6,5],[6,6],[5,5]]],
                    [[[8,8],[9,8],[9,9],[8,8]]]
                ]}}}}
            ]}}"#,
            SQUARE
        );
        let mp = parse_multi_polygon(&input).unwrap();
        assert_eq!(mp.0.len(), 3);
    }

    #[test]
    fn test_parse_feature() {
        let input = format!(r#"{{"type":"Feature","properties":{{}},"geometry":{}}}"#, SQUARE);
        assert_eq!(parse_multi_polygon(&input).unwrap().0.len(), 1);
    }

    #[test]
    fn test_parse_invalid_input() {
        assert!(matches!(
            parse_multi_polygon("{not json"),
            Err(SkeletonError::GeoJson(_))
        ));
    }

    #[test]
    fn test_skeleton_to_geojson_properties() {
        let mp = parse_multi_polygon(SQUARE).unwrap();
        let skeleton = SkeletonBuilder::new().build_multi_polygon(&mp).unwrap();
        let fc = skeleton_to_geojson(&skeleton);

        assert_eq!(fc.features.len(), 4);
        for feature in &fc.features {
            let edge = feature.property("edge").expect("edge property");
            assert_eq!(edge.as_array().map(|a| a.len()), Some(2));

            let heights = feature.property("heights").and_then(|h| h.as_array()).unwrap();
            assert_eq!(heights.len(), 3);
            assert!(heights.iter().all(|h| h.is_number()));
        }
    }
}
