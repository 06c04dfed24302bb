use crate::io::{parse_multi_polygon, skeleton_to_geojson};
use crate::SkeletonBuilder;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Skeleton faces of every polygon in a GeoJSON document, as a GeoJSON
/// `FeatureCollection` string.
#[wasm_bindgen]
pub fn straight_skeleton(geojson_str: &str) -> Result<String, JsValue> {
    let multi_polygon = parse_multi_polygon(geojson_str)
        .map_err(|e| JsValue::from_str(&format!("Failed to read input: {}", e)))?;

    let skeleton = SkeletonBuilder::new()
        .build_multi_polygon(&multi_polygon)
        .map_err(|e| JsValue::from_str(&format!("Skeleton failed: {}", e)))?;

    Ok(skeleton_to_geojson(&skeleton).to_string())
}
