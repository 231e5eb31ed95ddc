//! WebAssembly module for the olive grove records
//!
//! Provides client-side helpers for the grove map view:
//! - Grid parsing with the same loader the server uses
//! - Scan-order tree positions and grid dimensions
//! - Tree labels and the map overlay

use shared::{tree_label as label_for, GridMap, GroveMap, Tree};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::grid::*;
pub use shared::types::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    log("olive grove map helpers loaded");
}

#[cfg(target_arch = "wasm32")]
fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn log(_message: &str) {}

fn to_js_error(message: String) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn grid_json(text: &str) -> Result<String, String> {
    to_json(&GridMap::parse(text))
}

fn positions_json(text: &str) -> Result<String, String> {
    to_json(&GridMap::parse(text).tree_positions())
}

fn dimensions_json(text: &str) -> Result<String, String> {
    to_json(&GridMap::parse(text).dimensions())
}

fn overlay_json(text: &str, trees_json: &str) -> Result<String, String> {
    let trees: Vec<Tree> =
        serde_json::from_str(trees_json).map_err(|e| format!("Invalid trees JSON: {}", e))?;
    to_json(&GroveMap::overlay(&GridMap::parse(text), &trees))
}

/// Parse grid text into its row-by-row occupancy markers
#[wasm_bindgen]
pub fn parse_grid_json(text: &str) -> Result<String, JsValue> {
    grid_json(text).map_err(to_js_error)
}

/// Occupied cells in scan order with their `tree-NNN` identifiers
#[wasm_bindgen]
pub fn tree_positions_json(text: &str) -> Result<String, JsValue> {
    positions_json(text).map_err(to_js_error)
}

/// Row count and the length of the longest row
#[wasm_bindgen]
pub fn grid_dimensions_json(text: &str) -> Result<String, JsValue> {
    dimensions_json(text).map_err(to_js_error)
}

/// Grid joined with the stored trees (as returned by `GET /api/v1/trees`)
#[wasm_bindgen]
pub fn grove_map_json(text: &str, trees_json: &str) -> Result<String, JsValue> {
    overlay_json(text, trees_json).map_err(to_js_error)
}

/// Scan-order identifiers as a JavaScript array
#[wasm_bindgen]
pub fn tree_ids(text: &str) -> js_sys::Array {
    GridMap::parse(text)
        .tree_positions()
        .into_iter()
        .map(|p| JsValue::from_str(&p.id))
        .collect()
}

/// Number of occupied cells
#[wasm_bindgen]
pub fn tree_count(text: &str) -> usize {
    GridMap::parse(text).tree_count()
}

/// Label for a 0-indexed grid position, e.g. "Tree 3-12"
#[wasm_bindgen]
pub fn tree_label(row: i32, col: i32) -> String {
    label_for(row, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_count() {
        assert_eq!(tree_count("x,,x\n,x,"), 3);
        assert_eq!(tree_count(""), 0);
    }

    #[test]
    fn test_tree_label() {
        assert_eq!(tree_label(0, 0), "Tree 1-1");
        assert_eq!(tree_label(2, 11), "Tree 3-12");
    }

    #[test]
    fn test_positions_json() {
        let json = positions_json("x,,x").unwrap();
        assert_eq!(
            json,
            r#"[{"row":0,"col":0,"id":"tree-001"},{"row":0,"col":2,"id":"tree-002"}]"#
        );
    }

    #[test]
    fn test_dimensions_json() {
        assert_eq!(dimensions_json("x,x,x\nx").unwrap(), r#"{"rows":2,"cols":3}"#);
    }

    #[test]
    fn test_overlay_rejects_bad_trees_json() {
        assert!(overlay_json("x", "not json").is_err());

        let map: serde_json::Value =
            serde_json::from_str(&overlay_json("x,", "[]").unwrap()).unwrap();
        assert_eq!(map["unregistered"], 1);
        assert_eq!(map["rows"][0][1]["state"], "empty");
    }

    #[test]
    fn test_grid_json_keeps_jagged_rows() {
        let map: serde_json::Value = serde_json::from_str(&grid_json("x,x\nx").unwrap()).unwrap();
        assert_eq!(map["rows"][0].as_array().unwrap().len(), 2);
        assert_eq!(map["rows"][1], serde_json::json!(["occupied"]));
    }
}
