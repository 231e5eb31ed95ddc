//! Grid map HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use shared::{CellMarker, GridDimensions, GroveMap, TreePosition};

use crate::services::TreeService;
use crate::AppState;

#[derive(Serialize)]
pub struct GridResponse {
    pub dimensions: GridDimensions,
    pub tree_count: usize,
    pub rows: Vec<Vec<CellMarker>>,
}

/// Parsed grid occupancy
pub async fn get_grid(State(state): State<AppState>) -> impl IntoResponse {
    let grid = state.grid.load().await;

    let response = GridResponse {
        dimensions: grid.dimensions(),
        tree_count: grid.tree_count(),
        rows: grid.rows().to_vec(),
    };
    (StatusCode::OK, Json(response))
}

/// Occupied cells in scan order with their `tree-NNN` identifiers
pub async fn get_grid_positions(State(state): State<AppState>) -> impl IntoResponse {
    let grid = state.grid.load().await;
    let positions: Vec<TreePosition> = grid.tree_positions();

    (
        StatusCode::OK,
        Json(serde_json::json!({ "positions": positions })),
    )
}

/// Grid joined with the stored trees
pub async fn get_grove_map(State(state): State<AppState>) -> impl IntoResponse {
    let grid = state.grid.load().await;
    let trees = TreeService::new(state.store.clone()).list_trees().await;

    (StatusCode::OK, Json(GroveMap::overlay(&grid, &trees)))
}
