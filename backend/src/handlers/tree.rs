//! Tree, registry and tree log HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use shared::{TreeActionType, TreeAttributes};
use uuid::Uuid;

use crate::services::tree_log::CreateTreeLogInput;
use crate::services::{SeedOutcome, TreeLogService, TreeService};
use super::parse_action_type;
use crate::AppState;

/// List all trees in grid order
pub async fn list_trees(State(state): State<AppState>) -> impl IntoResponse {
    let service = TreeService::new(state.store.clone());
    let trees = service.list_trees().await;

    (StatusCode::OK, Json(serde_json::json!({ "trees": trees })))
}

/// Registry status: stored trees against grid positions
pub async fn get_registry_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.registry.status().await;
    (StatusCode::OK, Json(status))
}

/// Seed the registry from the grid map when the store holds no trees
pub async fn initialize_registry(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = state.registry.initialize().await;

    let status = match &outcome {
        SeedOutcome::Seeded { .. } => StatusCode::CREATED,
        SeedOutcome::AlreadySeeded { .. } => StatusCode::OK,
        SeedOutcome::Partial { .. } | SeedOutcome::Failed { .. } | SeedOutcome::Unavailable { .. } => {
            StatusCode::BAD_GATEWAY
        }
    };
    (status, Json(outcome))
}

/// Get a specific tree
pub async fn get_tree(
    State(state): State<AppState>,
    Path(tree_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = TreeService::new(state.store.clone());

    match service.get_tree(tree_id).await {
        Ok(tree) => (StatusCode::OK, Json(tree)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update the variety, planting year and supplier of a tree
pub async fn update_tree(
    State(state): State<AppState>,
    Path(tree_id): Path<Uuid>,
    Json(input): Json<TreeAttributes>,
) -> impl IntoResponse {
    let service = TreeService::new(state.store.clone());

    match service.update_tree(tree_id, input).await {
        Ok(tree) => (StatusCode::OK, Json(tree)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List logs for a tree, newest first
pub async fn list_tree_logs(
    State(state): State<AppState>,
    Path(tree_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = TreeLogService::new(state.store.clone());
    let logs = service.list_logs(tree_id).await;

    (StatusCode::OK, Json(serde_json::json!({ "logs": logs })))
}

/// Record a log with its detail for a tree
pub async fn create_tree_log(
    State(state): State<AppState>,
    Path(tree_id): Path<Uuid>,
    Json(input): Json<CreateTreeLogInput>,
) -> impl IntoResponse {
    let service = TreeLogService::new(state.store.clone());

    match service.create_log(tree_id, input).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct TreeLogDetailQuery {
    pub action_type: Option<String>,
}

/// Get a tree log with its detail
pub async fn get_tree_log_detail(
    State(state): State<AppState>,
    Path(log_id): Path<Uuid>,
    Query(query): Query<TreeLogDetailQuery>,
) -> impl IntoResponse {
    let kind = match parse_action_type::<TreeActionType>(query.action_type.as_deref()) {
        Ok(kind) => kind,
        Err(e) => return e.into_response(),
    };
    let service = TreeLogService::new(state.store.clone());

    match service.get_entry(log_id, kind).await {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(e) => e.into_response(),
    }
}
