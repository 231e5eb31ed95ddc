//! Oil and pickling batch HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use shared::{BatchActionType, NewOilProcessingBatch, NewPicklingBatch, PicklingDetails};
use uuid::Uuid;

use crate::services::batch_log::CreateBatchLogInput;
use crate::services::{BatchLogService, BatchService};
use super::parse_action_type;
use crate::AppState;

// ============================================================================
// Oil processing batches
// ============================================================================

/// List oil batches, newest first
pub async fn list_oil_batches(State(state): State<AppState>) -> impl IntoResponse {
    let service = BatchService::new(state.store.clone());
    let batches = service.list_oil_batches().await;

    (StatusCode::OK, Json(serde_json::json!({ "batches": batches })))
}

/// Create an oil batch from a tree selection
pub async fn create_oil_batch(
    State(state): State<AppState>,
    Json(input): Json<NewOilProcessingBatch>,
) -> impl IntoResponse {
    let service = BatchService::new(state.store.clone());

    match service.create_oil_batch(input).await {
        Ok(batch) => (StatusCode::CREATED, Json(batch)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get an oil batch with its trees
pub async fn get_oil_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BatchService::new(state.store.clone());

    match service.get_oil_batch(batch_id).await {
        Ok(batch) => (StatusCode::OK, Json(batch)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List logs for an oil batch, newest first
pub async fn list_batch_logs(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BatchLogService::new(state.store.clone());
    let logs = service.list_logs(batch_id).await;

    (StatusCode::OK, Json(serde_json::json!({ "logs": logs })))
}

/// Record a processing log with its detail for an oil batch
pub async fn create_batch_log(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<CreateBatchLogInput>,
) -> impl IntoResponse {
    let service = BatchLogService::new(state.store.clone());

    match service.create_log(batch_id, input).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchLogDetailQuery {
    pub action_type: Option<String>,
}

/// Get an oil batch log with its detail
pub async fn get_batch_log_detail(
    State(state): State<AppState>,
    Path(log_id): Path<Uuid>,
    Query(query): Query<BatchLogDetailQuery>,
) -> impl IntoResponse {
    let kind = match parse_action_type::<BatchActionType>(query.action_type.as_deref()) {
        Ok(kind) => kind,
        Err(e) => return e.into_response(),
    };
    let service = BatchLogService::new(state.store.clone());

    match service.get_entry(log_id, kind).await {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Pickling batches
// ============================================================================

/// List pickling batches, newest first
pub async fn list_pickling_batches(State(state): State<AppState>) -> impl IntoResponse {
    let service = BatchService::new(state.store.clone());
    let batches = service.list_pickling_batches().await;

    (StatusCode::OK, Json(serde_json::json!({ "batches": batches })))
}

/// Create a pickling batch from a tree selection
pub async fn create_pickling_batch(
    State(state): State<AppState>,
    Json(input): Json<NewPicklingBatch>,
) -> impl IntoResponse {
    let service = BatchService::new(state.store.clone());

    match service.create_pickling_batch(input).await {
        Ok(batch) => (StatusCode::CREATED, Json(batch)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a pickling batch with its trees
pub async fn get_pickling_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BatchService::new(state.store.clone());

    match service.get_pickling_batch(batch_id).await {
        Ok(batch) => (StatusCode::OK, Json(batch)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update the descriptive fields of a pickling batch
pub async fn update_pickling_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<PicklingDetails>,
) -> impl IntoResponse {
    let service = BatchService::new(state.store.clone());

    match service.update_pickling_batch(batch_id, input).await {
        Ok(batch) => (StatusCode::OK, Json(batch)).into_response(),
        Err(e) => e.into_response(),
    }
}
