//! HTTP API tests
//!
//! Requests go through the full router backed by the in-memory store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use grove_backend::services::GridSource;
use grove_backend::store::MemoryStore;
use grove_backend::{create_app, AppState, Config};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(store: Arc<MemoryStore>) -> Router {
    let state = AppState::new(store, GridSource::from_text("x,,x\n,x,"), Config::default());
    create_app(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_reports_store() {
    let app = app(Arc::new(MemoryStore::new()));

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "connected");
    assert_eq!(body["store_backend"], "memory");
}

#[tokio::test]
async fn test_grid_endpoints() {
    let app = app(Arc::new(MemoryStore::new()));

    let (status, body) = send(&app, Method::GET, "/api/v1/grid", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tree_count"], 3);
    assert_eq!(body["dimensions"], json!({ "rows": 2, "cols": 3 }));

    let (_, body) = send(&app, Method::GET, "/api/v1/grid/positions", None).await;
    assert_eq!(body["positions"][2], json!({ "row": 1, "col": 1, "id": "tree-003" }));
}

#[tokio::test]
async fn test_registry_initialization_flow() {
    let store = Arc::new(MemoryStore::new());
    let app = app(store.clone());

    let (_, status) = send(&app, Method::GET, "/api/v1/trees/registry", None).await;
    assert_eq!(status["needs_initialization"], true);
    assert_eq!(status["grid_positions"], 3);

    let (code, outcome) = send(&app, Method::POST, "/api/v1/trees/initialize", None).await;
    assert_eq!(code, StatusCode::CREATED);
    assert_eq!(outcome, json!({ "outcome": "seeded", "inserted": 3 }));

    let (code, outcome) = send(&app, Method::POST, "/api/v1/trees/initialize", None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(outcome["outcome"], "already_seeded");
    assert_eq!(store.calls().inserted_rows, 3);

    let (_, map) = send(&app, Method::GET, "/api/v1/grid/map", None).await;
    assert_eq!(map["registered"], 3);
    assert_eq!(map["rows"][0][1]["state"], "empty");
    assert_eq!(map["rows"][1][1]["label"], "Tree 2-2");
}

#[tokio::test]
async fn test_tree_update_and_logs() {
    let store = Arc::new(MemoryStore::new());
    let app = app(store);
    send(&app, Method::POST, "/api/v1/trees/initialize", None).await;

    let (_, body) = send(&app, Method::GET, "/api/v1/trees", None).await;
    let tree_id = body["trees"][0]["id"].as_str().unwrap().to_string();

    let (code, tree) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/trees/{tree_id}"),
        Some(json!({ "variety": "spanish queen", "year_planted": 2012, "supplier": "Hill Nursery" })),
    )
    .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(tree["variety"], "spanish queen");
    assert_eq!(tree["position_row"], 0);

    let (code, entry) = send(
        &app,
        Method::POST,
        &format!("/api/v1/trees/{tree_id}/logs"),
        Some(json!({ "date": "2024-06-01", "action_type": "weather", "frost": true })),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED);
    let log_id = entry["id"].as_str().unwrap().to_string();

    let (code, detail) = send(
        &app,
        Method::GET,
        &format!("/api/v1/tree-logs/{log_id}/detail"),
        None,
    )
    .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(detail["detail"]["action_type"], "weather");
    assert_eq!(detail["detail"]["frost"], true);

    let (_, detail) = send(
        &app,
        Method::GET,
        &format!("/api/v1/tree-logs/{log_id}/detail?action_type=irrigation"),
        None,
    )
    .await;
    assert_eq!(detail["detail"], Value::Null);

    let (code, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/tree-logs/{log_id}/detail?action_type=mowing"),
        None,
    )
    .await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "action_type");
    assert_eq!(body["error"]["message"], "Unknown action type: mowing");

    let (_, logs) = send(&app, Method::GET, &format!("/api/v1/trees/{tree_id}/logs"), None).await;
    assert_eq!(logs["logs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_batch_selection_is_a_validation_error() {
    let store = Arc::new(MemoryStore::new());
    let app = app(store.clone());

    let (code, body) = send(
        &app,
        Method::POST,
        "/api/v1/oil-batches",
        Some(json!({ "date": "2024-10-14", "tree_ids": [] })),
    )
    .await;

    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "tree_ids");
    assert_eq!(store.calls().total(), 0);
}

#[tokio::test]
async fn test_partial_log_write_has_its_own_code() {
    let store = Arc::new(MemoryStore::new());
    let app = app(store.clone());

    let (_, batch) = send(
        &app,
        Method::POST,
        "/api/v1/oil-batches",
        Some(json!({ "date": "2024-10-14", "tree_ids": [uuid::Uuid::new_v4()] })),
    )
    .await;
    let batch_id = batch["id"].as_str().unwrap().to_string();

    store.fail_writes_to(grove_backend::store::Table::FilteringLogs);
    let (code, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/oil-batches/{batch_id}/logs"),
        Some(json!({ "date": "2024-10-20", "action_type": "filtering", "plant_name": "Valley Press" })),
    )
    .await;

    assert_eq!(code, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "PARTIAL_WRITE");
}

#[tokio::test]
async fn test_unknown_tree_is_not_found() {
    let app = app(Arc::new(MemoryStore::new()));

    let (code, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/trees/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(code, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_batch_log_detail_checks_action_type_first() {
    let store = Arc::new(MemoryStore::new());
    let app = app(store.clone());
    let log_id = uuid::Uuid::new_v4();

    let (code, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/oil-batch-logs/{log_id}/detail?action_type=pressing"),
        None,
    )
    .await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "action_type");
    assert_eq!(store.calls().selects, 0);

    let (code, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/oil-batch-logs/{log_id}/detail?action_type=processing"),
        None,
    )
    .await;
    assert_eq!(code, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
