//! Route definitions for the olive grove records API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/grid", grid_routes())
        .nest("/trees", tree_routes())
        .route("/tree-logs/:log_id/detail", get(handlers::get_tree_log_detail))
        .nest("/oil-batches", oil_batch_routes())
        .route(
            "/oil-batch-logs/:log_id/detail",
            get(handlers::get_batch_log_detail),
        )
        .nest("/pickling-batches", pickling_batch_routes())
}

/// Grid map routes
fn grid_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_grid))
        .route("/positions", get(handlers::get_grid_positions))
        .route("/map", get(handlers::get_grove_map))
}

/// Tree, registry and tree log routes
fn tree_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_trees))
        .route("/registry", get(handlers::get_registry_status))
        .route("/initialize", post(handlers::initialize_registry))
        .route(
            "/:tree_id",
            get(handlers::get_tree).put(handlers::update_tree),
        )
        .route(
            "/:tree_id/logs",
            get(handlers::list_tree_logs).post(handlers::create_tree_log),
        )
}

/// Oil processing batch routes
fn oil_batch_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_oil_batches).post(handlers::create_oil_batch),
        )
        .route("/:batch_id", get(handlers::get_oil_batch))
        .route(
            "/:batch_id/logs",
            get(handlers::list_batch_logs).post(handlers::create_batch_log),
        )
}

/// Pickling batch routes
fn pickling_batch_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_pickling_batches).post(handlers::create_pickling_batch),
        )
        .route(
            "/:batch_id",
            get(handlers::get_pickling_batch).put(handlers::update_pickling_batch),
        )
}
