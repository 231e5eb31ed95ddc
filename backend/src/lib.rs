//! Olive grove records backend
//!
//! JSON API over the grove grid map, the tree registry, per-tree logs and
//! processing batches. All persistence goes through a [`store::DataStore`].

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use crate::config::Config;

use services::{GridSource, TreeRegistry};
use store::DataStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub grid: Arc<GridSource>,
    pub registry: Arc<TreeRegistry>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn DataStore>, grid: GridSource, config: Config) -> Self {
        let grid = Arc::new(grid);
        let registry = Arc::new(TreeRegistry::new(
            store.clone(),
            grid.clone(),
            config.registry.seed_chunk_size,
        ));
        Self {
            store,
            grid,
            registry,
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Olive Grove Records API v1"
}
