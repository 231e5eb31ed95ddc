//! Olive grove records - backend server

use grove_backend::{create_app, services::GridSource, store, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "grove_server=debug,grove_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting olive grove records server");
    tracing::info!("Environment: {}", config.environment);

    let store = store::connect(&config.store).await?;
    tracing::info!("Using {} store", store.backend());

    let grid = GridSource::new(&config.grid.path);
    let addr = config.bind_address();
    let state = AppState::new(store, grid, config);

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
