//! Drought overlay API service.
//!
//! HTTP server producing drought-index map overlays (PNG), legends and
//! overlay bounds for an external map widget.

mod handlers;
mod layer_config;
mod metrics;
mod state;

use anyhow::Result;
use axum::{extract::Extension, routing::get, Router};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "drought-api")]
#[command(about = "Drought-index overlay API server")]
struct Args {
    /// Listen address
    #[arg(short, long, env = "DROUGHT_API_LISTEN", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory holding layers.yaml and styles/
    #[arg(long, env = "DROUGHT_CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Directory holding the raster files
    #[arg(long, env = "DROUGHT_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting drought overlay API server");

    // Initialize application state; malformed layer or style configuration
    // fails here, before the listener comes up.
    let state = Arc::new(AppState::new(&args.config_dir, &args.data_dir)?);
    info!(
        layers = state.registry.len(),
        data_dir = %args.data_dir.display(),
        "Layer registry ready"
    );

    // Build router
    let app = Router::new()
        .route("/map/:layer", get(handlers::map_handler))
        .route("/legend/:layer", get(handlers::legend_handler))
        .route("/bounds/:layer", get(handlers::bounds_handler))
        .route("/layers", get(handlers::layers_handler))
        // Health check
        .route("/health", get(handlers::health_handler))
        .route("/ready", get(handlers::ready_handler))
        // Metrics
        .route("/metrics", get(handlers::metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(Extension(state))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new()),
        );

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    info!(listen = %args.listen, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
