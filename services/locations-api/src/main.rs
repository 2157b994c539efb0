//! Locations API Server
//!
//! Climate projections for a geocoded address.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use gridded_climate::validate_element_mappings;
use locations_api::config::ServiceConfig;
use locations_api::state::AppState;
use storage::Database;

/// Locations API Server
#[derive(Parser, Debug)]
#[command(name = "locations-api")]
#[command(about = "Climate projections for a geocoded address")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "LOCATIONS_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "LOCATIONS_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Create the database tables and indexes before serving
    #[arg(long, env = "LOCATIONS_MIGRATE")]
    migrate: bool,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Starting Locations API server");

    let config = ServiceConfig::from_env()?;
    validate_element_mappings().context("Invalid gridded element configuration")?;

    let database = Database::connect(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to connect to database")?;

    if args.migrate {
        database.migrate().await.context("Migration failed")?;
    }

    // Initialize application state
    let state = Arc::new(AppState::new(&config, database)?.with_prometheus(prometheus_handle));

    let app = locations_api::build_router(state);

    // Parse listen address
    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!(address = %addr, "Locations API listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
