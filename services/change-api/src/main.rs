//! Land Change API Server
//!
//! Similarity heatmaps between satellite embedding years.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use change_api::build_router;
use change_api::config::ServiceConfig;
use change_api::state::AppState;
use embedding_provider::{ProviderConfig, ProviderKind};

/// Land Change API Server
#[derive(Parser, Debug)]
#[command(name = "change-api")]
#[command(about = "Similarity heatmaps between satellite embedding years")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8084", env = "CHANGE_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "CHANGE_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Embedding provider: synthetic or http
    #[arg(long, env = "EMBEDDING_PROVIDER")]
    provider: Option<String>,

    /// Directory with optional YAML configuration
    #[arg(long, default_value = "config", env = "CHANGE_CONFIG_DIR")]
    config_dir: PathBuf,
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

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Starting Land Change API server");

    let mut provider_config = ProviderConfig::from_env();
    if let Some(kind) = &args.provider {
        provider_config.kind = ProviderKind::from_str(kind);
    }

    let mut service_config = ServiceConfig::from_env();
    service_config.config_dir = args.config_dir.clone();

    let state = match AppState::from_env(&provider_config, service_config) {
        Ok(state) => Arc::new(state.with_metrics(prometheus_handle)),
        Err(e) => {
            error!("Failed to initialize application state: {:#}", e);
            std::process::exit(1);
        }
    };

    // Requests retry initialization lazily; /ready reports 503 until then
    match state.provider.initialize().await {
        Ok(()) => info!(provider = state.provider.name(), "Embedding provider initialized"),
        Err(e) => warn!(
            provider = state.provider.name(),
            error = %e,
            "Embedding provider initialization failed"
        ),
    }

    let app = build_router(Arc::clone(&state));

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("Land Change API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    state.provider.shutdown().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
