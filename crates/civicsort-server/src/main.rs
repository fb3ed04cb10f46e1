//! CivicSort Server
//!
//! HTTP front end for the complaint classification engine. The complaint
//! management application calls it to categorize and prioritize new
//! complaints and to feed staff corrections back into the model.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

mod config;
mod routes;
mod state;

use config::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "civicsort-server")]
#[command(about = "CivicSort complaint classification service", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "civicsort.yaml")]
    config: String,

    /// Persisted model path
    #[arg(short, long, env = "CIVICSORT_MODEL_PATH")]
    model_path: Option<String>,

    /// Listen address
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting CivicSort server");

    let config = ServerConfig::load(&cli.config, &cli)?;
    info!("Model path: {}", config.classifier.model_path.display());

    let metrics_handle = init_metrics()?;

    // Loading or training the model does file I/O and CPU work
    let classifier_config = config.classifier.clone();
    let state = tokio::task::spawn_blocking(move || {
        state::AppState::new(classifier_config, Some(metrics_handle))
    })
    .await??;

    let addr: SocketAddr = format!("{}:{}", config.listen, config.port).parse()?;
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            warn!("Shutdown signal received, stopping server...");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("civicsort=debug,civicsort_classifiers=debug,civicsort_server=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("civicsort=info,civicsort_classifiers=info,civicsort_server=info")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "civicsort_classifications_total",
        "Complaints classified, by method"
    );
    metrics::describe_counter!(
        "civicsort_prioritizations_total",
        "Complaints prioritized, by resulting priority"
    );
    metrics::describe_counter!(
        "civicsort_retrains_total",
        "Feedback retrains, by outcome"
    );
    metrics::describe_histogram!(
        "civicsort_classify_latency_us",
        metrics::Unit::Microseconds,
        "Classification latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
