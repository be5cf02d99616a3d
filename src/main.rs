use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gatehouse::config::GatehouseConfig;
use gatehouse::identity::StaticTokenResolver;
use gatehouse::limit::{app_rate_limit, global_rate_limit, ip_rate_limit, RateLimitState};
use gatehouse::storage::InMemoryStore;

#[derive(Parser, Debug)]
#[command(name = "gatehouse")]
#[command(about = "Fixed-window request rate limiting for HTTP services")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    info!("Starting Gatehouse");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = match args.config {
        Some(path) => GatehouseConfig::from_file(&path)?,
        None => GatehouseConfig::default(),
    };
    info!(listen_addr = %config.server.listen_addr, "Configuration loaded");

    let state = RateLimitState::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(StaticTokenResolver::from_entries(&config.apps)),
        config.rate_limits,
    );

    // Outermost layer runs first: global, then per-IP, then per-application.
    let app = Router::new()
        .route("/health", get(health))
        .layer(from_fn_with_state(state.clone(), app_rate_limit))
        .layer(from_fn_with_state(state.clone(), ip_rate_limit))
        .layer(from_fn_with_state(state, global_rate_limit));

    let listener = tokio::net::TcpListener::bind(config.server.listen_addr).await?;
    info!("Listening on {}", config.server.listen_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Gatehouse stopped");
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
