//! # SoftMax Sales API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        API Server                                       │
//! │                                                                         │
//! │  Browser ───► HTTP (8080) ───► axum router ───► SQLite                  │
//! │                                                                         │
//! │  Missing SOFTMAX_SERVICE_URL / SOFTMAX_SERVICE_KEY:                     │
//! │    server starts, /health answers, data endpoints answer 503            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use softmax_api::config::DEFAULT_CONFIG_FILE;
use softmax_api::state::run_session_sweeper;
use softmax_api::{build_router, AppConfig, AppState, Backend};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "softmax_api=info,softmax_db=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(true)
        .init();

    info!("Starting SoftMax Sales API server...");

    let config = AppConfig::load(DEFAULT_CONFIG_FILE)?;
    info!(
        addr = %config.bind_address(),
        store = %config.store_name,
        configured = config.service_credentials().is_some(),
        "Configuration loaded"
    );

    let backend = match Backend::connect(&config).await {
        Ok(backend) => backend,
        Err(e) => {
            error!("Failed to connect to store: {}", e);
            None
        }
    };

    let addr = config.bind_address();
    let sweep_period = Duration::from_secs(config.session_sweep_secs);
    let state = AppState::new(config, backend);

    if state.backend.is_some() {
        tokio::spawn(run_session_sweeper(state.clone(), sweep_period));
    }

    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
