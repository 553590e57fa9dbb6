//! ArthaNidhi Payment Bank - demo ledger server
//!
//! Serves the in-memory ledger and transfer engine over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use arthanidhi_ledger::api::{build_router, AppState};
use arthanidhi_ledger::jobs::{JobScheduler, JobSchedulerConfig};
use arthanidhi_ledger::session::SessionStore;
use arthanidhi_ledger::{Config, Ledger};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging; production emits JSON lines
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "arthanidhi_ledger=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.is_production());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(
        environment = %config.environment,
        opening_balance = %config.opening_balance,
        "Starting ArthaNidhi ledger server"
    );

    let ledger = Arc::new(Ledger::with_opening_balance(config.opening_balance));
    if config.seed_demo_data {
        ledger.seed_demo_data()?;
    }

    let sessions = Arc::new(SessionStore::new(config.session_ttl()));
    let scheduler = JobScheduler::with_config(
        Arc::clone(&sessions),
        JobSchedulerConfig {
            session_sweep_interval: config.session_sweep_interval(),
        },
    )
    .start();

    let app = build_router(AppState::new(config, ledger, sessions));

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutting down...");
    scheduler.abort();
    tracing::info!("Background jobs stopped. Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
