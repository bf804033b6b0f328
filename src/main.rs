//! DocVault Server — hierarchical folder and versioned-document store.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use docvault_core::config::AppConfig;
use docvault_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("DOCVAULT_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DocVault v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db_pool = docvault_database::connection::create_pool(&config.database).await?;
    docvault_database::migration::run_migrations(&db_pool).await?;

    // ── Step 2: Object store ─────────────────────────────────────
    tracing::info!(provider = %config.storage.provider, "Initializing object store");
    let store = docvault_storage::build_store(&config.storage).await?;

    // ── Step 3: Wire services + router ───────────────────────────
    let config = Arc::new(config);
    let state = docvault_api::state::AppState::new(Arc::clone(&config), db_pool, store);
    let router = docvault_api::router::build_router(state);

    // ── Step 4: Serve ────────────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %addr, "DocVault listening");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server failed: {e}")))?;

    tracing::info!("DocVault stopped");
    Ok(())
}

/// Resolve when the process receives a termination signal.
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
