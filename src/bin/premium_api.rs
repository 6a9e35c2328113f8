//! Premium Estimation API Server
//!
//! REST API serving insurance premium estimates to the customer portal
//!
//! Usage:
//!   cargo run --bin premium_api
//!
//! Environment:
//!   PORT / PREMIUM_PORT   - Server port (default: 8080)
//!   PREMIUM_HOST          - Server host (default: 0.0.0.0)
//!   PREMIUM_RATE_TABLE    - JSON rate table replacing the built-in one
//!   PREMIUM_RATE_LIMIT    - Requests per client per minute (default: 100)
//!   PREMIUM_TELEMETRY_DIR - Where stats are exported on shutdown (default: ./telemetry)
//!   RUST_LOG              - Log level (default: info)

use premium_engine::api::{create_router, start_cleanup_task, AppState};
use premium_engine::utils::constants::{APP_NAME, APP_VERSION};
use premium_engine::ServerConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    info!("🛡️ {} v{}", APP_NAME, APP_VERSION);

    // Load configuration and the rate table, once
    let config = ServerConfig::from_env()?;
    let table = Arc::new(config.load_rate_table()?);

    for (category, profile) in table.iter() {
        info!(
            "   {:<7} {:<18} base ${:.2} ({} factors)",
            category.as_str(),
            profile.label,
            profile.base_price,
            profile.factors.len()
        );
    }

    // Create app state
    let state = Arc::new(AppState::from_config(&config, table));
    let telemetry = state.telemetry.clone();

    // Start background cleanup task for rate limiter
    start_cleanup_task(state.rate_limiter.clone());
    info!("🧹 Background cleanup task started");

    // Create router
    let app = create_router(state);

    let addr: SocketAddr = config.bind_address().parse()?;

    info!("🚀 Premium API starting on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /v1/premium/estimate        - Estimate a premium");
    info!("  POST /v1/premium/estimate/batch  - Batch estimates (up to 100)");
    info!("  GET  /v1/categories              - Insurance types and factors");
    info!("  GET  /v1/stats                   - Estimate statistics");
    info!("  GET  /v1/health                  - Health check");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    // Graceful shutdown sequence
    info!("🛑 Shutdown signal received, exporting telemetry...");
    info!("   {}", telemetry.get_stats().summary());

    match telemetry.export_stats_json() {
        Ok(path) => info!("   ✅ Stats exported to: {}", path.display()),
        Err(e) => warn!("   ⚠️ Failed to export stats: {}", e),
    }

    info!("👋 Premium API shutdown complete");

    Ok(())
}
