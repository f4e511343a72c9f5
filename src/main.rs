//! Stove Timer - A countdown timer service that reminds you to check the stove
//!
//! This is the main entry point for the stove-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use stove_timer::{
    config::Config,
    state::{AppState, Platform},
    api::create_router,
    services::check_command_available,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("stove_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting stove-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms, rings={}",
          config.host, config.port, config.tick_interval_ms, config.rings);

    // Alarms degrade to notification and vibration without a player
    if let Err(e) = check_command_available(&config.player).await {
        warn!("{}", e);
    }

    let state = Arc::new(AppState::new(&config, Platform::host(&config)));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start          - Start the countdown");
    info!("  POST /timer/cancel         - Ask to cancel a running timer");
    info!("  POST /timer/cancel/confirm - Confirm the cancel request");
    info!("  POST /timer/cancel/abort   - Keep the timer running");
    info!("  POST /timer/reset          - Stop the alarm and reset");
    info!("  PUT  /selection            - Pick hours and minutes");
    info!("  GET  /status               - Current timer state");
    info!("  GET  /events               - Timer updates as server-sent events");
    info!("  GET  /health               - Health check");

    // Setup graceful shutdown. Without signal handlers, serve until killed.
    let server = axum::serve(listener, app);
    let shutdown = async {
        match shutdown_signal().await {
            Ok(signal) => signal,
            Err(e) => {
                tracing::error!("Failed to listen for shutdown signals: {}", e);
                std::future::pending().await
            }
        }
    };

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        signal = shutdown => {
            info!("Shutdown signal {} received", signal);
        }
    }

    // Make sure no player process outlives the server
    if let Err(e) = state.reset() {
        warn!("Failed to reset timer on shutdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
