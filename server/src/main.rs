//! Headless dashboard server.
//!
//! Starts the axum web server and signal handling. The dashboard pages and
//! the Minecraft-side companion mod both talk to this process over HTTP.

use tracing_subscriber::EnvFilter;

use gtnh_dashboard_lib::app::SharedState;
use gtnh_dashboard_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting GTNH team dashboard");

    let (db, config, dir) = gtnh_dashboard_lib::init_foundation()?;
    let state = SharedState::new(db, config, dir);

    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    tracing::info!(
        port = state.server_port(),
        "Dashboard server running. Press Ctrl+C to stop."
    );

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    state.shutdown_token().cancel();
    let _ = server_handle.await;
    Ok(())
}
