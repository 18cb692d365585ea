pub mod app;
pub mod config;
pub mod server;
pub mod services;

use std::path::PathBuf;

use dashboard_db::Database;

use config::{AppConfig, SettingsManager};

/// Determine the data directory for the application.
/// Priority: GTNH_DASHBOARD_DATA_DIR env var > ~/.gtnh-dashboard
fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GTNH_DASHBOARD_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gtnh-dashboard")
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Initialize DB, migrate settings, load config.
pub fn init_foundation() -> Result<(Database, AppConfig, PathBuf), anyhow::Error> {
    load_dotenv();

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;
    let db_path = dir.join("dashboard.db");

    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    let sm = SettingsManager::new(db.clone());

    // Migrate settings from environment variables (one-time)
    if let Err(e) = sm.migrate_from_env() {
        tracing::error!("Failed to migrate from env: {e}");
    }

    // Initialize default settings
    sm.initialize_defaults()?;

    // Load runtime config
    let config = AppConfig::load(&sm)?;

    tracing::info!("Settings loaded (port={})", config.server_port);
    Ok((db, config, dir))
}
