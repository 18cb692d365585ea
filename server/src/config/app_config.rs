//! Runtime application configuration loaded from DB + environment overrides.

use super::manager::SettingsManager;

/// Runtime configuration populated from the settings DB.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub bind_address: String,
    pub sync_broadcast: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 8080,
            bind_address: "0.0.0.0".into(),
            sync_broadcast: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the settings manager (DB-first, env overrides).
    pub fn load(sm: &SettingsManager) -> Result<Self, anyhow::Error> {
        let g = |key: &str| -> String { sm.get_setting(key).unwrap_or_default() };

        let mut server_port = parse_u16(&g("SERVER_PORT"), 8080);
        let mut bind_address = {
            let a = g("BIND_ADDRESS");
            if a.is_empty() { "0.0.0.0".into() } else { a }
        };

        // Environment variable overrides
        if let Ok(v) = std::env::var("SERVER_PORT") {
            if let Ok(p) = v.parse::<u16>() {
                server_port = p;
            }
        }
        if let Ok(v) = std::env::var("BIND_ADDRESS") {
            if !v.is_empty() {
                bind_address = v;
            }
        }

        let sync_broadcast = std::env::var("SYNC_BROADCAST")
            .map(|v| v == "true")
            .unwrap_or_else(|_| g("SYNC_BROADCAST") != "false");

        Ok(Self {
            server_port,
            bind_address,
            sync_broadcast,
        })
    }

    /// Reload config from the settings manager.
    pub fn reload(&mut self, sm: &SettingsManager) -> Result<(), anyhow::Error> {
        *self = Self::load(sm)?;
        Ok(())
    }
}

fn parse_u16(s: &str, default: u16) -> u16 {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}
