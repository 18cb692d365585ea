//! SettingsManager: DB-backed settings with defaults and env migration.

use dashboard_db::Database;

use super::defaults::DEFAULT_SETTINGS;
use super::validation::validate_setting;

/// Wraps [`Database`] to provide high-level settings operations.
pub struct SettingsManager {
    db: Database,
}

impl SettingsManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get a setting value. Falls back to default if not in DB.
    pub fn get_setting(&self, key: &str) -> Result<String, anyhow::Error> {
        if let Some(val) = self.db.get_setting(key)? {
            return Ok(val);
        }
        if let Some(def) = DEFAULT_SETTINGS.get(key) {
            return Ok(def.default.to_string());
        }
        anyhow::bail!("setting not found: {key}");
    }

    /// Set a setting value with validation.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        if !DEFAULT_SETTINGS.contains_key(key) {
            anyhow::bail!("unknown setting key: {key}");
        }
        validate_setting(key, value)
            .map_err(|e| anyhow::anyhow!("validation error for {key}: {e}"))?;
        self.db.set_setting(key, value, "normal")?;
        Ok(())
    }

    /// Write defaults for any key missing from the DB.
    pub fn initialize_defaults(&self) -> Result<(), anyhow::Error> {
        for def in DEFAULT_SETTINGS.values() {
            if self.db.get_setting(def.key)?.is_none() {
                self.db.set_setting(def.key, def.default, "normal")?;
            }
        }
        Ok(())
    }

    /// Copy known settings from environment variables into the DB when the
    /// DB has no value yet. Lets a fresh deployment be configured entirely
    /// through the environment.
    pub fn migrate_from_env(&self) -> Result<(), anyhow::Error> {
        for def in DEFAULT_SETTINGS.values() {
            let Ok(value) = std::env::var(def.key) else {
                continue;
            };
            if self.db.get_setting(def.key)?.is_some() {
                continue;
            }
            if let Err(e) = self.set_setting(def.key, &value) {
                tracing::warn!("Ignoring invalid env setting {}: {e}", def.key);
            } else {
                tracing::info!("Imported setting {} from environment", def.key);
            }
        }
        Ok(())
    }
}
