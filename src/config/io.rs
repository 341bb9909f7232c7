use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::types::DaemonConfig;
use super::ConfigError;
use crate::record::expiry::SweepSettings;
use crate::utils::daemon_home;

/// Default config file location: `~/.affairs/config.toml`.
#[must_use]
pub fn default_config_path() -> PathBuf {
    daemon_home().join("config.toml")
}

/// Load the daemon configuration.
///
/// An explicit `path` must exist. Without one, `~/.affairs/config.toml` is
/// read when present and defaults are used otherwise.
pub fn load_config(path: Option<&Path>) -> Result<DaemonConfig, ConfigError> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (default_config_path(), false),
    };

    if !required && !path.exists() {
        debug!("Config not found at {}; using defaults", path.display());
        return Ok(DaemonConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config = parse_config(&content)?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse and validate TOML config text.
pub fn parse_config(content: &str) -> Result<DaemonConfig, ConfigError> {
    let config: DaemonConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

impl DaemonConfig {
    /// Check values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sweep_interval()?;
        let stats = &self.stats;
        if stats.distribution_limit == 0 || stats.list_limit == 0 || stats.trend_months == 0 {
            return Err(ConfigError::invalid("[stats] limits must be at least 1"));
        }
        Ok(())
    }

    /// Parsed `expiry.sweep_interval`.
    pub fn sweep_interval(&self) -> Result<Duration, ConfigError> {
        let raw = self.expiry.sweep_interval.trim();
        let interval = humantime::parse_duration(raw).map_err(|e| {
            ConfigError::invalid(format!("expiry.sweep_interval '{raw}': {e}"))
        })?;
        if interval.is_zero() {
            return Err(ConfigError::invalid("expiry.sweep_interval must be positive"));
        }
        Ok(interval)
    }

    /// Background sweeper settings.
    pub fn sweep_settings(&self) -> Result<SweepSettings, ConfigError> {
        Ok(SweepSettings {
            interval: self.sweep_interval()?,
            activity_retention_days: self.activity.retention_days,
        })
    }
}
