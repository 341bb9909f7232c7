use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::record::stats::StatsLimits;
use crate::utils::daemon_home;

/// Default expiry sweep period.
fn default_sweep_interval() -> String {
    "1h".to_string()
}

/// Default activity retention in days.
fn default_retention_days() -> u32 {
    90
}

fn default_true() -> bool {
    true
}

/// Which [`RecordStore`](crate::record::RecordStore) backs the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON documents on disk.
    #[default]
    File,
    /// Process memory; lost on exit.
    Memory,
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Defaults to `~/.affairs/data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    #[must_use]
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| daemon_home().join("data"))
    }
}

/// `[expiry]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpiryConfig {
    /// Run the background reconciliation sweep.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Humantime duration, e.g. `30m` or `1h`.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: String,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_interval: default_sweep_interval(),
        }
    }
}

/// `[activity]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivityConfig {
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
        }
    }
}

/// Daemon configuration, deserialized from `~/.affairs/config.toml`.
///
/// Every section is optional; missing values resolve to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub expiry: ExpiryConfig,
    #[serde(default)]
    pub stats: StatsLimits,
    #[serde(default)]
    pub activity: ActivityConfig,
}
