//! Tracing subscriber setup for the daemon.

mod init;
pub use init::{init_logging, parse_rotation};

use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::Level;
use tracing_appender::rolling::Rotation;

use crate::utils::daemon_home;

/// Log filename used by the daemon.
pub const LOG_FILENAME: &str = "affairs-daemon.log";

/// Target prefix the default filter applies to.
pub(crate) const LOG_TARGET: &str = "affairs_daemon";

/// Global log file path, set once at startup.
static LOG_FILE_PATH: OnceLock<String> = OnceLock::new();

/// Store the log file path so structured errors can point at it.
pub fn set_log_file_path(path: String) {
    let _ = LOG_FILE_PATH.set(path);
}

/// Log file path set at startup, empty before then.
#[must_use]
pub fn get_log_file_path() -> &'static str {
    LOG_FILE_PATH.get().map_or("", String::as_str)
}

/// Default log directory: `~/.affairs/logs`.
#[must_use]
pub fn default_log_dir() -> PathBuf {
    daemon_home().join("logs")
}

/// Configuration for the logging system.
pub struct LogConfig {
    pub log_dir: PathBuf,
    pub log_level: Level,
    pub json_format: bool,
    pub rotation: Rotation,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            log_level: Level::INFO,
            json_format: false,
            rotation: Rotation::DAILY,
        }
    }
}

#[cfg(test)]
#[path = "../logging_tests.rs"]
mod logging_tests;
