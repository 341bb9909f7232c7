mod atomic;
pub mod dates;

pub use atomic::{atomic_write, atomic_write_json};

use std::path::PathBuf;

/// The name of the daemon's home folder
pub const DAEMON_FOLDER: &str = ".affairs";

/// Current daemon version
pub const DAEMON_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the path to the daemon's home folder (`~/.affairs`).
///
/// Falls back to a relative `.affairs` when no home directory is known.
#[must_use]
pub fn daemon_home() -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from(DAEMON_FOLDER), |home| home.join(DAEMON_FOLDER))
}
