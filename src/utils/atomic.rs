//! Crash-safe document writes.
//!
//! Record documents are replaced through a temp file in the same directory
//! followed by a rename, so a reader sees either the old or the new
//! document and never a torn one.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Replace `path` with `content` atomically.
///
/// The parent directory is created when missing. The temp file is removed
/// automatically if any step fails.
///
/// # Errors
///
/// Returns an `io::Error` if the path has no parent, the directory cannot
/// be created, or the write or rename fails.
pub async fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = parent_dir(path)?;
    tokio::fs::create_dir_all(&parent).await?;

    let target = path.to_path_buf();
    let bytes = content.to_vec();

    tokio::task::spawn_blocking(move || -> io::Result<()> {
        use std::io::Write;

        let mut temp_file = NamedTempFile::new_in(&parent)?;
        temp_file.write_all(&bytes)?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(&target)?;
        Ok(())
    })
    .await
    .map_err(io::Error::other)?
}

/// Serialize `value` as pretty JSON and write it atomically.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or the write fails.
pub async fn atomic_write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
    bytes.push(b'\n');
    atomic_write(path, &bytes).await
}

fn parent_dir(path: &Path) -> io::Result<PathBuf> {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no parent directory"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_atomic_write_creates_parent_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("records").join("partners").join("a.json");

        atomic_write(&file_path, br#"{"key": "value"}"#).await.unwrap();

        let content = std::fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, r#"{"key": "value"}"#);
    }

    #[tokio::test]
    async fn test_atomic_write_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("doc.json");
        std::fs::write(&file_path, "initial").unwrap();

        atomic_write(&file_path, b"updated").await.unwrap();

        assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "updated");
        let count = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(count, 1, "no temp files should be left behind");
    }

    #[tokio::test]
    async fn test_atomic_write_json_is_pretty() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("doc.json");

        atomic_write_json(&file_path, &serde_json::json!({"a": 1}))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&file_path).unwrap();
        assert!(content.contains("\n"));
        let back: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(back["a"], 1);
    }

    #[tokio::test]
    async fn test_atomic_write_rejects_bare_file_name() {
        let result = atomic_write(Path::new("doc.json"), b"x").await;
        assert!(result.is_err());
    }
}
