use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use super::{check_revision, RecordStore, StoreError, WriteOutcome};
use crate::record::activity::ActivityEntry;
use crate::record::core::id::RecordId;
use crate::record::core::model::Record;
use crate::record::EntityType;
use crate::utils::{atomic_write, atomic_write_json};

const RECORDS_DIR: &str = "records";
const ACTIVITY_FILE: &str = "activity.jsonl";

/// Directory-backed store.
///
/// Layout under the data directory:
///
/// ```text
/// records/<collection>/<id>.json   one document per record
/// activity.jsonl                   activity journal, one entry per line
/// ```
///
/// Documents are replaced atomically. A store-wide lock serializes every
/// write so the revision check and the replace cannot interleave.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(root.join(RECORDS_DIR)).await?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, entity: EntityType) -> PathBuf {
        self.root.join(RECORDS_DIR).join(entity.collection())
    }

    fn record_path(&self, entity: EntityType, id: RecordId) -> PathBuf {
        self.collection_dir(entity).join(id.file_name())
    }

    fn activity_path(&self) -> PathBuf {
        self.root.join(ACTIVITY_FILE)
    }

    async fn read_record(&self, path: &Path) -> Result<Option<Record>, StoreError> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    async fn read_activity(&self) -> Result<Vec<ActivityEntry>, StoreError> {
        let path = self.activity_path();
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut entries = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping unreadable activity entry"
                ),
            }
        }
        Ok(entries)
    }
}

fn is_record_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| !n.starts_with('.'))
}

#[async_trait]
impl RecordStore for FileStore {
    async fn get(&self, entity: EntityType, id: RecordId) -> Result<Option<Record>, StoreError> {
        self.read_record(&self.record_path(entity, id)).await
    }

    async fn scan(&self, entity: EntityType) -> Result<Vec<Record>, StoreError> {
        let dir = self.collection_dir(entity);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !is_record_file(&path) {
                continue;
            }
            match self.read_record(&path).await {
                Ok(Some(record)) => records.push(record),
                // removed between listing and reading
                Ok(None) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }

    async fn insert(&self, record: &Record) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.record_path(record.entity, record.id);
        if fs::try_exists(&path).await? {
            return Err(StoreError::Duplicate(record.id));
        }
        atomic_write_json(&path, record).await?;
        Ok(())
    }

    async fn replace_if(
        &self,
        record: &Record,
        expected_revision: u64,
    ) -> Result<WriteOutcome, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.record_path(record.entity, record.id);
        let current = self.read_record(&path).await?;
        let outcome = check_revision(current.as_ref(), expected_revision);
        if outcome.is_applied() {
            atomic_write_json(&path, record).await?;
        }
        Ok(outcome)
    }

    async fn remove_if(
        &self,
        entity: EntityType,
        id: RecordId,
        expected_revision: u64,
    ) -> Result<WriteOutcome, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.record_path(entity, id);
        let current = self.read_record(&path).await?;
        let outcome = check_revision(current.as_ref(), expected_revision);
        if outcome.is_applied() {
            fs::remove_file(&path).await?;
        }
        Ok(outcome)
    }

    async fn append_activity(&self, entry: &ActivityEntry) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.activity_path())
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }

    async fn activity(&self) -> Result<Vec<ActivityEntry>, StoreError> {
        self.read_activity().await
    }

    async fn prune_activity(&self, before: DateTime<Utc>) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;
        let entries = self.read_activity().await?;
        let total = entries.len();
        let kept: Vec<&ActivityEntry> = entries.iter().filter(|e| e.at >= before).collect();
        let pruned = total - kept.len();
        if pruned == 0 {
            return Ok(0);
        }

        let mut content = Vec::new();
        for entry in kept {
            content.extend(serde_json::to_vec(entry)?);
            content.push(b'\n');
        }
        atomic_write(&self.activity_path(), &content).await?;
        Ok(pruned)
    }
}
