//! Persistence seam for records and the activity journal.
//!
//! Writes that follow a read are conditional on the record's `revision`:
//! the store applies them only if nobody else wrote the record in between.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

use super::activity::ActivityEntry;
use super::core::id::RecordId;
use super::core::model::{LifecycleStatus, Record};
use super::EntityType;

/// Error type for store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt document at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Record already exists: {0}")]
    Duplicate(RecordId),
}

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// The record no longer exists.
    Missing,
    /// The record was written by someone else since it was read.
    Stale {
        revision: u64,
        status: LifecycleStatus,
    },
}

impl WriteOutcome {
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, WriteOutcome::Applied)
    }
}

/// Document store holding one collection per module.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a record by id.
    async fn get(&self, entity: EntityType, id: RecordId) -> Result<Option<Record>, StoreError>;

    /// Every record of a module, in no particular order.
    async fn scan(&self, entity: EntityType) -> Result<Vec<Record>, StoreError>;

    /// Insert a new record. Fails with [`StoreError::Duplicate`] if the id is taken.
    async fn insert(&self, record: &Record) -> Result<(), StoreError>;

    /// Replace a record if its stored revision is still `expected_revision`.
    async fn replace_if(
        &self,
        record: &Record,
        expected_revision: u64,
    ) -> Result<WriteOutcome, StoreError>;

    /// Remove a record if its stored revision is still `expected_revision`.
    async fn remove_if(
        &self,
        entity: EntityType,
        id: RecordId,
        expected_revision: u64,
    ) -> Result<WriteOutcome, StoreError>;

    /// Append an entry to the activity journal.
    async fn append_activity(&self, entry: &ActivityEntry) -> Result<(), StoreError>;

    /// All journal entries in insertion order.
    async fn activity(&self) -> Result<Vec<ActivityEntry>, StoreError>;

    /// Drop journal entries recorded before `before`. Returns how many were dropped.
    async fn prune_activity(&self, before: DateTime<Utc>) -> Result<usize, StoreError>;
}

/// Decide a conditional write against the currently stored record.
pub(crate) fn check_revision(current: Option<&Record>, expected_revision: u64) -> WriteOutcome {
    match current {
        None => WriteOutcome::Missing,
        Some(stored) if stored.revision == expected_revision => WriteOutcome::Applied,
        Some(stored) => WriteOutcome::Stale {
            revision: stored.revision,
            status: stored.status,
        },
    }
}
