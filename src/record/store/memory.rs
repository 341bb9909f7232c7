use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{check_revision, RecordStore, StoreError, WriteOutcome};
use crate::record::activity::ActivityEntry;
use crate::record::core::id::RecordId;
use crate::record::core::model::Record;
use crate::record::EntityType;

/// In-process store. Conditional writes take the write lock for the whole
/// check-and-set, so they are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<EntityType, BTreeMap<RecordId, Record>>>,
    activity: RwLock<Vec<ActivityEntry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, entity: EntityType, id: RecordId) -> Result<Option<Record>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(&entity).and_then(|c| c.get(&id)).cloned())
    }

    async fn scan(&self, entity: EntityType) -> Result<Vec<Record>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .get(&entity)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(&self, record: &Record) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let collection = records.entry(record.entity).or_default();
        if collection.contains_key(&record.id) {
            return Err(StoreError::Duplicate(record.id));
        }
        collection.insert(record.id, record.clone());
        Ok(())
    }

    async fn replace_if(
        &self,
        record: &Record,
        expected_revision: u64,
    ) -> Result<WriteOutcome, StoreError> {
        let mut records = self.records.write().await;
        let collection = records.entry(record.entity).or_default();
        let outcome = check_revision(collection.get(&record.id), expected_revision);
        if outcome.is_applied() {
            collection.insert(record.id, record.clone());
        }
        Ok(outcome)
    }

    async fn remove_if(
        &self,
        entity: EntityType,
        id: RecordId,
        expected_revision: u64,
    ) -> Result<WriteOutcome, StoreError> {
        let mut records = self.records.write().await;
        let collection = records.entry(entity).or_default();
        let outcome = check_revision(collection.get(&id), expected_revision);
        if outcome.is_applied() {
            collection.remove(&id);
        }
        Ok(outcome)
    }

    async fn append_activity(&self, entry: &ActivityEntry) -> Result<(), StoreError> {
        self.activity.write().await.push(entry.clone());
        Ok(())
    }

    async fn activity(&self) -> Result<Vec<ActivityEntry>, StoreError> {
        Ok(self.activity.read().await.clone())
    }

    async fn prune_activity(&self, before: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut activity = self.activity.write().await;
        let len = activity.len();
        activity.retain(|entry| entry.at >= before);
        Ok(len - activity.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::core::model::LifecycleStatus;
    use serde_json::json;

    fn record() -> Record {
        Record::new(
            EntityType::Conference,
            json!({"conferenceName": "ICML", "country": "Austria"})
                .as_object()
                .cloned()
                .unwrap(),
            "u1",
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_insert_get_and_duplicate() {
        let store = MemoryStore::new();
        let rec = record();
        store.insert(&rec).await.unwrap();
        assert_eq!(store.get(rec.entity, rec.id).await.unwrap(), Some(rec.clone()));
        assert!(matches!(
            store.insert(&rec).await,
            Err(StoreError::Duplicate(id)) if id == rec.id
        ));
        assert!(store.get(EntityType::Event, rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_if_checks_revision() {
        let store = MemoryStore::new();
        let rec = record();
        store.insert(&rec).await.unwrap();

        let mut first = rec.clone();
        first.stage_delete("");
        first.revision = 1;
        assert_eq!(store.replace_if(&first, 0).await.unwrap(), WriteOutcome::Applied);

        let mut second = rec.clone();
        second.revision = 1;
        assert_eq!(
            store.replace_if(&second, 0).await.unwrap(),
            WriteOutcome::Stale {
                revision: 1,
                status: LifecycleStatus::PendingDelete
            }
        );
    }

    #[tokio::test]
    async fn test_remove_if_missing_and_applied() {
        let store = MemoryStore::new();
        let rec = record();
        assert_eq!(
            store.remove_if(rec.entity, rec.id, 0).await.unwrap(),
            WriteOutcome::Missing
        );
        store.insert(&rec).await.unwrap();
        assert_eq!(
            store.remove_if(rec.entity, rec.id, 0).await.unwrap(),
            WriteOutcome::Applied
        );
        assert!(store.scan(rec.entity).await.unwrap().is_empty());
    }
}
