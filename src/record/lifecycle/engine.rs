use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::outcome::{ApproveOutcome, DeleteOutcome, ExportRows, RejectOutcome, UpdateOutcome};
use crate::record::activity::{
    ActivityAction, ActivityJournal, ActivityOutcome, ActivityTarget,
};
use crate::record::core::actor::Actor;
use crate::record::core::clock::Clock;
use crate::record::core::error::RecordError;
use crate::record::core::id::RecordId;
use crate::record::core::model::{Fields, LifecycleStatus, Record};
use crate::record::expiry;
use crate::record::query::{self, ListQuery, Page};
use crate::record::schema::{validate_create, validate_patch};
use crate::record::store::{RecordStore, WriteOutcome};
use crate::record::EntityType;
use crate::utils::dates::format_date;

/// Pending-request count for one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingSummaryEntry {
    pub entity: EntityType,
    pub count: usize,
}

/// Mediates every read and write against the record collections.
///
/// Each write reads the record, decides the transition, then persists it
/// with a revision-conditional write. If the record changed in between, the
/// operation fails with [`RecordError::Conflict`] and nothing is written.
#[derive(Clone)]
pub struct LifecycleEngine {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    journal: ActivityJournal,
}

impl LifecycleEngine {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        let journal = ActivityJournal::new(store.clone(), clock.clone());
        Self {
            store,
            clock,
            journal,
        }
    }

    #[must_use]
    pub fn journal(&self) -> &ActivityJournal {
        &self.journal
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    /// Fetch one record. A malformed id is reported as not found.
    pub async fn get(&self, entity: EntityType, id: &str) -> Result<Record, RecordError> {
        let record_id =
            RecordId::parse(id).ok_or_else(|| RecordError::not_found(entity, id))?;
        self.store
            .get(entity, record_id)
            .await?
            .ok_or_else(|| RecordError::not_found(entity, id))
    }

    /// Filtered, sorted, paginated listing.
    pub async fn list(
        &self,
        entity: EntityType,
        list_query: &ListQuery,
    ) -> Result<Page<Record>, RecordError> {
        let records = self.store.scan(entity).await?;
        query::run(entity.schema(), records, list_query)
    }

    // ─── Writes ──────────────────────────────────────────────────────────

    /// Create a record. Creation is never gated.
    pub async fn create(
        &self,
        entity: EntityType,
        input: &Fields,
        actor: &Actor,
    ) -> Result<Record, RecordError> {
        let schema = entity.schema();
        let fields = validate_create(schema, input)?;
        let now = self.clock.now();
        let mut record = Record::new(entity, fields, &actor.id, now);
        expiry::apply(&mut record, schema.expiry, now);
        self.store.insert(&record).await?;

        info!(entity = %entity, id = %record.id, actor = %actor.id, "Record created");
        self.log_activity(
            actor,
            ActivityAction::Create,
            &record,
            ActivityOutcome::Applied,
            None,
        )
        .await;
        Ok(record)
    }

    /// Update a record, directly or by staging the changes for approval.
    pub async fn update(
        &self,
        entity: EntityType,
        id: &str,
        changes: &Fields,
        actor: &Actor,
    ) -> Result<UpdateOutcome, RecordError> {
        let mut record = self.get(entity, id).await?;
        ensure_active(&record, "edit")?;
        let schema = entity.schema();
        let changes = validate_patch(schema, changes)?;
        let expected = record.revision;

        if applies_directly(entity, actor) {
            record.apply_changes(&changes);
            let record = self.commit(record, expected, actor, "edit").await?;
            info!(entity = %entity, id = %record.id, actor = %actor.id, "Record updated");
            self.log_activity(actor, ActivityAction::Update, &record, ActivityOutcome::Applied, None)
                .await;
            Ok(UpdateOutcome::Applied(record))
        } else {
            record.stage_edit(changes);
            let record = self.commit(record, expected, actor, "edit").await?;
            info!(entity = %entity, id = %record.id, actor = %actor.id, "Edit staged for approval");
            self.log_activity(actor, ActivityAction::Update, &record, ActivityOutcome::Staged, None)
                .await;
            Ok(UpdateOutcome::Staged(record))
        }
    }

    /// Delete a record, directly or by flagging it for approval.
    pub async fn delete(
        &self,
        entity: EntityType,
        id: &str,
        reason: Option<String>,
        actor: &Actor,
    ) -> Result<DeleteOutcome, RecordError> {
        let mut record = self.get(entity, id).await?;
        ensure_active(&record, "delete")?;
        let expected = record.revision;
        let reason = reason.map(|r| r.trim().to_string()).unwrap_or_default();

        if applies_directly(entity, actor) {
            self.remove(&record, expected, "delete").await?;
            info!(entity = %entity, id = %record.id, actor = %actor.id, "Record deleted");
            let detail = (!reason.is_empty()).then_some(reason);
            self.log_activity(actor, ActivityAction::Delete, &record, ActivityOutcome::Deleted, detail)
                .await;
            Ok(DeleteOutcome::Deleted { id: record.id })
        } else {
            record.stage_delete(reason.clone());
            let record = self.commit(record, expected, actor, "delete").await?;
            info!(entity = %entity, id = %record.id, actor = %actor.id, "Deletion staged for approval");
            let detail = (!reason.is_empty()).then_some(reason);
            self.log_activity(actor, ActivityAction::Delete, &record, ActivityOutcome::Staged, detail)
                .await;
            Ok(DeleteOutcome::Staged(record))
        }
    }

    /// Approve a pending edit (merge) or deletion (remove). Admin only.
    pub async fn approve(
        &self,
        entity: EntityType,
        id: &str,
        actor: &Actor,
    ) -> Result<ApproveOutcome, RecordError> {
        ensure_privileged(actor, "approve requests")?;
        let mut record = self.get(entity, id).await?;
        let expected = record.revision;

        match record.status {
            LifecycleStatus::PendingEdit => {
                let changes = record.pending_changes.take().unwrap_or_default();
                record.apply_changes(&changes);
                let record = self.commit(record, expected, actor, "approve").await?;
                info!(entity = %entity, id = %record.id, actor = %actor.id, "Edit approved");
                self.log_activity(actor, ActivityAction::Approve, &record, ActivityOutcome::Applied, None)
                    .await;
                Ok(ApproveOutcome::Applied(record))
            }
            LifecycleStatus::PendingDelete => {
                self.remove(&record, expected, "approve").await?;
                info!(entity = %entity, id = %record.id, actor = %actor.id, "Deletion approved");
                self.log_activity(actor, ActivityAction::Approve, &record, ActivityOutcome::Deleted, None)
                    .await;
                Ok(ApproveOutcome::Deleted { id: record.id })
            }
            LifecycleStatus::Active => Err(RecordError::NoPendingAction {
                action: "approve",
                id: record.id.to_string(),
            }),
        }
    }

    /// Reject a pending request and restore the record. Admin only.
    pub async fn reject(
        &self,
        entity: EntityType,
        id: &str,
        reason: Option<String>,
        actor: &Actor,
    ) -> Result<RejectOutcome, RecordError> {
        ensure_privileged(actor, "reject requests")?;
        let mut record = self.get(entity, id).await?;
        if !record.status.is_pending() {
            return Err(RecordError::NoPendingAction {
                action: "reject",
                id: record.id.to_string(),
            });
        }
        let expected = record.revision;
        let rejected = record.status;

        record.restore_active();
        let record = self.commit(record, expected, actor, "reject").await?;
        info!(
            entity = %entity,
            id = %record.id,
            actor = %actor.id,
            rejected = %rejected,
            "Request rejected"
        );
        let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        self.log_activity(
            actor,
            ActivityAction::Reject,
            &record,
            ActivityOutcome::Restored,
            reason.clone(),
        )
        .await;
        Ok(RejectOutcome { record, reason })
    }

    // ─── Approval queue ──────────────────────────────────────────────────

    /// Number of records awaiting approval in a module. Admin only.
    pub async fn pending_count(
        &self,
        entity: EntityType,
        actor: &Actor,
    ) -> Result<usize, RecordError> {
        Ok(self.pending(entity, actor).await?.len())
    }

    /// Records awaiting approval in a module, most recently requested first. Admin only.
    pub async fn pending(
        &self,
        entity: EntityType,
        actor: &Actor,
    ) -> Result<Vec<Record>, RecordError> {
        ensure_privileged(actor, "view pending requests")?;
        let mut records: Vec<Record> = self
            .store
            .scan(entity)
            .await?
            .into_iter()
            .filter(|r| r.status.is_pending())
            .collect();
        sort_newest_update_first(&mut records);
        Ok(records)
    }

    /// Pending counts for every module. Admin only.
    pub async fn pending_summary(
        &self,
        actor: &Actor,
    ) -> Result<Vec<PendingSummaryEntry>, RecordError> {
        ensure_privileged(actor, "view pending requests")?;
        let mut summary = Vec::with_capacity(EntityType::ALL.len());
        for entity in EntityType::ALL {
            let count = self
                .store
                .scan(entity)
                .await?
                .iter()
                .filter(|r| r.status.is_pending())
                .count();
            summary.push(PendingSummaryEntry { entity, count });
        }
        Ok(summary)
    }

    /// Pending requests across all modules last touched by `actor`.
    pub async fn my_requests(&self, actor: &Actor) -> Result<Vec<Record>, RecordError> {
        let mut mine = Vec::new();
        for entity in EntityType::ALL {
            mine.extend(self.store.scan(entity).await?.into_iter().filter(|r| {
                r.status.is_pending() && r.updated_by.as_deref() == Some(actor.id.as_str())
            }));
        }
        sort_newest_update_first(&mut mine);
        Ok(mine)
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Domain-field rows of every active record, newest first, without
    /// workflow fields.
    pub async fn export(
        &self,
        entity: EntityType,
        actor: &Actor,
    ) -> Result<ExportRows, RecordError> {
        let tracks_status = entity.schema().expiry.tracks_status();
        let mut records: Vec<Record> = self
            .store
            .scan(entity)
            .await?
            .into_iter()
            .filter(|r| r.status == LifecycleStatus::Active)
            .collect();
        if records.is_empty() {
            return Err(RecordError::NothingToExport(entity));
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        let rows: Vec<Fields> = records
            .into_iter()
            .map(|record| {
                let record_status = record.effective_record_status();
                let mut row = Fields::new();
                row.insert("id".into(), record.id.to_string().into());
                row.extend(record.fields);
                if tracks_status {
                    row.insert("recordStatus".into(), record_status.as_str().into());
                }
                row.insert("createdAt".into(), format_date(record.created_at).into());
                row.insert("updatedAt".into(), format_date(record.updated_at).into());
                row
            })
            .collect();

        info!(entity = %entity, rows = rows.len(), actor = %actor.id, "Records exported");
        self.journal
            .record(
                actor,
                ActivityAction::Export,
                entity,
                ActivityTarget::default(),
                ActivityOutcome::Exported,
                Some(format!("{} rows", rows.len())),
            )
            .await;
        Ok(ExportRows { entity, rows })
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Stamp, re-evaluate expiry, and write conditionally on `expected`.
    async fn commit(
        &self,
        mut record: Record,
        expected: u64,
        actor: &Actor,
        verb: &str,
    ) -> Result<Record, RecordError> {
        let now = self.clock.now();
        record.touch(&actor.id, now);
        let rule = record.entity.schema().expiry;
        expiry::apply(&mut record, rule, now);
        match self.store.replace_if(&record, expected).await? {
            WriteOutcome::Applied => Ok(record),
            outcome => Err(lost_race(&record, outcome, verb)),
        }
    }

    async fn remove(&self, record: &Record, expected: u64, verb: &str) -> Result<(), RecordError> {
        match self.store.remove_if(record.entity, record.id, expected).await? {
            WriteOutcome::Applied => Ok(()),
            outcome => Err(lost_race(record, outcome, verb)),
        }
    }

    async fn log_activity(
        &self,
        actor: &Actor,
        action: ActivityAction,
        record: &Record,
        outcome: ActivityOutcome,
        detail: Option<String>,
    ) {
        let label = record.entity.schema().label(&record.fields);
        self.journal
            .record(
                actor,
                action,
                record.entity,
                ActivityTarget::record(record.id, label),
                outcome,
                detail,
            )
            .await;
    }
}

fn applies_directly(entity: EntityType, actor: &Actor) -> bool {
    actor.is_privileged() || !entity.schema().approval_gated
}

fn ensure_active(record: &Record, verb: &str) -> Result<(), RecordError> {
    if record.status.is_pending() {
        warn!(
            entity = %record.entity,
            id = %record.id,
            status = %record.status,
            "Rejected {verb} of a record with pending changes"
        );
        return Err(RecordError::Conflict(format!(
            "Cannot {verb} a record that has pending changes"
        )));
    }
    Ok(())
}

fn ensure_privileged(actor: &Actor, what: &str) -> Result<(), RecordError> {
    if actor.is_privileged() {
        Ok(())
    } else {
        warn!(actor = %actor.id, role = %actor.role, "Unprivileged attempt to {what}");
        Err(RecordError::forbidden(format!("Only admins can {what}")))
    }
}

fn lost_race(record: &Record, outcome: WriteOutcome, verb: &str) -> RecordError {
    match outcome {
        WriteOutcome::Missing => RecordError::not_found(record.entity, record.id.to_string()),
        WriteOutcome::Stale { status, .. } if status.is_pending() && matches!(verb, "edit" | "delete") => {
            warn!(entity = %record.entity, id = %record.id, "Concurrent request made the record pending");
            RecordError::Conflict(format!("Cannot {verb} a record that has pending changes"))
        }
        WriteOutcome::Stale { .. } | WriteOutcome::Applied => {
            warn!(entity = %record.entity, id = %record.id, "Record changed during {verb}");
            RecordError::Conflict(format!(
                "Record was modified by another request during {verb}; reload and try again"
            ))
        }
    }
}

fn sort_newest_update_first(records: &mut [Record]) {
    records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::core::clock::FixedClock;
    use crate::record::core::model::RecordStatus;
    use crate::record::store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn engine() -> LifecycleEngine {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        LifecycleEngine::new(Arc::new(MemoryStore::new()), Arc::new(clock))
    }

    #[tokio::test]
    async fn test_create_sets_audit_and_record_status() {
        let engine = engine();
        let rec = engine
            .create(
                EntityType::Membership,
                &fields(json!({"name": "ACU", "startDate": "2023-01-01", "endDate": "2023-12-31"})),
                &Actor::employee("e1"),
            )
            .await
            .unwrap();
        assert_eq!(rec.status, LifecycleStatus::Active);
        assert_eq!(rec.created_by.as_deref(), Some("e1"));
        assert_eq!(rec.record_status, Some(RecordStatus::Expired));
    }

    #[tokio::test]
    async fn test_get_with_malformed_id_is_not_found() {
        let engine = engine();
        let err = engine.get(EntityType::Partner, "nope").await.unwrap_err();
        assert!(matches!(err, RecordError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_conflict_checked_before_validation() {
        let engine = engine();
        let user = Actor::employee("e1");
        let rec = engine
            .create(EntityType::Partner, &fields(json!({"university": "X", "country": "Y"})), &user)
            .await
            .unwrap();
        let id = rec.id.to_string();
        engine
            .delete(EntityType::Partner, &id, None, &user)
            .await
            .unwrap();

        let err = engine
            .update(EntityType::Partner, &id, &Fields::new(), &user)
            .await
            .unwrap_err();
        assert!(matches!(err, RecordError::Conflict(msg) if msg.contains("pending changes")));
    }

    #[tokio::test]
    async fn test_staged_delete_keeps_empty_reason() {
        let engine = engine();
        let user = Actor::employee("e1");
        let rec = engine
            .create(EntityType::Partner, &fields(json!({"university": "X", "country": "Y"})), &user)
            .await
            .unwrap();
        let outcome = engine
            .delete(EntityType::Partner, &rec.id.to_string(), None, &user)
            .await
            .unwrap();
        let DeleteOutcome::Staged(staged) = outcome else {
            panic!("expected staged delete");
        };
        assert_eq!(staged.deletion_reason.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_export_strips_workflow_fields() {
        let engine = engine();
        let admin = Actor::admin("a1");
        engine
            .create(EntityType::Partner, &fields(json!({"university": "X", "country": "Y"})), &admin)
            .await
            .unwrap();
        let export = engine.export(EntityType::Partner, &admin).await.unwrap();
        assert_eq!(export.rows.len(), 1);
        let row = &export.rows[0];
        assert_eq!(row["university"], "X");
        assert_eq!(row["recordStatus"], "active");
        assert!(row.get("status").is_none());
        assert!(row.get("createdBy").is_none());
    }

    #[tokio::test]
    async fn test_export_empty_collection() {
        let engine = engine();
        let err = engine
            .export(EntityType::Conference, &Actor::admin("a1"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecordError::NothingToExport(EntityType::Conference)));
    }
}
