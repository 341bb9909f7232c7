//! Activity journal: an append-only audit trail of record operations.
//!
//! Journal writes never fail the operation being journaled; a failed append
//! is logged and dropped.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use super::core::actor::{Actor, Role};
use super::core::clock::Clock;
use super::core::error::RecordError;
use super::store::RecordStore;
use super::EntityType;

/// Operation that produced a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    Approve,
    Reject,
    Export,
}

impl ActivityAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityAction::Create => "create",
            ActivityAction::Update => "update",
            ActivityAction::Delete => "delete",
            ActivityAction::Approve => "approve",
            ActivityAction::Reject => "reject",
            ActivityAction::Export => "export",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityAction {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(ActivityAction::Create),
            "update" => Ok(ActivityAction::Update),
            "delete" => Ok(ActivityAction::Delete),
            "approve" => Ok(ActivityAction::Approve),
            "reject" => Ok(ActivityAction::Reject),
            "export" => Ok(ActivityAction::Export),
            other => Err(RecordError::validation(format!(
                "Unknown activity action: {other}"
            ))),
        }
    }
}

/// What the operation did to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityOutcome {
    Applied,
    Staged,
    Deleted,
    Restored,
    Exported,
}

impl ActivityOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityOutcome::Applied => "applied",
            ActivityOutcome::Staged => "staged",
            ActivityOutcome::Deleted => "deleted",
            ActivityOutcome::Restored => "restored",
            ActivityOutcome::Exported => "exported",
        }
    }
}

/// One journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: String,
    pub actor_id: String,
    pub actor_role: Role,
    pub action: ActivityAction,
    pub entity: EntityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_label: Option<String>,
    pub outcome: ActivityOutcome,
    /// Deletion or rejection reason, or export row count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub at: DateTime<Utc>,
}

/// Target of a journaled operation.
#[derive(Debug, Clone, Default)]
pub struct ActivityTarget {
    pub id: Option<String>,
    pub label: Option<String>,
}

impl ActivityTarget {
    #[must_use]
    pub fn record(id: impl fmt::Display, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id: Some(id.to_string()),
            label: (!label.is_empty()).then_some(label),
        }
    }
}

/// Filters for listing the journal.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub entity: Option<EntityType>,
    pub actor_id: Option<String>,
    pub action: Option<ActivityAction>,
    pub limit: Option<usize>,
}

impl ActivityFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entity(mut self, entity: EntityType) -> Self {
        self.entity = Some(entity);
        self
    }

    #[must_use]
    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: ActivityAction) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, entry: &ActivityEntry) -> bool {
        self.entity.is_none_or(|e| e == entry.entity)
            && self.actor_id.as_deref().is_none_or(|a| a == entry.actor_id)
            && self.action.is_none_or(|a| a == entry.action)
    }
}

/// Default number of entries returned by a listing.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 100;

/// Writes and reads the activity journal.
#[derive(Clone)]
pub struct ActivityJournal {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl ActivityJournal {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Append an entry. Failures are logged, never returned.
    pub async fn record(
        &self,
        actor: &Actor,
        action: ActivityAction,
        entity: EntityType,
        target: ActivityTarget,
        outcome: ActivityOutcome,
        detail: Option<String>,
    ) {
        let entry = ActivityEntry {
            id: uuid::Uuid::new_v4().to_string(),
            actor_id: actor.id.clone(),
            actor_role: actor.role,
            action,
            entity,
            target_id: target.id,
            target_label: target.label,
            outcome,
            detail,
            at: self.clock.now(),
        };
        if let Err(e) = self.store.append_activity(&entry).await {
            warn!(
                action = %action,
                entity = %entity,
                error = %e,
                "Failed to append activity entry"
            );
        }
    }

    /// List entries newest first. Admin only.
    pub async fn list(
        &self,
        actor: &Actor,
        filter: &ActivityFilter,
    ) -> Result<Vec<ActivityEntry>, RecordError> {
        if !actor.is_privileged() {
            return Err(RecordError::forbidden("Only admins can view the activity log"));
        }
        let limit = filter.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
        let mut entries: Vec<ActivityEntry> = self
            .store
            .activity()
            .await?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        entries.sort_by(|a, b| b.at.cmp(&a.at));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Drop entries older than `retention_days` before `now`.
    pub async fn prune(&self, retention_days: u32, now: DateTime<Utc>) -> Result<usize, RecordError> {
        let cutoff = now - Duration::days(i64::from(retention_days));
        let pruned = self.store.prune_activity(cutoff).await?;
        if pruned > 0 {
            debug!(pruned, %cutoff, "Pruned activity journal");
        }
        Ok(pruned)
    }
}
