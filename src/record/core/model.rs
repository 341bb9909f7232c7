//! The stored record and its state transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::RecordId;
use crate::record::EntityType;

/// Module-specific field map.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Approval-workflow state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    #[default]
    Active,
    PendingEdit,
    PendingDelete,
}

impl LifecycleStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleStatus::Active => "active",
            LifecycleStatus::PendingEdit => "pending_edit",
            LifecycleStatus::PendingDelete => "pending_delete",
        }
    }

    #[must_use]
    pub fn is_pending(self) -> bool {
        !matches!(self, LifecycleStatus::Active)
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LifecycleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "active" => Ok(LifecycleStatus::Active),
            "pending_edit" => Ok(LifecycleStatus::PendingEdit),
            "pending_delete" => Ok(LifecycleStatus::PendingDelete),
            other => Err(format!("Invalid lifecycle status: {other}")),
        }
    }
}

/// Time-validity state, derived from a module's terminal date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Active,
    Expired,
}

impl RecordStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(RecordStatus::Active),
            "expired" => Ok(RecordStatus::Expired),
            other => Err(format!("Invalid record status: {other}")),
        }
    }
}

/// A record of any module.
///
/// `pending_changes` is present only while `status` is
/// [`LifecycleStatus::PendingEdit`], and `deletion_reason` only while it is
/// [`LifecycleStatus::PendingDelete`]. The transition methods below keep
/// those pairs consistent; `revision` is bumped by the engine on every
/// persisted write and used for compare-and-swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub entity: EntityType,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default)]
    pub status: LifecycleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_changes: Option<Fields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_status: Option<RecordStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub revision: u64,
}

impl Record {
    /// Build a new active record owned by `actor_id`.
    #[must_use]
    pub fn new(entity: EntityType, fields: Fields, actor_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::new(),
            entity,
            fields,
            status: LifecycleStatus::Active,
            pending_changes: None,
            deletion_reason: None,
            record_status: None,
            created_by: Some(actor_id.to_string()),
            updated_by: Some(actor_id.to_string()),
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    /// String value of a field, `None` when absent, null or blank.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Numeric value of a field. Numeric strings are accepted.
    #[must_use]
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.fields.get(field)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Date value of a field.
    #[must_use]
    pub fn date(&self, field: &str) -> Option<DateTime<Utc>> {
        self.fields
            .get(field)
            .and_then(crate::utils::dates::parse_date)
    }

    /// Stage an edit for approval. Fields stay untouched.
    pub fn stage_edit(&mut self, changes: Fields) {
        self.status = LifecycleStatus::PendingEdit;
        self.pending_changes = Some(changes);
        self.deletion_reason = None;
    }

    /// Stage a deletion for approval. An empty reason is kept as an empty string.
    pub fn stage_delete(&mut self, reason: impl Into<String>) {
        self.status = LifecycleStatus::PendingDelete;
        self.pending_changes = None;
        self.deletion_reason = Some(reason.into());
    }

    /// Merge `changes` into the fields and return to active.
    ///
    /// Merge follows JSON merge-patch: a `null` value removes the key.
    pub fn apply_changes(&mut self, changes: &Fields) {
        let mut doc = serde_json::Value::Object(std::mem::take(&mut self.fields));
        json_patch::merge(&mut doc, &serde_json::Value::Object(changes.clone()));
        if let serde_json::Value::Object(map) = doc {
            self.fields = map;
        }
        self.restore_active();
    }

    /// Discard any pending request and return to active.
    pub fn restore_active(&mut self) {
        self.status = LifecycleStatus::Active;
        self.pending_changes = None;
        self.deletion_reason = None;
    }

    /// Record a write by `actor_id` at `now`.
    pub fn touch(&mut self, actor_id: &str, now: DateTime<Utc>) {
        self.updated_by = Some(actor_id.to_string());
        self.updated_at = now;
        self.revision += 1;
    }

    /// Record status with the implicit default applied.
    #[must_use]
    pub fn effective_record_status(&self) -> RecordStatus {
        self.record_status.unwrap_or_default()
    }
}
