use crate::record::core::id::RecordId;
use crate::record::core::model::{Fields, Record};
use crate::record::EntityType;

/// Result of an update request.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// Changes were merged immediately.
    Applied(Record),
    /// Changes were stored as pending and await approval.
    Staged(Record),
}

impl UpdateOutcome {
    #[must_use]
    pub fn record(&self) -> &Record {
        match self {
            UpdateOutcome::Applied(r) | UpdateOutcome::Staged(r) => r,
        }
    }

    #[must_use]
    pub fn into_record(self) -> Record {
        match self {
            UpdateOutcome::Applied(r) | UpdateOutcome::Staged(r) => r,
        }
    }

    #[must_use]
    pub fn is_staged(&self) -> bool {
        matches!(self, UpdateOutcome::Staged(_))
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            UpdateOutcome::Applied(_) => "Record updated successfully",
            UpdateOutcome::Staged(_) => "Edit request submitted for approval",
        }
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The record is gone.
    Deleted { id: RecordId },
    /// The record is flagged for deletion and awaits approval.
    Staged(Record),
}

impl DeleteOutcome {
    #[must_use]
    pub fn is_staged(&self) -> bool {
        matches!(self, DeleteOutcome::Staged(_))
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            DeleteOutcome::Deleted { .. } => "Record deleted successfully",
            DeleteOutcome::Staged(_) => "Delete request submitted for approval",
        }
    }
}

/// Result of approving a pending request.
#[derive(Debug, Clone, PartialEq)]
pub enum ApproveOutcome {
    /// A pending edit was merged.
    Applied(Record),
    /// A pending deletion was carried out.
    Deleted { id: RecordId },
}

impl ApproveOutcome {
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            ApproveOutcome::Applied(_) => "Edit approved and applied",
            ApproveOutcome::Deleted { .. } => "Deletion approved and completed",
        }
    }
}

/// Result of rejecting a pending request.
///
/// The reason travels back to the caller and into the activity journal; it
/// is not stored on the record.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectOutcome {
    pub record: Record,
    pub reason: Option<String>,
}

impl RejectOutcome {
    #[must_use]
    pub fn message(&self) -> &'static str {
        "Request rejected and record restored"
    }
}

/// Export payload: domain-field rows of active records.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRows {
    pub entity: EntityType,
    pub rows: Vec<Fields>,
}

impl ExportRows {
    /// File name a formatter should offer, e.g. `partners-2024-06-01.csv`.
    #[must_use]
    pub fn suggested_filename(&self, date: chrono::NaiveDate, extension: &str) -> String {
        format!("{}-{}.{extension}", self.entity.collection(), date.format("%Y-%m-%d"))
    }
}
