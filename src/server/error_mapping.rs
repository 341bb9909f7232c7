use crate::record::store::StoreError;
use crate::record::RecordError;

/// Maps domain errors to a stable error code and an optional tip.
pub trait ToStructuredError {
    fn error_code_and_tip(&self) -> (&str, Option<&str>);
}

// ─── RecordError ─────────────────────────────────────────────────────────────
impl ToStructuredError for RecordError {
    fn error_code_and_tip(&self) -> (&str, Option<&str>) {
        match self {
            RecordError::Validation(_) => ("VALIDATION_ERROR", None),
            RecordError::NotFound { .. } => ("RECORD_NOT_FOUND", None),
            RecordError::NothingToExport(_) => (
                "RECORD_NOT_FOUND",
                Some("Only active records are exported; resolve pending requests first"),
            ),
            RecordError::Conflict(_) => (
                "CONFLICT",
                Some("Wait for the pending request to be approved or rejected, then retry"),
            ),
            RecordError::NoPendingAction { .. } => ("NO_PENDING_ACTION", None),
            RecordError::Forbidden(_) => ("FORBIDDEN", Some("This action requires the admin role")),
            RecordError::Aggregation(_) => ("AGGREGATION_ERROR", None),
            RecordError::UnknownEntity(_) => ("UNKNOWN_ENTITY", None),
            RecordError::Store(e) => e.error_code_and_tip(),
        }
    }
}

// ─── StoreError ──────────────────────────────────────────────────────────────
impl ToStructuredError for StoreError {
    fn error_code_and_tip(&self) -> (&str, Option<&str>) {
        match self {
            StoreError::Corrupt { .. } => (
                "STORE_ERROR",
                Some("The record file is unreadable; restore it from backup or remove it"),
            ),
            StoreError::Io(_) | StoreError::Json(_) | StoreError::Duplicate(_) => {
                ("STORE_ERROR", None)
            }
        }
    }
}
