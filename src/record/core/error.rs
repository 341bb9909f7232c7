//! Unified error type for record operations.

use thiserror::Error;

use crate::record::store::StoreError;
use crate::record::EntityType;

/// Error type for lifecycle, query and statistics operations.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} record not found: {id}")]
    NotFound { entity: EntityType, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error("No pending action to {action} on record {id}")]
    NoPendingAction { action: &'static str, id: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("No active {0} records to export")]
    NothingToExport(EntityType),

    #[error("Statistics aggregation failed: {0}")]
    Aggregation(String),

    #[error("Unknown entity type: {0}")]
    UnknownEntity(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl RecordError {
    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        RecordError::Validation(msg.into())
    }

    /// Create a not found error
    #[must_use]
    pub fn not_found(entity: EntityType, id: impl Into<String>) -> Self {
        RecordError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create a forbidden error
    #[must_use]
    pub fn forbidden(msg: impl Into<String>) -> Self {
        RecordError::Forbidden(msg.into())
    }

    /// Whether the caller may retry once the record's pending request is resolved.
    #[must_use]
    pub fn is_state_conflict(&self) -> bool {
        matches!(
            self,
            RecordError::Conflict(_) | RecordError::NoPendingAction { .. }
        )
    }
}
