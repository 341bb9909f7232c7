//! Approval-workflow engine shared by every module.
//!
//! ```text
//!         create
//! (none) -------> active
//!                   |  update (unprivileged) --> pending_edit
//!                   |  delete (unprivileged) --> pending_delete
//! pending_edit   --approve--> active (changes merged)
//! pending_edit   --reject---> active (changes discarded)
//! pending_delete --approve--> deleted
//! pending_delete --reject---> active
//! ```
//!
//! Privileged actors, and modules without approval gating, skip the
//! pending states entirely.

mod engine;
mod outcome;

pub use engine::{LifecycleEngine, PendingSummaryEntry};
pub use outcome::{ApproveOutcome, DeleteOutcome, ExportRows, RejectOutcome, UpdateOutcome};
