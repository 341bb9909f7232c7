//! Derived `recordStatus` for date-bounded modules.
//!
//! [`evaluate`] is the pure rule, [`apply`] runs it on every write, and
//! [`reconcile`] catches records whose terminal date passed without a write.

mod evaluator;
mod sweep;

pub use evaluator::{apply, evaluate, terminal_date};
pub use sweep::{reconcile, spawn_sweeper, SweepEntry, SweepReport, SweepSettings};
