// Allow panic/unwrap/expect in tests (denied globally via Cargo.toml lints)
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        clippy::indexing_slicing
    )
)]

pub mod config;
pub mod cors;
pub mod grpc_logging;
pub mod logging;
pub mod metrics;
pub mod record;
pub mod server;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, ConfigError, DaemonConfig, StorageBackend};
pub use record::activity::{ActivityEntry, ActivityFilter, ActivityJournal};
pub use record::expiry::{reconcile, SweepReport};
pub use record::lifecycle::{ApproveOutcome, DeleteOutcome, RejectOutcome, UpdateOutcome};
pub use record::query::{ListQuery, Page};
pub use record::{
    Actor, Clock, EntityType, FileStore, Fields, LifecycleEngine, LifecycleStatus, MemoryStore,
    Record, RecordError, RecordStatus, RecordStore, Role, StatsAggregator, StatsSummary,
    SystemClock,
};
pub use server::AffairsDaemonService;
