//! Common test utilities
#![allow(dead_code)]

use affairs_daemon::record::{FixedClock, LifecycleEngine, MemoryStore, RecordStore};
use affairs_daemon::Fields;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

/// Build a field map from a JSON object literal.
pub fn fields(value: serde_json::Value) -> Fields {
    value
        .as_object()
        .cloned()
        .expect("fields must be a JSON object")
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s)
        .single()
        .expect("valid timestamp")
}

/// An engine over an in-memory store with a hand-driven clock.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub engine: LifecycleEngine,
}

impl Harness {
    pub fn new(now: DateTime<Utc>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(now));
        let engine = LifecycleEngine::new(store.clone(), clock.clone());
        Self {
            store,
            clock,
            engine,
        }
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }
}
