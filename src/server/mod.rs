//! gRPC surface of the daemon.
//!
//! Domain failures travel in-band (`success = false` plus a structured
//! error JSON). Transport status codes are reserved for requests that
//! carry no caller identity.

use std::sync::Arc;

use crate::record::stats::StatsLimits;
use crate::record::{Clock, LifecycleEngine, RecordStore, StatsAggregator};

pub mod actor;
mod convert;
pub mod error_mapping;
mod handlers;
mod helpers;
pub mod structured_error;
mod trait_impl;

pub mod proto {
    #![allow(clippy::pedantic)]
    #![allow(clippy::all)]
    tonic::include_proto!("affairs");
}

/// Encoded descriptor set for gRPC reflection.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("affairs_descriptor");

#[derive(Clone)]
pub struct AffairsDaemonService {
    engine: LifecycleEngine,
    stats: StatsAggregator,
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl AffairsDaemonService {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, limits: StatsLimits) -> Self {
        Self {
            engine: LifecycleEngine::new(store.clone(), clock.clone()),
            stats: StatsAggregator::new(store.clone(), clock.clone(), limits),
            store,
            clock,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &LifecycleEngine {
        &self.engine
    }
}
