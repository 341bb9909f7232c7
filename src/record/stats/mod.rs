//! Per-module statistics computed on demand from the record store.
//!
//! What each module reports is declared once in [`profiles`]; the
//! aggregation in [`aggregate`] is written against [`StatsProfile`] and
//! never branches on the module.

pub mod aggregate;
pub mod profile;
pub mod profiles;
pub mod trend;
pub mod types;

pub use profile::{
    DistributionSource, DistributionSpec, Eligibility, ExpirySpec, Predicate, RecentSpec,
    StatsProfile,
};
pub use types::{
    Dashboard, DistributionEntry, ExpiryForecast, ListedRecord, StatsLimits, StatsSummary, Trend,
    TrendDirection, TrendPoint,
};

use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::record::core::clock::Clock;
use crate::record::core::error::RecordError;
use crate::record::store::RecordStore;
use crate::record::EntityType;

/// Read-only statistics over a [`RecordStore`].
#[derive(Clone)]
pub struct StatsAggregator {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    limits: StatsLimits,
}

impl StatsAggregator {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, limits: StatsLimits) -> Self {
        Self {
            store,
            clock,
            limits,
        }
    }

    #[must_use]
    pub fn limits(&self) -> StatsLimits {
        self.limits
    }

    /// Summary of one module from a single scan of its collection.
    pub async fn compute(&self, entity: EntityType) -> Result<StatsSummary, RecordError> {
        let records = self.store.scan(entity).await.map_err(|e| {
            warn!(entity = %entity, error = %e, "Statistics scan failed");
            RecordError::Aggregation(format!("{entity}: {e}"))
        })?;
        let now = self.clock.now();
        debug!(entity = %entity, records = records.len(), "Computing statistics");
        Ok(aggregate::summarize(
            entity.stats_profile(),
            entity.schema(),
            &records,
            self.limits,
            now,
        ))
    }

    /// Every module's summary, computed concurrently. Fails as a whole if
    /// any module fails.
    pub async fn dashboard(&self) -> Result<Dashboard, RecordError> {
        let generated_at = self.clock.now();
        let modules = try_join_all(EntityType::ALL.into_iter().map(|e| self.compute(e))).await?;
        Ok(Dashboard {
            generated_at,
            modules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::core::clock::FixedClock;
    use crate::record::core::model::Record;
    use crate::record::store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn aggregator() -> (Arc<MemoryStore>, StatsAggregator) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap(),
        ));
        let stats = StatsAggregator::new(store.clone(), clock, StatsLimits::default());
        (store, stats)
    }

    #[tokio::test]
    async fn test_compute_reads_store() {
        let (store, stats) = aggregator();
        let fields = json!({"conferenceName": "ICSE", "country": "Portugal", "date": "2024-06-01"})
            .as_object()
            .cloned()
            .unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        store
            .insert(&Record::new(EntityType::Conference, fields, "u1", now))
            .await
            .unwrap();

        let summary = stats.compute(EntityType::Conference).await.unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.count("countries"), Some(1));
    }

    #[tokio::test]
    async fn test_dashboard_covers_every_module() {
        let (_, stats) = aggregator();
        let dashboard = stats.dashboard().await.unwrap();
        assert_eq!(dashboard.modules.len(), EntityType::ALL.len());
        assert!(dashboard.modules.iter().all(|m| m.total == 0));
    }
}
