use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::evaluator::apply;
use crate::record::activity::ActivityJournal;
use crate::record::core::clock::Clock;
use crate::record::core::model::RecordStatus;
use crate::record::store::{RecordStore, StoreError, WriteOutcome};
use crate::record::EntityType;

/// Per-module result of a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepEntry {
    pub entity: EntityType,
    pub scanned: usize,
    pub expired: usize,
    pub reactivated: usize,
    /// Records written by someone else mid-sweep; they were re-evaluated by that write.
    pub skipped: usize,
}

impl SweepEntry {
    fn new(entity: EntityType) -> Self {
        Self {
            entity,
            scanned: 0,
            expired: 0,
            reactivated: 0,
            skipped: 0,
        }
    }
}

/// Result of a reconciliation pass across every tracking module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub entries: Vec<SweepEntry>,
}

impl SweepReport {
    #[must_use]
    pub fn changed(&self) -> usize {
        self.entries.iter().map(|e| e.expired + e.reactivated).sum()
    }

    #[must_use]
    pub fn entry(&self, entity: EntityType) -> Option<&SweepEntry> {
        self.entries.iter().find(|e| e.entity == entity)
    }
}

/// Recompute `recordStatus` for every record of every module that tracks it
/// and rewrite those whose value changed.
///
/// Rewrites bump the revision but leave `updatedAt`/`updatedBy` alone: the
/// record's content did not change.
pub async fn reconcile(
    store: &dyn RecordStore,
    now: DateTime<Utc>,
) -> Result<SweepReport, StoreError> {
    let mut report = SweepReport::default();

    for entity in EntityType::ALL {
        let rule = entity.schema().expiry;
        if !rule.tracks_status() {
            continue;
        }

        let mut entry = SweepEntry::new(entity);
        for mut record in store.scan(entity).await? {
            entry.scanned += 1;
            let expected = record.revision;
            if !apply(&mut record, rule, now) {
                continue;
            }
            record.revision += 1;
            match store.replace_if(&record, expected).await? {
                WriteOutcome::Applied => match record.record_status {
                    Some(RecordStatus::Expired) => entry.expired += 1,
                    _ => entry.reactivated += 1,
                },
                WriteOutcome::Missing | WriteOutcome::Stale { .. } => entry.skipped += 1,
            }
        }
        debug!(
            entity = %entity,
            scanned = entry.scanned,
            expired = entry.expired,
            reactivated = entry.reactivated,
            skipped = entry.skipped,
            "Reconciled record status"
        );
        report.entries.push(entry);
    }

    Ok(report)
}

/// Settings for the background sweeper.
#[derive(Debug, Clone, Copy)]
pub struct SweepSettings {
    pub interval: Duration,
    pub activity_retention_days: u32,
}

/// Run [`reconcile`] and activity pruning now and then on every interval tick.
pub fn spawn_sweeper(
    store: Arc<dyn RecordStore>,
    journal: ActivityJournal,
    clock: Arc<dyn Clock>,
    settings: SweepSettings,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(settings.interval.max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let now = clock.now();
            match reconcile(store.as_ref(), now).await {
                Ok(report) if report.changed() > 0 => {
                    info!(changed = report.changed(), "Expiry sweep updated record status");
                }
                Ok(_) => debug!("Expiry sweep found nothing to update"),
                Err(e) => warn!(error = %e, "Expiry sweep failed"),
            }
            if let Err(e) = journal.prune(settings.activity_retention_days, now).await {
                warn!(error = %e, "Activity pruning failed");
            }
        }
    })
}
