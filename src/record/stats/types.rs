use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::record::core::id::RecordId;
use crate::record::EntityType;

/// Month-over-month direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    #[default]
    Stable,
}

/// Change between the current and the previous calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Trend {
    pub change: i64,
    pub percentage: f64,
    pub direction: TrendDirection,
}

/// Count for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    /// `YYYY-MM`
    pub month: String,
    pub count: usize,
}

/// One bucket of a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionEntry {
    pub name: String,
    pub count: usize,
}

/// Expiry horizon buckets, counted in days remaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryForecast {
    /// 0 to 90 days
    pub upcoming: usize,
    /// 91 to 180 days
    pub medium_term: usize,
    /// Beyond 180 days
    pub long_term: usize,
}

/// Record reference in a derived list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedRecord {
    pub id: RecordId,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
}

/// Statistics for one module.
///
/// Module-specific outputs are keyed by the names in the module's
/// [`StatsProfile`](super::StatsProfile) and flattened into the JSON form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub entity: EntityType,
    pub total: usize,
    pub trend: Trend,
    pub trend_data: Vec<TrendPoint>,
    #[serde(flatten)]
    pub counts: BTreeMap<&'static str, usize>,
    #[serde(flatten)]
    pub metrics: BTreeMap<&'static str, f64>,
    #[serde(flatten)]
    pub distributions: BTreeMap<&'static str, Vec<DistributionEntry>>,
    #[serde(flatten)]
    pub lists: BTreeMap<&'static str, Vec<ListedRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_forecast: Option<ExpiryForecast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_duration_days: Option<f64>,
}

impl StatsSummary {
    /// Value of a distinct count or counter.
    #[must_use]
    pub fn count(&self, key: &str) -> Option<usize> {
        self.counts.get(key).copied()
    }

    #[must_use]
    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }

    #[must_use]
    pub fn distribution(&self, key: &str) -> Option<&[DistributionEntry]> {
        self.distributions.get(key).map(Vec::as_slice)
    }

    #[must_use]
    pub fn list(&self, key: &str) -> Option<&[ListedRecord]> {
        self.lists.get(key).map(Vec::as_slice)
    }
}

/// Every module's summary from one dashboard request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub generated_at: DateTime<Utc>,
    pub modules: Vec<StatsSummary>,
}

/// Output caps, configurable under `[stats]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsLimits {
    pub distribution_limit: usize,
    pub list_limit: usize,
    pub trend_months: usize,
}

impl Default for StatsLimits {
    fn default() -> Self {
        Self {
            distribution_limit: 10,
            list_limit: 5,
            trend_months: 6,
        }
    }
}
