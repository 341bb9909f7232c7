//! Declarative description of a module's statistics.

use crate::record::EntityType;

/// Which records count toward a module's statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Only records in lifecycle status `active`.
    ActiveOnly,
    /// Every record, pending or not.
    All,
}

/// Record predicate for counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Field equals the value, ignoring case.
    FieldEquals(&'static str, &'static str),
    /// Field holds a non-blank value.
    FieldPresent(&'static str),
    /// Field is missing or blank.
    FieldAbsent(&'static str),
    /// Record status, evaluated as of now, is active.
    RecordStatusActive,
}

/// Where a distribution's buckets come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionSource {
    /// Trimmed field value.
    Field(&'static str),
    /// Lower-cased domain of an e-mail field.
    EmailDomain(&'static str),
    /// One bucket per `(label, field)`, counting records where the field is set.
    Presence(&'static [(&'static str, &'static str)]),
}

/// A top-N grouped count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionSpec {
    pub key: &'static str,
    pub source: DistributionSource,
    /// Overrides the configured distribution limit.
    pub limit: Option<usize>,
}

impl DistributionSpec {
    #[must_use]
    pub const fn field(key: &'static str, field: &'static str) -> Self {
        Self {
            key,
            source: DistributionSource::Field(field),
            limit: None,
        }
    }

    #[must_use]
    pub const fn email_domain(key: &'static str, field: &'static str) -> Self {
        Self {
            key,
            source: DistributionSource::EmailDomain(field),
            limit: None,
        }
    }

    #[must_use]
    pub const fn presence(key: &'static str, fields: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            key,
            source: DistributionSource::Presence(fields),
            limit: None,
        }
    }
}

/// Expiry outputs for date-bounded modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirySpec {
    /// Output key of the soonest-expiring list.
    pub list_key: &'static str,
}

/// Most-recent list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecentSpec {
    pub key: &'static str,
    pub date_field: &'static str,
}

/// Registry entry describing how to summarize one module.
#[derive(Debug)]
pub struct StatsProfile {
    pub entity: EntityType,
    pub eligibility: Eligibility,
    /// Date that places a record in a month for trends; `createdAt` when `None`
    /// or when the record lacks it.
    pub trend_field: Option<&'static str>,
    pub distinct: &'static [(&'static str, &'static str)],
    pub counters: &'static [(&'static str, Predicate)],
    pub distributions: &'static [DistributionSpec],
    pub sums: &'static [(&'static str, &'static str)],
    pub averages: &'static [(&'static str, &'static str)],
    pub expiry: Option<ExpirySpec>,
    pub recent: Option<RecentSpec>,
}
