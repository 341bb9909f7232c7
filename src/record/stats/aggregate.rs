//! Pure summarization of one module's records.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::profile::{
    DistributionSource, DistributionSpec, Eligibility, Predicate, RecentSpec,
    StatsProfile,
};
use super::trend::{compare_months, monthly_series, round_to};
use super::types::{DistributionEntry, ExpiryForecast, ListedRecord, StatsLimits, StatsSummary};
use crate::record::core::model::{LifecycleStatus, Record, RecordStatus};
use crate::record::expiry::{evaluate, terminal_date};
use crate::record::schema::{EntitySchema, ExpiryRule};
use crate::utils::dates::{days_until, format_date, shift_month};

const UPCOMING_DAYS: i64 = 90;
const MEDIUM_TERM_DAYS: i64 = 180;

/// Summarize `records` as of `now`. Records outside the profile's
/// eligibility are ignored.
#[must_use]
pub fn summarize(
    profile: &StatsProfile,
    schema: &EntitySchema,
    records: &[Record],
    limits: StatsLimits,
    now: DateTime<Utc>,
) -> StatsSummary {
    let eligible: Vec<&Record> = records
        .iter()
        .filter(|r| match profile.eligibility {
            Eligibility::ActiveOnly => r.status == LifecycleStatus::Active,
            Eligibility::All => true,
        })
        .collect();

    let trend_dates: Vec<DateTime<Utc>> = eligible
        .iter()
        .map(|r| trend_date(r, profile.trend_field))
        .collect();
    let this_month = shift_month(now, 0);
    let next_month = shift_month(now, 1);
    let last_month = shift_month(now, -1);
    let in_range = |start: DateTime<Utc>, end: DateTime<Utc>| {
        trend_dates.iter().filter(|d| **d >= start && **d < end).count()
    };

    let mut counts = BTreeMap::new();
    for (key, field) in profile.distinct {
        counts.insert(*key, distinct_count(&eligible, field));
    }
    for (key, predicate) in profile.counters {
        let n = eligible
            .iter()
            .filter(|r| satisfies(r, *predicate, schema.expiry, now))
            .count();
        counts.insert(*key, n);
    }

    let mut metrics = BTreeMap::new();
    for (key, field) in profile.sums {
        let sum: f64 = eligible.iter().filter_map(|r| r.number(field)).sum();
        metrics.insert(*key, round_to(sum, 2));
    }
    for (key, field) in profile.averages {
        metrics.insert(*key, round_to(mean(eligible.iter().filter_map(|r| r.number(field))), 2));
    }

    let distributions = profile
        .distributions
        .iter()
        .map(|spec| (spec.key, distribution(&eligible, spec, limits.distribution_limit)))
        .collect();

    let mut lists = BTreeMap::new();
    if let Some(recent) = profile.recent {
        lists.insert(recent.key, recent_list(&eligible, schema, recent, limits.list_limit));
    }

    let mut expiry_forecast = None;
    let mut avg_duration_days = None;
    if let (Some(spec), ExpiryRule::Terminal { start, end }) = (profile.expiry, schema.expiry) {
        let report = expiry_report(&eligible, schema, limits.list_limit, now);
        expiry_forecast = Some(report.forecast);
        avg_duration_days = Some(average_duration(&eligible, start, end));
        lists.insert(spec.list_key, report.expiring);
    }

    StatsSummary {
        entity: profile.entity,
        total: eligible.len(),
        trend: compare_months(in_range(this_month, next_month), in_range(last_month, this_month)),
        trend_data: monthly_series(&trend_dates, limits.trend_months, now),
        counts,
        metrics,
        distributions,
        lists,
        expiry_forecast,
        avg_duration_days,
    }
}

fn trend_date(record: &Record, field: Option<&str>) -> DateTime<Utc> {
    field
        .and_then(|f| record.date(f))
        .unwrap_or(record.created_at)
}

fn distinct_count(records: &[&Record], field: &str) -> usize {
    records
        .iter()
        .filter_map(|r| r.text(field))
        .collect::<HashSet<_>>()
        .len()
}

/// Record status as of `now`, without waiting for the next write or sweep.
fn live_record_status(record: &Record, rule: ExpiryRule, now: DateTime<Utc>) -> RecordStatus {
    match rule {
        ExpiryRule::Terminal { .. } => evaluate(terminal_date(record, rule), now)
            .unwrap_or_else(|| record.effective_record_status()),
        ExpiryRule::PinnedActive => RecordStatus::Active,
        ExpiryRule::None => record.effective_record_status(),
    }
}

fn satisfies(record: &Record, predicate: Predicate, rule: ExpiryRule, now: DateTime<Utc>) -> bool {
    match predicate {
        Predicate::FieldEquals(field, value) => record
            .text(field)
            .is_some_and(|v| v.eq_ignore_ascii_case(value)),
        Predicate::FieldPresent(field) => record.text(field).is_some(),
        Predicate::FieldAbsent(field) => record.text(field).is_none(),
        Predicate::RecordStatusActive => {
            live_record_status(record, rule, now) == RecordStatus::Active
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0u32), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / f64::from(n)
    }
}

fn email_domain(address: &str) -> Option<String> {
    let (_, domain) = address.rsplit_once('@')?;
    let domain = domain.trim();
    (!domain.is_empty()).then(|| domain.to_lowercase())
}

/// Top-N buckets, count descending then name ascending. Blank values never
/// form a bucket.
fn distribution(records: &[&Record], spec: &DistributionSpec, default_limit: usize) -> Vec<DistributionEntry> {
    let mut buckets: HashMap<String, usize> = HashMap::new();
    match spec.source {
        DistributionSource::Field(field) => {
            for value in records.iter().filter_map(|r| r.text(field)) {
                *buckets.entry(value.to_string()).or_default() += 1;
            }
        }
        DistributionSource::EmailDomain(field) => {
            for domain in records.iter().filter_map(|r| r.text(field).and_then(email_domain)) {
                *buckets.entry(domain).or_default() += 1;
            }
        }
        DistributionSource::Presence(pairs) => {
            for (label, field) in pairs {
                let n = records.iter().filter(|r| r.text(field).is_some()).count();
                if n > 0 {
                    buckets.insert((*label).to_string(), n);
                }
            }
        }
    }

    let mut entries: Vec<DistributionEntry> = buckets
        .into_iter()
        .map(|(name, count)| DistributionEntry { name, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    entries.truncate(spec.limit.unwrap_or(default_limit));
    entries
}

fn recent_list(
    records: &[&Record],
    schema: &EntitySchema,
    spec: RecentSpec,
    limit: usize,
) -> Vec<ListedRecord> {
    let mut dated: Vec<(DateTime<Utc>, &Record)> = records
        .iter()
        .filter_map(|r| r.date(spec.date_field).map(|d| (d, *r)))
        .collect();
    dated.sort_by(|(da, a), (db, b)| db.cmp(da).then_with(|| a.id.cmp(&b.id)));
    dated
        .into_iter()
        .take(limit)
        .map(|(date, r)| ListedRecord {
            id: r.id,
            label: schema.label(&r.fields),
            date: Some(format_date(date)),
            days_remaining: None,
        })
        .collect()
}

struct ExpiryReport {
    forecast: ExpiryForecast,
    expiring: Vec<ListedRecord>,
}

fn expiry_report(
    records: &[&Record],
    schema: &EntitySchema,
    limit: usize,
    now: DateTime<Utc>,
) -> ExpiryReport {
    let mut forecast = ExpiryForecast::default();
    let mut upcoming: Vec<(i64, DateTime<Utc>, &Record)> = Vec::new();

    for record in records {
        let Some(end) = terminal_date(record, schema.expiry) else {
            continue;
        };
        if evaluate(Some(end), now) != Some(RecordStatus::Active) {
            continue;
        }
        let days = days_until(end, now).max(0);
        match days {
            d if d <= UPCOMING_DAYS => forecast.upcoming += 1,
            d if d <= MEDIUM_TERM_DAYS => forecast.medium_term += 1,
            _ => forecast.long_term += 1,
        }
        upcoming.push((days, end, record));
    }

    upcoming.sort_by(|(_, ea, a), (_, eb, b)| ea.cmp(eb).then_with(|| a.id.cmp(&b.id)));
    let expiring = upcoming
        .into_iter()
        .take(limit)
        .map(|(days, end, r)| ListedRecord {
            id: r.id,
            label: schema.label(&r.fields),
            date: Some(format_date(end)),
            days_remaining: Some(days),
        })
        .collect();

    ExpiryReport { forecast, expiring }
}

/// Mean span in days between the start and end dates, over records where
/// both are present and the end is not before the start.
fn average_duration(records: &[&Record], start: Option<&str>, end: &str) -> f64 {
    let Some(start) = start else {
        return 0.0;
    };
    let spans = records.iter().filter_map(|r| {
        let (from, to) = (r.date(start)?, r.date(end)?);
        #[allow(clippy::cast_precision_loss)]
        let days = (to - from).num_milliseconds() as f64 / 86_400_000.0;
        (to >= from).then_some(days)
    });
    round_to(mean(spans), 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::core::model::Fields;
    use crate::record::EntityType;
    use chrono::TimeZone;
    use serde_json::json;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn record(entity: EntityType, value: serde_json::Value, created: DateTime<Utc>) -> Record {
        let fields: Fields = value.as_object().cloned().unwrap();
        Record::new(entity, fields, "u1", created)
    }

    fn run(entity: EntityType, records: &[Record], now: DateTime<Utc>) -> StatsSummary {
        summarize(
            entity.stats_profile(),
            entity.schema(),
            records,
            StatsLimits::default(),
            now,
        )
    }

    #[test]
    fn test_empty_collection() {
        for entity in EntityType::ALL {
            let summary = run(entity, &[], utc(2024, 6, 15));
            assert_eq!(summary.total, 0);
            assert_eq!(summary.trend.change, 0);
            assert!(summary.distributions.values().all(Vec::is_empty), "{entity}");
            assert!(summary.counts.values().all(|n| *n == 0), "{entity}");
            assert_eq!(summary.trend_data.len(), 6);
        }
    }

    #[test]
    fn test_pending_records_are_not_counted() {
        let now = utc(2024, 6, 15);
        let mut pending = record(EntityType::Conference, json!({"country": "Japan"}), now);
        pending.stage_delete("dup");
        let active = record(EntityType::Conference, json!({"country": "Japan"}), now);
        let summary = run(EntityType::Conference, &[pending, active], now);
        assert_eq!(summary.total, 1);
        assert_eq!(summary.count("countries"), Some(1));
    }

    #[test]
    fn test_events_count_pending_records() {
        let now = utc(2024, 6, 15);
        let mut pending = record(EntityType::Event, json!({"title": "A"}), now);
        pending.stage_edit(Fields::new());
        let active = record(EntityType::Event, json!({"title": "B"}), now);
        assert_eq!(run(EntityType::Event, &[pending, active], now).total, 2);
    }

    #[test]
    fn test_distribution_ties_and_blanks() {
        let now = utc(2024, 6, 15);
        let records: Vec<Record> = ["Japan", "India", "India", "Brazil", "Japan", "  ", "Chile"]
            .iter()
            .map(|c| record(EntityType::Conference, json!({"country": c}), now))
            .collect();
        let summary = run(EntityType::Conference, &records, now);
        let names: Vec<&str> = summary
            .distribution("countryDistribution")
            .unwrap()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["India", "Japan", "Brazil", "Chile"]);
        assert_eq!(summary.count("countries"), Some(4));
    }

    #[test]
    fn test_trend_uses_module_date_with_created_fallback() {
        let now = utc(2024, 6, 15);
        let records = vec![
            record(EntityType::Conference, json!({"date": "2024-06-02"}), utc(2023, 1, 1)),
            record(EntityType::Conference, json!({"date": "2024-05-02"}), utc(2023, 1, 1)),
            record(EntityType::Conference, json!({"date": "2024-05-20"}), utc(2023, 1, 1)),
            record(EntityType::Conference, json!({}), utc(2024, 6, 3)),
        ];
        let summary = run(EntityType::Conference, &records, now);
        assert_eq!(summary.trend.change, 0);
        assert_eq!(summary.trend_data.last().map(|p| p.count), Some(2));
    }

    #[test]
    fn test_expiry_forecast_buckets() {
        let now = utc(2024, 1, 1);
        let records: Vec<Record> = [
            "2023-12-01", // expired
            "2024-01-01", // today
            "2024-03-15",
            "2024-05-15",
            "2025-01-01",
        ]
        .iter()
        .map(|end| {
            record(
                EntityType::Membership,
                json!({"name": end, "startDate": "2023-01-01", "endDate": end}),
                now,
            )
        })
        .collect();
        let summary = run(EntityType::Membership, &records, now);
        let forecast = summary.expiry_forecast.unwrap();
        assert_eq!(forecast.upcoming, 2);
        assert_eq!(forecast.medium_term, 1);
        assert_eq!(forecast.long_term, 1);
        assert_eq!(summary.count("active"), Some(4));

        let expiring = summary.list("expiringMemberships").unwrap();
        assert_eq!(expiring.len(), 4);
        assert_eq!(expiring[0].label, "2024-01-01");
        assert_eq!(expiring[0].days_remaining, Some(0));
    }

    #[test]
    fn test_average_duration_skips_inverted_spans() {
        let now = utc(2024, 1, 1);
        let records = vec![
            record(
                EntityType::ScholarInResidence,
                json!({"fromDate": "2024-01-01", "toDate": "2024-01-11"}),
                now,
            ),
            record(
                EntityType::ScholarInResidence,
                json!({"fromDate": "2024-01-01", "toDate": "2024-01-21"}),
                now,
            ),
            record(
                EntityType::ScholarInResidence,
                json!({"fromDate": "2024-02-01", "toDate": "2024-01-01"}),
                now,
            ),
        ];
        let summary = run(EntityType::ScholarInResidence, &records, now);
        assert_eq!(summary.avg_duration_days, Some(15.0));
    }

    #[test]
    fn test_counters_sums_and_averages() {
        let now = utc(2024, 6, 15);
        let records = vec![
            record(
                EntityType::ImmersionProgram,
                json!({"direction": "Incoming", "numberOfPax": 10, "feesPerPax": 100.0}),
                now,
            ),
            record(
                EntityType::ImmersionProgram,
                json!({"direction": "outgoing", "numberOfPax": 5, "feesPerPax": 250.5}),
                now,
            ),
        ];
        let summary = run(EntityType::ImmersionProgram, &records, now);
        assert_eq!(summary.count("incoming"), Some(1));
        assert_eq!(summary.count("outgoing"), Some(1));
        assert_eq!(summary.metric("totalPax"), Some(15.0));
        assert_eq!(summary.metric("avgFeesPerPax"), Some(175.25));
    }

    #[test]
    fn test_email_domains_and_presence() {
        let now = utc(2024, 6, 15);
        let outreach = vec![
            record(EntityType::Outreach, json!({"email": "a@Uni.EDU", "reply": "yes"}), now),
            record(EntityType::Outreach, json!({"email": "b@uni.edu"}), now),
            record(EntityType::Outreach, json!({"email": "not-an-address"}), now),
        ];
        let summary = run(EntityType::Outreach, &outreach, now);
        let domains = summary.distribution("emailDomainDistribution").unwrap();
        assert_eq!(domains.len(), 1);
        assert_eq!(domains[0].name, "uni.edu");
        assert_eq!(domains[0].count, 2);
        assert_eq!(summary.count("responses"), Some(1));
        assert_eq!(summary.count("nonResponses"), Some(2));

        let posts = vec![
            record(EntityType::SocialMedia, json!({"postName": "a", "fbLink": "x", "vkLink": "y"}), now),
            record(EntityType::SocialMedia, json!({"postName": "b", "fbLink": "z"}), now),
        ];
        let summary = run(EntityType::SocialMedia, &posts, now);
        let platforms = summary.distribution("platformDistribution").unwrap();
        let names: Vec<&str> = platforms.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Facebook", "VK"]);
    }

    #[test]
    fn test_recent_list_newest_first() {
        let now = utc(2024, 6, 15);
        let records: Vec<Record> = (1..=7)
            .map(|d| {
                record(
                    EntityType::CampusVisit,
                    json!({"visitorName": format!("v{d}"), "universityName": "U", "date": format!("2024-06-0{d}")}),
                    now,
                )
            })
            .collect();
        let summary = run(EntityType::CampusVisit, &records, now);
        let recent = summary.list("recentVisits").unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].label, "v7 - U");
    }

    #[test]
    fn test_json_flattens_outputs() {
        let now = utc(2024, 6, 15);
        let records = vec![record(EntityType::Partner, json!({"country": "Japan", "university": "Keio"}), now)];
        let value = serde_json::to_value(run(EntityType::Partner, &records, now)).unwrap();
        assert_eq!(value["total"], 1);
        assert_eq!(value["countries"], 1);
        assert_eq!(value["countryDistribution"][0]["name"], "Japan");
        assert_eq!(value["trend"]["direction"], "up");
        assert!(value["expiryForecast"].is_object());
        assert!(value["expiringPartners"].is_array());
    }
}
