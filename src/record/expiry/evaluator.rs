use chrono::{DateTime, Utc};

use crate::record::core::model::{Record, RecordStatus};
use crate::record::schema::ExpiryRule;
use crate::utils::dates::end_of_day;

/// Status for a terminal date as of `now`.
///
/// A record is expired once `now` is past the last instant of the terminal
/// date's calendar day (UTC). An absent date yields `None`: the caller keeps
/// whatever status was stored.
#[must_use]
pub fn evaluate(terminal: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<RecordStatus> {
    terminal.map(|date| {
        if now > end_of_day(date) {
            RecordStatus::Expired
        } else {
            RecordStatus::Active
        }
    })
}

/// Terminal date of a record under `rule`. Malformed dates count as absent.
#[must_use]
pub fn terminal_date(record: &Record, rule: ExpiryRule) -> Option<DateTime<Utc>> {
    match rule {
        ExpiryRule::Terminal { end, .. } => record.date(end),
        ExpiryRule::None | ExpiryRule::PinnedActive => None,
    }
}

/// Recompute `recordStatus` in place. Returns whether it changed.
pub fn apply(record: &mut Record, rule: ExpiryRule, now: DateTime<Utc>) -> bool {
    let next = match rule {
        ExpiryRule::None => return false,
        ExpiryRule::PinnedActive => RecordStatus::Active,
        ExpiryRule::Terminal { .. } => evaluate(terminal_date(record, rule), now)
            .unwrap_or_else(|| record.effective_record_status()),
    };
    let changed = record.record_status != Some(next);
    record.record_status = Some(next);
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EntityType;
    use chrono::TimeZone;
    use serde_json::json;

    fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
    }

    fn membership(end: Option<&str>) -> Record {
        let mut fields = json!({"name": "ACU", "startDate": "2024-01-01T00:00:00.000Z"})
            .as_object()
            .cloned()
            .unwrap();
        if let Some(end) = end {
            fields.insert("endDate".into(), json!(end));
        }
        Record::new(EntityType::Membership, fields, "u1", utc(2024, 1, 1, 0, 0, 0))
    }

    #[test]
    fn test_boundary_is_end_of_day() {
        let end = Some(utc(2024, 6, 1, 10, 0, 0));
        assert_eq!(evaluate(end, utc(2024, 6, 1, 23, 59, 59)), Some(RecordStatus::Active));
        assert_eq!(evaluate(end, utc(2024, 6, 2, 0, 0, 1)), Some(RecordStatus::Expired));
        assert_eq!(evaluate(end, utc(2024, 5, 1, 0, 0, 0)), Some(RecordStatus::Active));
    }

    #[test]
    fn test_absent_date_is_no_opinion() {
        assert_eq!(evaluate(None, utc(2030, 1, 1, 0, 0, 0)), None);
    }

    #[test]
    fn test_apply_keeps_status_without_date() {
        let rule = EntityType::Membership.schema().expiry;
        let mut rec = membership(None);
        assert!(apply(&mut rec, rule, utc(2024, 6, 1, 0, 0, 0)));
        assert_eq!(rec.record_status, Some(RecordStatus::Active));

        rec.record_status = Some(RecordStatus::Expired);
        assert!(!apply(&mut rec, rule, utc(2024, 6, 1, 0, 0, 0)));
        assert_eq!(rec.record_status, Some(RecordStatus::Expired));
    }

    #[test]
    fn test_apply_flips_both_ways() {
        let rule = EntityType::Membership.schema().expiry;
        let mut rec = membership(Some("2024-06-01T10:00:00.000Z"));
        assert!(apply(&mut rec, rule, utc(2024, 7, 1, 0, 0, 0)));
        assert_eq!(rec.record_status, Some(RecordStatus::Expired));

        rec.fields.insert("endDate".into(), json!("2025-06-01T00:00:00.000Z"));
        assert!(apply(&mut rec, rule, utc(2024, 7, 1, 0, 0, 0)));
        assert_eq!(rec.record_status, Some(RecordStatus::Active));
    }

    #[test]
    fn test_malformed_date_counts_as_absent() {
        let rule = EntityType::Membership.schema().expiry;
        let mut rec = membership(Some("not a date"));
        apply(&mut rec, rule, utc(2030, 1, 1, 0, 0, 0));
        assert_eq!(rec.record_status, Some(RecordStatus::Active));
    }

    #[test]
    fn test_untracked_and_pinned_rules() {
        let mut rec = membership(Some("2020-01-01"));
        assert!(!apply(&mut rec, ExpiryRule::None, utc(2024, 1, 1, 0, 0, 0)));
        assert_eq!(rec.record_status, None);

        assert!(apply(&mut rec, ExpiryRule::PinnedActive, utc(2024, 1, 1, 0, 0, 0)));
        assert_eq!(rec.record_status, Some(RecordStatus::Active));
    }
}
