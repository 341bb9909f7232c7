//! Conversions between domain types and protobuf messages.

use super::helpers::{nonempty, nonzero, to_u32, to_u64};
use super::proto;
use crate::record::activity::ActivityEntry;
use crate::record::expiry::SweepEntry;
use crate::record::lifecycle::PendingSummaryEntry;
use crate::record::query::{ListQuery, Page};
use crate::record::{Fields, LifecycleStatus, Record, RecordError, RecordStatus};
use crate::utils::dates::{format_date, parse_date_str};

fn fields_json(fields: &Fields) -> String {
    serde_json::to_string(fields).unwrap_or_else(|_| "{}".to_string())
}

/// Parse a `fields_json` payload. An empty payload is an empty object.
pub fn parse_fields(json: &str) -> Result<Fields, RecordError> {
    if json.trim().is_empty() {
        return Ok(Fields::new());
    }
    match serde_json::from_str::<serde_json::Value>(json) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err(RecordError::validation("fields_json must be a JSON object")),
        Err(e) => Err(RecordError::validation(format!("fields_json is not valid JSON: {e}"))),
    }
}

pub fn record_to_proto(record: &Record) -> proto::Record {
    proto::Record {
        id: record.id.to_string(),
        entity_type: record.entity.collection().to_string(),
        fields_json: fields_json(&record.fields),
        status: record.status.as_str().to_string(),
        pending_changes_json: record
            .pending_changes
            .as_ref()
            .map_or_else(String::new, fields_json),
        deletion_reason: record.deletion_reason.clone(),
        record_status: record
            .record_status
            .map_or_else(String::new, |s| s.as_str().to_string()),
        created_by: record.created_by.clone().unwrap_or_default(),
        updated_by: record.updated_by.clone().unwrap_or_default(),
        created_at: format_date(record.created_at),
        updated_at: format_date(record.updated_at),
        revision: record.revision,
    }
}

pub fn page_to_proto(page: &Page<Record>) -> proto::Pagination {
    proto::Pagination {
        page: to_u32(page.page),
        limit: to_u32(page.limit),
        total: to_u64(page.total),
        pages: to_u64(page.pages),
    }
}

fn parse_bound(raw: &str, name: &str) -> Result<Option<chrono::DateTime<chrono::Utc>>, RecordError> {
    match nonempty(raw) {
        None => Ok(None),
        Some(s) => parse_date_str(&s)
            .map(Some)
            .ok_or_else(|| RecordError::validation(format!("Invalid {name}: {s}"))),
    }
}

/// Build a [`ListQuery`]. `all` or an empty string disables a status filter.
pub fn list_query_from_proto(req: &proto::ListRecordsRequest) -> Result<ListQuery, RecordError> {
    let status = match nonempty(&req.status) {
        Some(s) if !s.eq_ignore_ascii_case("all") => {
            Some(s.parse::<LifecycleStatus>().map_err(RecordError::Validation)?)
        }
        _ => None,
    };
    let record_status = match nonempty(&req.record_status) {
        Some(s) if !s.eq_ignore_ascii_case("all") => {
            Some(s.parse::<RecordStatus>().map_err(RecordError::Validation)?)
        }
        _ => None,
    };
    let sort_order = match nonempty(&req.sort_order) {
        Some(s) => s.parse()?,
        None => crate::record::query::SortOrder::default(),
    };

    Ok(ListQuery {
        page: nonzero(req.page),
        limit: nonzero(req.limit),
        search: nonempty(&req.search),
        status,
        record_status,
        country: nonempty(&req.country),
        start_date: parse_bound(&req.start_date, "start_date")?,
        end_date: parse_bound(&req.end_date, "end_date")?,
        sort_by: nonempty(&req.sort_by),
        sort_order,
    })
}

pub fn activity_to_proto(entry: &ActivityEntry) -> proto::ActivityEntry {
    proto::ActivityEntry {
        id: entry.id.clone(),
        actor_id: entry.actor_id.clone(),
        actor_role: entry.actor_role.as_str().to_string(),
        action: entry.action.as_str().to_string(),
        entity_type: entry.entity.collection().to_string(),
        target_id: entry.target_id.clone().unwrap_or_default(),
        target_label: entry.target_label.clone().unwrap_or_default(),
        outcome: entry.outcome.as_str().to_string(),
        detail: entry.detail.clone().unwrap_or_default(),
        at: format_date(entry.at),
    }
}

pub fn pending_summary_to_proto(entry: &PendingSummaryEntry) -> proto::PendingSummaryEntry {
    proto::PendingSummaryEntry {
        entity_type: entry.entity.collection().to_string(),
        count: to_u64(entry.count),
    }
}

pub fn sweep_entry_to_proto(entry: &SweepEntry) -> proto::ExpirySweepEntry {
    proto::ExpirySweepEntry {
        entity_type: entry.entity.collection().to_string(),
        scanned: to_u64(entry.scanned),
        expired: to_u64(entry.expired),
        reactivated: to_u64(entry.reactivated),
        skipped: to_u64(entry.skipped),
    }
}
