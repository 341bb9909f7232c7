//! Filtering, sorting and pagination for record listings.

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::cmp::Ordering;

use super::core::error::RecordError;
use super::core::model::{LifecycleStatus, Record, RecordStatus};
use super::schema::EntitySchema;
use crate::utils::dates::{end_of_day, format_date, parse_date};

pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(RecordError::validation(format!("Invalid sort order: {other}"))),
        }
    }
}

/// Listing parameters.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// 1-based page number
    pub page: Option<usize>,
    pub limit: Option<usize>,
    /// Case-insensitive literal match over the module's search fields
    pub search: Option<String>,
    pub status: Option<LifecycleStatus>,
    pub record_status: Option<RecordStatus>,
    /// Case-insensitive substring of `country`
    pub country: Option<String>,
    /// Lower bound on `createdAt`
    pub start_date: Option<DateTime<Utc>>,
    /// Upper bound on `createdAt`, inclusive to the end of that day
    pub end_date: Option<DateTime<Utc>>,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
}

impl ListQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(mut self, page: usize, limit: usize) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: LifecycleStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_record_status(mut self, record_status: RecordStatus) -> Self {
        self.record_status = Some(record_status);
        self
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    #[must_use]
    pub fn with_created_between(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    #[must_use]
    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = order;
        self
    }

    fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

/// Filter, sort and paginate `records` according to `query`.
pub fn run(
    schema: &EntitySchema,
    records: Vec<Record>,
    query: &ListQuery,
) -> Result<Page<Record>, RecordError> {
    let search = compile_search(query.search.as_deref())?;
    let country = query
        .country
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_lowercase);
    let end_bound = query.end_date.map(end_of_day);

    let mut matched: Vec<Record> = records
        .into_iter()
        .filter(|r| query.status.is_none_or(|s| r.status == s))
        .filter(|r| {
            query
                .record_status
                .is_none_or(|s| r.effective_record_status() == s)
        })
        .filter(|r| {
            country.as_deref().is_none_or(|needle| {
                r.text("country")
                    .is_some_and(|c| c.to_lowercase().contains(needle))
            })
        })
        .filter(|r| query.start_date.is_none_or(|start| r.created_at >= start))
        .filter(|r| end_bound.is_none_or(|end| r.created_at <= end))
        .filter(|r| {
            search.as_ref().is_none_or(|re| {
                schema
                    .search_fields
                    .iter()
                    .any(|f| r.text(f).is_some_and(|v| re.is_match(v)))
            })
        })
        .collect();

    let sort_field = query.sort_by.as_deref().unwrap_or("createdAt");
    matched.sort_by(|a, b| compare(a, b, sort_field, query.sort_order));

    let limit = query.limit();
    let page = query.page();
    let total = matched.len();
    let pages = total.div_ceil(limit);
    let data = matched
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();

    Ok(Page {
        data,
        page,
        limit,
        total,
        pages,
    })
}

fn compile_search(search: Option<&str>) -> Result<Option<Regex>, RecordError> {
    let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|e| RecordError::validation(format!("Invalid search term: {e}")))
}

#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(record: &Record, field: &str) -> Option<SortKey> {
    match field {
        "createdAt" => Some(SortKey::Text(format_date(record.created_at))),
        "updatedAt" => Some(SortKey::Text(format_date(record.updated_at))),
        _ => {
            let value = record.fields.get(field)?;
            match value {
                serde_json::Value::Number(n) => n.as_f64().map(SortKey::Number),
                serde_json::Value::String(s) if s.trim().is_empty() => None,
                serde_json::Value::String(s) => Some(parse_date(value).map_or_else(
                    || SortKey::Text(s.to_lowercase()),
                    |d| SortKey::Text(format_date(d)),
                )),
                _ => None,
            }
        }
    }
}

/// Missing values sort last in either direction; ties break on id.
fn compare(a: &Record, b: &Record, field: &str, order: SortOrder) -> Ordering {
    let primary = match (sort_key(a, field), sort_key(b, field)) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EntityType;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn partner(university: &str, country: &str, day: u32) -> Record {
        let at = Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
        Record::new(
            EntityType::Partner,
            json!({"university": university, "country": country})
                .as_object()
                .cloned()
                .unwrap(),
            "u1",
            at,
        )
    }

    fn sample() -> Vec<Record> {
        vec![
            partner("MIT", "USA", 1),
            partner("Oxford", "United Kingdom", 2),
            partner("Stanford", "USA", 3),
            partner("NUS (Singapore)", "Singapore", 4),
        ]
    }

    fn schema() -> &'static EntitySchema {
        EntityType::Partner.schema()
    }

    #[test]
    fn test_defaults_newest_first() {
        let page = run(schema(), sample(), &ListQuery::new()).unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.pages, 1);
        assert_eq!(page.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(page.data[0].text("university"), Some("NUS (Singapore)"));
    }

    #[test]
    fn test_search_is_literal_and_case_insensitive() {
        let page = run(schema(), sample(), &ListQuery::new().with_search("nus (")).unwrap();
        assert_eq!(page.total, 1);
        let page = run(schema(), sample(), &ListQuery::new().with_search("usa")).unwrap();
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_country_and_status_filters() {
        let mut records = sample();
        records[0].stage_delete("");
        let page = run(schema(), records.clone(), &ListQuery::new().with_country("us")).unwrap();
        assert_eq!(page.total, 2);
        let page = run(
            schema(),
            records,
            &ListQuery::new().with_status(LifecycleStatus::PendingDelete),
        )
        .unwrap();
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_end_date_is_inclusive_to_end_of_day() {
        let day2 = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let page = run(
            schema(),
            sample(),
            &ListQuery::new().with_created_between(Some(day2), Some(day2)),
        )
        .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].text("university"), Some("Oxford"));
    }

    #[test]
    fn test_pagination() {
        let page = run(schema(), sample(), &ListQuery::new().with_page(2, 3)).unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.pages, 2);
        assert_eq!(page.data.len(), 1);

        let page = run(schema(), sample(), &ListQuery::new().with_page(0, 1000)).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, MAX_PAGE_LIMIT);
    }

    #[test]
    fn test_sort_by_field_missing_last() {
        let mut records = sample();
        records[1]
            .fields
            .insert("expiringDate".into(), json!("2025-01-01T00:00:00.000Z"));
        records[2]
            .fields
            .insert("expiringDate".into(), json!("2024-06-01T00:00:00.000Z"));
        let page = run(
            schema(),
            records,
            &ListQuery::new().sorted_by("expiringDate", SortOrder::Asc),
        )
        .unwrap();
        let names: Vec<_> = page.data.iter().map(|r| r.text("university").unwrap()).collect();
        assert_eq!(names[0], "Stanford");
        assert_eq!(names[1], "Oxford");
    }

    #[test]
    fn test_updated_at_sort() {
        let mut records = sample();
        records[0].updated_at += Duration::days(30);
        let page = run(
            schema(),
            records,
            &ListQuery::new().sorted_by("updatedAt", SortOrder::Desc),
        )
        .unwrap();
        assert_eq!(page.data[0].text("university"), Some("MIT"));
    }
}
