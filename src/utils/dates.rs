//! Calendar helpers shared by validation, expiry and statistics.
//!
//! All calendar arithmetic is done in UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Parse a date-bearing JSON value.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.f]` timestamps
/// (read as UTC) and plain `YYYY-MM-DD` dates (midnight UTC).
#[must_use]
pub fn parse_date(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    value.as_str().and_then(parse_date_str)
}

/// String form of [`parse_date`].
#[must_use]
pub fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
}

/// Canonical stored form of a date.
#[must_use]
pub fn format_date(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Last representable instant (23:59:59.999) of the calendar day holding `dt`.
#[must_use]
pub fn end_of_day(dt: DateTime<Utc>) -> DateTime<Utc> {
    let start = start_of_day(dt);
    start + Duration::days(1) - Duration::milliseconds(1)
}

/// Midnight of the calendar day holding `dt`.
#[must_use]
pub fn start_of_day(dt: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&dt.date_naive().and_time(NaiveTime::MIN))
}

/// Midnight on the first day of the month holding `dt`.
#[must_use]
pub fn start_of_month(dt: DateTime<Utc>) -> DateTime<Utc> {
    month_start(dt.year(), dt.month()).unwrap_or_else(|| start_of_day(dt))
}

/// First instant of the month `delta` months away from the month holding `dt`.
#[must_use]
pub fn shift_month(dt: DateTime<Utc>, delta: i32) -> DateTime<Utc> {
    let month0 = i32::try_from(dt.month0()).unwrap_or(0);
    let index = dt.year() * 12 + month0 + delta;
    let year = index.div_euclid(12);
    let month = u32::try_from(index.rem_euclid(12)).unwrap_or(0) + 1;
    month_start(year, month).unwrap_or_else(|| start_of_month(dt))
}

/// `YYYY-MM` key for the month holding `dt`.
#[must_use]
pub fn month_key(dt: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", dt.year(), dt.month())
}

/// Whole days from `now` until `target`, rounding a partial day up.
#[must_use]
pub fn days_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (target - now).num_milliseconds();
    let day = Duration::days(1).num_milliseconds();
    // ceil division for positive spans; negative spans truncate toward zero
    if millis > 0 {
        (millis + day - 1) / day
    } else {
        millis / day
    }
}

fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
}
