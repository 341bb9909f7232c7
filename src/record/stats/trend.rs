//! Month-over-month trend arithmetic.

use chrono::{DateTime, Utc};

use super::types::{Trend, TrendDirection, TrendPoint};
use crate::utils::dates::{month_key, shift_month};

/// Compare this month's count against last month's.
#[must_use]
pub fn compare_months(this_month: usize, last_month: usize) -> Trend {
    let this = i64::try_from(this_month).unwrap_or(i64::MAX);
    let last = i64::try_from(last_month).unwrap_or(i64::MAX);
    let change = this.saturating_sub(last);

    let percentage = if last > 0 {
        #[allow(clippy::cast_precision_loss)]
        let ratio = change as f64 / last as f64;
        round_to(ratio * 100.0, 1)
    } else if this > 0 {
        100.0
    } else {
        0.0
    };

    let direction = match change.signum() {
        1 => TrendDirection::Up,
        -1 => TrendDirection::Down,
        _ => TrendDirection::Stable,
    };

    Trend {
        change,
        percentage,
        direction,
    }
}

/// Bucket `dates` into the last `months` calendar months, oldest first.
///
/// Dates outside the window are ignored.
#[must_use]
pub fn monthly_series(
    dates: &[DateTime<Utc>],
    months: usize,
    now: DateTime<Utc>,
) -> Vec<TrendPoint> {
    let months = i32::try_from(months).unwrap_or(i32::MAX);
    (0..months)
        .rev()
        .map(|back| {
            let start = shift_month(now, -back);
            let end = shift_month(now, 1 - back);
            TrendPoint {
                month: month_key(start),
                count: dates.iter().filter(|d| **d >= start && **d < end).count(),
            }
        })
        .collect()
}

/// Round half away from zero to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
