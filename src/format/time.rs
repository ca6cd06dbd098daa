// SPDX-License-Identifier: MIT
//! Timestamp rendering: absolute and relative.

use chrono::{DateTime, Local, Utc};

/// Copy shown wherever a repo has no poll history yet.
pub const AWAITING_FIRST_POLL: &str = "Awaiting first poll";

/// Bucket boundaries in milliseconds, largest first.
const THRESHOLDS: &[(i64, &str)] = &[
    (365 * 24 * 60 * 60 * 1000, "year"),
    (30 * 24 * 60 * 60 * 1000, "month"),
    (7 * 24 * 60 * 60 * 1000, "week"),
    (24 * 60 * 60 * 1000, "day"),
    (60 * 60 * 1000, "hour"),
    (60 * 1000, "minute"),
];

/// Absolute rendering in local time. A missing value gets the awaiting
/// copy; an unparseable one passes through verbatim rather than erroring,
/// since a bad timestamp is not a reason to break a table row.
pub fn format_timestamp(value: Option<&str>) -> String {
    let Some(raw) = value.filter(|v| !v.is_empty()) else {
        return AWAITING_FIRST_POLL.to_string();
    };

    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Relative rendering against `now`: "2 hours ago", "in 3 days",
/// "just now" under one second. Same fallbacks as [`format_timestamp`].
pub fn format_relative_time(value: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(raw) = value.filter(|v| !v.is_empty()) else {
        return AWAITING_FIRST_POLL.to_string();
    };

    let Ok(parsed) = DateTime::parse_from_rfc3339(raw) else {
        return raw.to_string();
    };

    let diff_ms = parsed
        .with_timezone(&Utc)
        .signed_duration_since(now)
        .num_milliseconds();

    for &(limit, unit) in THRESHOLDS {
        if diff_ms.abs() >= limit {
            let amount = (diff_ms as f64 / limit as f64).round() as i64;
            return relative_label(amount, unit);
        }
    }

    let seconds = (diff_ms as f64 / 1000.0).round() as i64;
    if seconds == 0 {
        return "just now".to_string();
    }
    relative_label(seconds, "second")
}

fn relative_label(amount: i64, unit: &str) -> String {
    let magnitude = amount.abs();
    let plural = if magnitude == 1 { "" } else { "s" };
    if amount < 0 {
        format!("{magnitude} {unit}{plural} ago")
    } else {
        format!("in {magnitude} {unit}{plural}")
    }
}
