//! Lenient datetime parsing and conversion into the school's timezone

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde_json::Value;

/// Timezone every datetime column is re-expressed in (UTC+8)
pub const TARGET_TZ: Tz = chrono_tz::Asia::Singapore;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a datetime string into UTC
///
/// Accepts RFC 3339, ISO 8601 with a `+hhmm` offset, naive datetimes and bare
/// dates. Values without an offset are taken to be UTC. Returns `None` for
/// anything else.
pub fn parse_utc(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Convert a JSON value into an RFC 3339 string in [`TARGET_TZ`]
///
/// Non-string and unparseable values become `null`.
pub fn to_target(value: &Value) -> Value {
    value
        .as_str()
        .and_then(parse_utc)
        .map(|dt| {
            Value::String(
                dt.with_timezone(&TARGET_TZ)
                    .to_rfc3339_opts(SecondsFormat::AutoSi, false),
            )
        })
        .unwrap_or(Value::Null)
}
