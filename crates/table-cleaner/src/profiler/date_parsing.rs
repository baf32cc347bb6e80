//! Strict date/time parsing for text cells.
//!
//! A value parses only if its shape matches one of the known date layouts and
//! chrono accepts it under one of the formats below. Values carrying a UTC
//! offset are normalized to UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

// Shapes a value must have before any chrono format is tried.
static DATE_SHAPES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}[-/.]\d{1,2}[-/.]\d{1,2}$").expect("Invalid regex: year-first date"),
        Regex::new(
            r"^\d{4}-\d{1,2}-\d{1,2}[T ]\d{1,2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?$",
        )
        .expect("Invalid regex: ISO datetime"),
        Regex::new(r"^\d{4}[/.]\d{1,2}[/.]\d{1,2} \d{1,2}:\d{2}(:\d{2})?$")
            .expect("Invalid regex: year-first datetime"),
        Regex::new(r"^\d{1,2}[-/.]\d{1,2}[-/.]\d{4}( \d{1,2}:\d{2}(:\d{2})?)?$")
            .expect("Invalid regex: year-last"),
        Regex::new(r"^\d{1,2}[ -][A-Za-z]{3,9}[ -]\d{4}$").expect("Invalid regex: day month year"),
        Regex::new(r"^[A-Za-z]{3,9} \d{1,2}, \d{4}$").expect("Invalid regex: month day, year"),
    ]
});

// `Z` is rewritten to `+00:00` before these are tried.
const OFFSET_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
];

const DATETIME_FORMATS: [&str; 20] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
    "%m/%d/%Y %H:%M:%S", // US first, then European
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%m-%d-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: [&str; 14] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Parse a text cell as a timestamp.
///
/// Surrounding whitespace is ignored; empty values never parse.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !DATE_SHAPES.iter().any(|re| re.is_match(trimmed)) {
        return None;
    }

    let with_offset = match trimmed.strip_suffix('Z') {
        Some(local) => Cow::Owned(format!("{}+00:00", local)),
        None => Cow::Borrowed(trimmed),
    };
    for fmt in &OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&with_offset, fmt) {
            return Some(dt.naive_utc());
        }
    }

    for fmt in &DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }

    for fmt in &DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }

    None
}

/// Check if a text cell parses as a timestamp.
#[inline]
pub fn is_date_string(value: &str) -> bool {
    parse_timestamp(value).is_some()
}

/// Parse a text cell as a timestamp in epoch milliseconds.
pub fn parse_timestamp_millis(value: &str) -> Option<i64> {
    parse_timestamp(value).map(|dt| dt.and_utc().timestamp_millis())
}
