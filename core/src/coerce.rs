//! Conversion of raw JSON values into richer domain values.
//!
//! NodeBB reports times as millisecond epoch integers (`joindate`,
//! `lastonline`) and occasionally as ISO 8601 strings. All date/time values
//! are produced in UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::error::{ApiError, Result};

/// Millisecond timestamps have 13 digits until the year 2286.
const MILLIS_DIGITS: usize = 13;

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// A field value after shape-driven coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    DateTime(DateTime<Utc>),
    Raw(Value),
}

impl Attr {
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Attr::DateTime(dt) => Some(*dt),
            Attr::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            Attr::Raw(value) => Some(value),
            Attr::DateTime(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_raw().and_then(Value::as_str)
    }
}

/// Coerce by shape alone: 13-digit integers (or digit strings) become
/// millisecond timestamps, `YYYY-MM-DDTHH:MM:SS[.f]Z` strings become
/// date/times, everything else passes through untouched.
pub fn coerce(value: &Value) -> Attr {
    if let Some(digits) = digits(value) {
        if digits.len() == MILLIS_DIGITS {
            if let Some(dt) = digits.parse().ok().and_then(DateTime::from_timestamp_millis) {
                return Attr::DateTime(dt);
            }
        }
    }
    if let Some(dt) = value.as_str().and_then(parse_iso) {
        return Attr::DateTime(dt);
    }
    Attr::Raw(value.clone())
}

/// Coerce a value known to be a point in time.
///
/// Integers with fewer than 13 digits are read as seconds, longer ones as
/// milliseconds. Unlike [`coerce`] this fails instead of passing through.
pub fn coerce_timestamp(field: &str, value: &Value) -> Result<DateTime<Utc>> {
    let fail = |reason: String| ApiError::Coercion {
        field: field.to_string(),
        reason,
    };

    if let Some(digits) = digits(value) {
        let n: i64 = digits
            .parse()
            .map_err(|_| fail(format!("{digits} does not fit a timestamp")))?;
        let dt = if digits.len() >= MILLIS_DIGITS {
            DateTime::from_timestamp_millis(n)
        } else {
            DateTime::from_timestamp(n, 0)
        };
        return dt.ok_or_else(|| fail(format!("{n} is out of range")));
    }

    match value {
        Value::String(s) => parse_iso(s)
            .or_else(|| {
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            })
            .ok_or_else(|| fail(format!("{s:?} is not a timestamp"))),
        other => Err(fail(format!("{other} is not a timestamp"))),
    }
}

/// Decimal digits of a non-negative integer or an all-digit string.
fn digits(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n.to_string()),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            Some(s.clone())
        }
        _ => None,
    }
}

fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, ISO_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
