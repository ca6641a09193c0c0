//! Literal parsing: raw filter strings into typed field values

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::core::field::{FieldKind, FieldValue};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// Strip one pair of surrounding quotes
fn unquote(raw: &str) -> &str {
    let raw = raw.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = raw.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    raw
}

/// Parse a date or timestamp literal.
///
/// Accepts RFC 3339, `YYYY-MM-DD`, and `YYYY-MM-DD[T ]HH:MM[:SS[.f]]`.
/// Literals without an offset are read as UTC.
pub fn parse_date_literal(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = unquote(raw);

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc).fixed_offset())
}

/// Normalize a parsed timestamp to the precision of a date-like field.
///
/// - `Date` keeps the calendar date
/// - `DateTime` keeps the calendar date, at midnight
/// - `Timestamp` keeps full precision
pub fn normalize_date(ts: DateTime<FixedOffset>, kind: FieldKind) -> Option<FieldValue> {
    match kind {
        FieldKind::Date => Some(FieldValue::Date(ts.date_naive())),
        FieldKind::DateTime => ts
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(FieldValue::DateTime),
        FieldKind::Timestamp => Some(FieldValue::Timestamp(ts)),
        _ => None,
    }
}

/// Resolve an enum literal: exact name, case-insensitive name, or ordinal
pub fn parse_enum(raw: &str, variants: &[&str]) -> Option<usize> {
    let raw = unquote(raw);
    if let Some(idx) = variants.iter().position(|v| *v == raw) {
        return Some(idx);
    }
    if let Some(idx) = variants.iter().position(|v| v.eq_ignore_ascii_case(raw)) {
        return Some(idx);
    }
    raw.parse::<usize>().ok().filter(|idx| *idx < variants.len())
}

/// Convert a raw literal into a value of the given field kind.
///
/// Returns `None` when the literal cannot represent a value of that kind.
pub fn coerce(raw: &str, kind: FieldKind) -> Option<FieldValue> {
    match kind {
        FieldKind::String => Some(FieldValue::String(raw.to_string())),
        FieldKind::Integer => unquote(raw).parse::<i64>().ok().map(FieldValue::Integer),
        FieldKind::Float => unquote(raw)
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(FieldValue::Float),
        FieldKind::Boolean => match unquote(raw).to_lowercase().as_str() {
            "true" => Some(FieldValue::Boolean(true)),
            "false" => Some(FieldValue::Boolean(false)),
            _ => None,
        },
        FieldKind::Enum(variants) => parse_enum(raw, variants).map(FieldValue::Enum),
        FieldKind::Date | FieldKind::DateTime | FieldKind::Timestamp => {
            parse_date_literal(raw).and_then(|ts| normalize_date(ts, kind))
        }
        FieldKind::Localized | FieldKind::Relation | FieldKind::Collection => None,
    }
}

/// Split a bracketed list literal: `[1, 2, "three"]` → `["1", "2", "three"]`.
///
/// Brackets are optional, surrounding quotes are stripped from each element
/// and blank elements are dropped.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_matches(|c| c == '[' || c == ']')
        .split(',')
        .map(|item| unquote(item).trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
