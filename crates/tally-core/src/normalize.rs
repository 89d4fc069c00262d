//! Read-time projection of stored transactions into the canonical shape.
//!
//! Normalization never mutates the stored record: it is applied on every
//! read, so legacy records keep their bytes until the user edits them (at
//! which point the autosave path writes the canonical shape back).

use chrono::NaiveDate;

use crate::storage::{Entry, RawEntry};

/// Project a stored transaction, in either on-disk shape, onto [`Entry`].
///
/// Rules:
/// - a legacy `type` tag forces the sign regardless of the stored one:
///   `debt` is a positive magnitude, `payment` a negative one; an
///   unrecognized tag contributes nothing (amount 0)
/// - without a tag, the raw amount is used as-is
/// - amounts are truncated toward zero; missing or non-numeric amounts
///   normalize to 0
/// - `comment` falls back to the legacy `note`, always trimmed
/// - the date is truncated to calendar-day precision; absent or malformed
///   dates become `today`, which the caller supplies so this stays a pure
///   function
///
/// A record without a resolvable `debtorId` still normalizes; dropping it
/// is the caller's job.
pub fn normalize_entry(raw: &RawEntry, today: NaiveDate) -> Entry {
    let magnitude = raw_amount(raw.amount.as_ref());
    let amount = match raw.kind.as_deref().map(str::trim) {
        Some("debt") => magnitude.abs(),
        Some("payment") => -magnitude.abs(),
        Some(_) => 0,
        None => magnitude,
    };

    let comment = raw
        .comment
        .as_deref()
        .or(raw.note.as_deref())
        .unwrap_or("")
        .trim()
        .to_string();

    let date = raw.date.as_deref().and_then(parse_day).unwrap_or(today);

    Entry {
        id: raw.id.clone(),
        debtor_id: raw.debtor_id.trim().to_string(),
        date,
        amount,
        comment,
    }
}

fn raw_amount(value: Option<&serde_json::Value>) -> i64 {
    let numeric = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if numeric.is_finite() {
        numeric.trunc() as i64
    } else {
        0
    }
}

/// Parse the leading `YYYY-MM-DD` of a stored date string. Accepts full
/// RFC 3339 timestamps by truncation.
fn parse_day(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
