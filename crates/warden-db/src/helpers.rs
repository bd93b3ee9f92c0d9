//! Row-to-entity parsing and timestamp formatting helpers.
//!
//! All timestamps are stored as fixed-width RFC 3339 text
//! (microsecond precision, `Z` suffix) so that string comparison in SQL
//! agrees with chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::DatabaseError;

/// Format a timestamp for storage and for SQL comparison parameters.
#[must_use]
pub fn fmt_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// The deletion-time sentinel of a domain that has never been deleted.
///
/// Far enough in the future that `deletion_time > now` holds for any
/// realistic clock; a domain is active exactly when that comparison holds.
#[must_use]
pub fn end_of_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("9999-12-31T23:59:59.999999Z")
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// # Errors
///
/// Returns [`DatabaseError::Query`] if the string is not RFC 3339.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty
/// string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`;
/// nullable columns must go through `get::<Option<String>>()`.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Build a `?1, ?2, …` placeholder list for an IN clause, starting at
/// parameter index `start`.
#[must_use]
pub fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}
