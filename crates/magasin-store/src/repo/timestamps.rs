//! Store-side clock
//!
//! Timestamps are computed by SQLite inside the statement that writes them
//! and stored as INTEGER unix milliseconds. Rust code never supplies "now".

use chrono::{DateTime, Utc};
use rusqlite::Row;

/// SQL expression evaluating to the current time in unix milliseconds
pub const NOW_MS: &str = "CAST(ROUND((julianday('now') - 2440587.5) * 86400000.0) AS INTEGER)";

pub fn to_millis(at: &DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub fn from_millis(ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms).ok_or(rusqlite::Error::IntegralValueOutOfRange(0, ms))
}

/// Read a non-null millisecond column as a timestamp
pub fn get_datetime(row: &Row<'_>, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    from_millis(row.get(column)?)
}

pub fn get_opt_datetime(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<DateTime<Utc>>> {
    row.get::<_, Option<i64>>(column)?
        .map(from_millis)
        .transpose()
}
