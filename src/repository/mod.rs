//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking.
//! Supports both SQLite and PostgreSQL backends.

pub mod context;
pub mod copy;
pub mod models;
pub mod pool;
pub mod summary;
pub mod util;

pub use context::DbContext;
pub use copy::{copy_summaries, CopyStats};
pub use pool::{is_postgres_url, DbError, DbPool};
pub use summary::SummaryRepository;
pub use util::redact_url_password;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
///
/// Accepts RFC 3339 as written by booksum and the naive
/// `YYYY-MM-DD HH:MM:SS[.ffffff]` form found in older databases (read as UTC).
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.and_utc())
        })
        .unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_formats() {
        let rfc = parse_datetime("2024-03-01T10:30:00+00:00");
        let naive = parse_datetime("2024-03-01 10:30:00.000000");
        assert_eq!(rfc, naive);
        assert_eq!(parse_datetime("not a date"), DateTime::UNIX_EPOCH);
    }
}
