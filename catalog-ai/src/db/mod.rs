//! Database access for catalog-ai
//!
//! Schema creation lives in `catalog_common::db`; these modules hold the
//! queries the service runs against it.

pub mod attributes;
pub mod products;
pub mod uploads;

use chrono::{DateTime, Utc};
use catalog_common::{Error, Result};

/// Parse an RFC 3339 timestamp read back from a TEXT column
pub(crate) fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid timestamp in column {}: {}", column, e)))
}

/// Escape a user term for a `LIKE ... ESCAPE '\'` substring match
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
