//! UUID utilities
//!
//! Identifiers are stored as TEXT columns; these helpers keep the
//! conversion in one place.

use uuid::Uuid;

use crate::{Error, Result};

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse a UUID read back from a TEXT column
pub fn parse_column(column: &str, s: &str) -> Result<Uuid> {
    Uuid::parse_str(s)
        .map_err(|e| Error::Internal(format!("Invalid UUID in column {}: {}", column, e)))
}
