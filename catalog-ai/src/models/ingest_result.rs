//! Ingestion results and row-level errors

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Problem with a single spreadsheet row
///
/// Row errors are reported alongside a successful result; they never abort
/// the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// Spreadsheet row number (the header row is row 1)
    pub row: usize,
    pub message: String,
}

impl RowError {
    pub fn missing_name(row: usize) -> Self {
        Self {
            row,
            message: "Missing product name".to_string(),
        }
    }

    pub fn duplicate_barcode(row: usize, barcode: &str) -> Self {
        Self {
            row,
            message: format!("Duplicate barcode: {}", barcode),
        }
    }

    pub fn invalid_images(row: usize) -> Self {
        Self {
            row,
            message: "Invalid format for images (should be string)".to_string(),
        }
    }
}

/// Outcome of one upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionResult {
    pub upload_id: Uuid,
    /// Products created
    pub count: usize,
    /// Data rows in the file
    pub total_rows: usize,
    pub errors: Vec<RowError>,
}
