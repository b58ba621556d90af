//! Ingestion pipeline
//!
//! Turns a parsed spreadsheet into products for a new upload. Header
//! validation is the only hard failure; every row-level problem is
//! reported in the result and the row is skipped.

use catalog_common::db::{ColumnMapping, Product, Upload};
use catalog_common::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashSet;
use uuid::Uuid;

use super::column_mapper::{ColumnMapper, InferredMapping};
use super::completion_client::TextCompletion;
use super::spreadsheet_parser::{parse_spreadsheet, CellValue, ParsedSheet, SheetRow};
use crate::db::uploads;
use crate::models::{IngestionResult, RowError};

/// Headers every upload must carry (matched case-insensitively)
pub const REQUIRED_HEADERS: [&str; 4] = ["product name", "brand", "barcode", "images"];

/// Spreadsheet row number of the first data row (row 1 is the header)
const FIRST_DATA_ROW: usize = 2;

/// Required headers absent from `headers`, in [`REQUIRED_HEADERS`] order
pub fn missing_headers(headers: &[String]) -> Vec<&'static str> {
    let present: HashSet<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    REQUIRED_HEADERS
        .into_iter()
        .filter(|required| !present.contains(*required))
        .collect()
}

/// Fail with a validation error naming every missing required header
pub fn validate_headers(headers: &[String]) -> Result<()> {
    let missing = missing_headers(headers);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "Missing required header(s): {}",
            missing.join(", ")
        )))
    }
}

/// Products built from a sheet plus the rows that were rejected
#[derive(Debug, Default)]
pub struct RowOutcome {
    pub products: Vec<Product>,
    pub errors: Vec<RowError>,
}

/// Build products for `upload_id` from parsed rows
///
/// Barcodes are de-duplicated within this batch only; the first row with a
/// given barcode wins.
pub fn build_products(upload_id: Uuid, rows: &[SheetRow]) -> RowOutcome {
    let mut outcome = RowOutcome::default();
    let mut seen_barcodes: HashSet<String> = HashSet::new();

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + FIRST_DATA_ROW;

        let name = row
            .get_ci("Product Name")
            .or_else(|| row.get_ci("name"))
            .map(|value| value.to_string().trim().to_string())
            .filter(|name| !name.is_empty());
        let Some(name) = name else {
            outcome.errors.push(RowError::missing_name(row_number));
            continue;
        };

        let barcode = stringify(row.get_ci("barcode"));
        if !barcode.is_empty() && !seen_barcodes.insert(barcode.clone()) {
            outcome
                .errors
                .push(RowError::duplicate_barcode(row_number, &barcode));
            continue;
        }

        let images = match row.get_ci("images") {
            None => Vec::new(),
            Some(CellValue::Text(cell)) => split_images(cell),
            Some(_) => {
                outcome.errors.push(RowError::invalid_images(row_number));
                continue;
            }
        };

        let brand = stringify(row.get_ci("brand"));

        outcome
            .products
            .push(Product::new(upload_id, name, brand, barcode, images));
    }

    outcome
}

/// Split a `;`-separated image cell, dropping blank pieces
pub fn split_images(cell: &str) -> Vec<String> {
    cell.split(';')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

fn stringify(value: Option<&CellValue>) -> String {
    value
        .map(|v| v.to_string().trim().to_string())
        .unwrap_or_default()
}

/// Upload ingestion service
pub struct IngestionService<'a> {
    db: &'a SqlitePool,
    completion: &'a dyn TextCompletion,
}

impl<'a> IngestionService<'a> {
    pub fn new(db: &'a SqlitePool, completion: &'a dyn TextCompletion) -> Self {
        Self { db, completion }
    }

    /// Parse, validate and persist one uploaded file
    pub async fn ingest(&self, file_name: &str, bytes: &[u8]) -> Result<IngestionResult> {
        let sheet = parse_spreadsheet(file_name, bytes)?;
        self.ingest_sheet(file_name, sheet).await
    }

    /// Ingest an already parsed sheet
    pub async fn ingest_sheet(&self, file_name: &str, sheet: ParsedSheet) -> Result<IngestionResult> {
        validate_headers(&sheet.headers)?;

        let mapping = self.infer_mapping(&sheet.headers).await;

        let upload = Upload::new(file_name);
        let mappings: Vec<ColumnMapping> = mapping
            .into_iter()
            .map(|(field, column)| ColumnMapping::new(upload.id, field, column))
            .collect();

        let outcome = build_products(upload.id, &sheet.rows);

        uploads::save_ingestion(self.db, &upload, &mappings, &outcome.products).await?;

        tracing::info!(
            upload_id = %upload.id,
            file_name = %file_name,
            total_rows = sheet.rows.len(),
            created = outcome.products.len(),
            rejected = outcome.errors.len(),
            "Upload ingested"
        );

        Ok(IngestionResult {
            upload_id: upload.id,
            count: outcome.products.len(),
            total_rows: sheet.rows.len(),
            errors: outcome.errors,
        })
    }

    /// Advisory mapping; any failure yields an empty mapping
    async fn infer_mapping(&self, headers: &[String]) -> InferredMapping {
        match ColumnMapper::new(self.completion).infer_mapping(headers).await {
            Ok(mapping) => mapping,
            Err(e) => {
                tracing::warn!(error = %e, "Column mapping unavailable, continuing without it");
                InferredMapping::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[(&str, &str)]) -> SheetRow {
        SheetRow::new(
            cells
                .iter()
                .map(|(h, v)| (h.to_string(), CellValue::Text(v.to_string())))
                .collect(),
        )
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_headers_listed_exactly() {
        assert_eq!(
            missing_headers(&headers(&["PRODUCT NAME", "Barcode"])),
            vec!["brand", "images"]
        );
        assert!(missing_headers(&headers(&["Product Name", "brand", "BARCODE", "Images", "x"]))
            .is_empty());

        let err = validate_headers(&headers(&["Product Name", "Brand"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input: Missing required header(s): barcode, images"
        );
    }

    #[test]
    fn test_padded_headers_are_trimmed_by_the_parser() {
        let csv = " Product Name ,Brand  ,  Barcode,Images\nShirt,Acme,1,http://a.png\n";
        let sheet = parse_spreadsheet("padded.csv", csv.as_bytes()).unwrap();

        assert_eq!(sheet.headers, headers(&["Product Name", "Brand", "Barcode", "Images"]));
        assert!(validate_headers(&sheet.headers).is_ok());
    }

    #[test]
    fn test_split_images() {
        assert_eq!(
            split_images("http://a.png; http://b.png ; "),
            vec!["http://a.png".to_string(), "http://b.png".to_string()]
        );
        assert!(split_images(" ; ;").is_empty());
    }

    #[test]
    fn test_rows_numbered_from_two() {
        let rows = vec![
            text_row(&[("Product Name", "Shirt"), ("Barcode", "ABC123")]),
            text_row(&[("Brand", "Acme"), ("Barcode", "X1")]),
            text_row(&[("Product Name", "Hat"), ("Barcode", " ABC123 ")]),
        ];

        let outcome = build_products(Uuid::new_v4(), &rows);

        assert_eq!(outcome.products.len(), 1);
        assert_eq!(
            outcome.errors,
            vec![
                RowError::missing_name(3),
                RowError::duplicate_barcode(4, "ABC123"),
            ]
        );
        assert_eq!(outcome.errors[1].message, "Duplicate barcode: ABC123");
    }

    #[test]
    fn test_name_falls_back_to_name_column() {
        let rows = vec![text_row(&[("NAME", "  Scarf  "), ("brand", "Acme")])];
        let outcome = build_products(Uuid::new_v4(), &rows);

        assert_eq!(outcome.products[0].name, "Scarf");
        assert_eq!(outcome.products[0].brand, "Acme");
        assert!(outcome.products[0].attributes.is_empty());
    }

    #[test]
    fn test_whitespace_name_is_missing() {
        let outcome = build_products(Uuid::new_v4(), &[text_row(&[("Product Name", "   ")])]);
        assert!(outcome.products.is_empty());
        assert_eq!(outcome.errors[0].message, "Missing product name");
    }

    #[test]
    fn test_empty_barcodes_never_collide() {
        let rows = vec![
            text_row(&[("Product Name", "A")]),
            text_row(&[("Product Name", "B"), ("Barcode", "  ")]),
        ];
        let outcome = build_products(Uuid::new_v4(), &rows);
        assert_eq!(outcome.products.len(), 2);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_numeric_cells() {
        let rows = vec![
            SheetRow::new(vec![
                ("Product Name".into(), CellValue::Text("Mug".into())),
                ("Barcode".into(), CellValue::Float(4006381333931.0)),
            ]),
            SheetRow::new(vec![
                ("Product Name".into(), CellValue::Text("Cup".into())),
                ("Images".into(), CellValue::Integer(7)),
            ]),
        ];

        let outcome = build_products(Uuid::new_v4(), &rows);

        assert_eq!(outcome.products.len(), 1);
        assert_eq!(outcome.products[0].barcode, "4006381333931");
        assert_eq!(outcome.errors, vec![RowError::invalid_images(3)]);
        assert_eq!(
            outcome.errors[0].message,
            "Invalid format for images (should be string)"
        );
    }
}
