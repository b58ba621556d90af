//! Spreadsheet parser
//!
//! Turns uploaded bytes (CSV text or an office workbook) into ordered rows
//! of header → cell value. Empty cells are left out of a row, so the full
//! header list is the union of keys over all rows.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use catalog_common::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;
use std::path::Path;

const PARSE_FAILED: &str = "Failed to parse file. Ensure it is a valid CSV or Excel format.";
const EMPTY_FILE: &str = "File is empty or has invalid format.";

/// Typed cell value
///
/// CSV cells are always `Text`; workbook cells keep their stored type so
/// callers can tell a number from a string.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Integer(i) => write!(f, "{}", i),
            // Whole floats print without a trailing ".0" (barcodes stored as numbers)
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// One data row: header → value for each non-empty cell, in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    cells: Vec<(String, CellValue)>,
}

impl SheetRow {
    pub fn new(cells: Vec<(String, CellValue)>) -> Self {
        Self { cells }
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(header, _)| header.as_str())
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, value)| value)
    }

    /// Find this row's own header matching `target` case-insensitively
    pub fn resolve_key(&self, target: &str) -> Option<&str> {
        let target = target.to_lowercase();
        self.headers().find(|header| header.to_lowercase() == target)
    }

    /// Value under the header matching `target` case-insensitively
    pub fn get_ci(&self, target: &str) -> Option<&CellValue> {
        self.resolve_key(target).and_then(|key| self.get(key))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Parsed table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSheet {
    /// Union of row keys, ordered by first appearance
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Csv,
    Workbook,
}

/// Decide the format from the file extension, sniffing the bytes when the
/// extension does not say
pub fn detect_format(file_name: &str, bytes: &[u8]) -> Result<SpreadsheetFormat> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("csv") | Some("txt") => return Ok(SpreadsheetFormat::Csv),
        Some("xlsx") | Some("xlsm") | Some("xlsb") | Some("xls") | Some("ods") => {
            return Ok(SpreadsheetFormat::Workbook)
        }
        _ => {}
    }

    if let Some(kind) = infer::get(bytes) {
        tracing::debug!(mime = kind.mime_type(), "Sniffed upload type");
        if matches!(kind.extension(), "xlsx" | "xls" | "ods" | "zip") {
            return Ok(SpreadsheetFormat::Workbook);
        }
    }

    if std::str::from_utf8(bytes).is_ok() {
        return Ok(SpreadsheetFormat::Csv);
    }

    Err(Error::Parse(PARSE_FAILED.to_string()))
}

/// Parse uploaded bytes into rows
///
/// Fails with [`Error::Parse`] when the bytes are not a supported format or
/// when the table holds no data rows.
pub fn parse_spreadsheet(file_name: &str, bytes: &[u8]) -> Result<ParsedSheet> {
    let sheet = match detect_format(file_name, bytes)? {
        SpreadsheetFormat::Csv => parse_csv(bytes)?,
        SpreadsheetFormat::Workbook => parse_workbook(bytes)?,
    };

    if sheet.rows.is_empty() {
        return Err(Error::Parse(EMPTY_FILE.to_string()));
    }

    Ok(sheet)
}

fn parse_csv(bytes: &[u8]) -> Result<ParsedSheet> {
    let text = std::str::from_utf8(bytes).map_err(|_| Error::Parse(PARSE_FAILED.to_string()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| {
            tracing::debug!(error = %e, "CSV decode failed");
            Error::Parse(PARSE_FAILED.to_string())
        })?;

        grid.push(
            record
                .iter()
                .map(|field| (!field.is_empty()).then(|| CellValue::Text(field.to_string())))
                .collect(),
        );
    }

    Ok(build_sheet(grid))
}

fn parse_workbook(bytes: &[u8]) -> Result<ParsedSheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|e| {
        tracing::debug!(error = %e, "Workbook decode failed");
        Error::Parse(PARSE_FAILED.to_string())
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_owned();

    // First sheet that actually holds data rows
    for sheet_name in sheet_names {
        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            tracing::debug!(sheet = %sheet_name, error = %e, "Worksheet read failed");
            Error::Parse(PARSE_FAILED.to_string())
        })?;

        let grid = range
            .rows()
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();

        let sheet = build_sheet(grid);
        if !sheet.rows.is_empty() {
            tracing::debug!(sheet = %sheet_name, rows = sheet.rows.len(), "Using worksheet");
            return Ok(sheet);
        }
    }

    Ok(ParsedSheet::default())
}

fn cell_from_data(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Int(i) => Some(CellValue::Integer(*i)),
        Data::Float(f) => Some(CellValue::Float(*f)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        other => Some(CellValue::Text(other.to_string())),
    }
}

/// First grid row is the header row; the rest become data rows
fn build_sheet(grid: Vec<Vec<Option<CellValue>>>) -> ParsedSheet {
    let mut grid = grid.into_iter();
    let Some(header_cells) = grid.next() else {
        return ParsedSheet::default();
    };

    let column_names = unique_headers(
        header_cells
            .iter()
            .map(|cell| cell.as_ref().map(|c| c.to_string()).unwrap_or_default()),
    );

    let mut headers: Vec<String> = Vec::new();
    let mut rows = Vec::new();

    for cells in grid {
        // Cells past the header row's width have no column name and are dropped
        let row = SheetRow::new(
            cells
                .into_iter()
                .zip(column_names.iter())
                .filter_map(|(cell, name)| cell.map(|value| (name.clone(), value)))
                .collect(),
        );

        if row.is_empty() {
            continue;
        }

        for header in row.headers() {
            if !headers.iter().any(|h| h == header) {
                headers.push(header.to_string());
            }
        }
        rows.push(row);
    }

    ParsedSheet { headers, rows }
}

/// Trim header labels, name blank ones `__EMPTY` and suffix repeats with
/// `_1`, `_2`, ... so that no column is lost
fn unique_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    raw.map(|label| {
        let label = label.trim();
        let base = if label.is_empty() { "__EMPTY".to_string() } else { label.to_string() };

        let count = seen.entry(base.clone()).or_insert(0);
        let name = if *count == 0 { base } else { format!("{}_{}", base, count) };
        *count += 1;
        name
    })
    .collect()
}
