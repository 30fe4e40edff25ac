//! Raw tabular reports as delivered by fund administrators
//!
//! A report is an ordered list of rows, each a mapping from the file's own
//! header strings to scalar cell values. The source format does not matter
//! to the reconciliation engine; CSV and spreadsheet workbooks are supported.

pub mod delimited;
pub mod values;
pub mod workbook;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::types::*;

pub use values::*;

/// A single scalar cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    Date(NaiveDate),
}

impl CellValue {
    /// Build a text cell, treating blank strings as empty
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s.trim()),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// One data row keyed by the report's raw header strings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: impl Into<String>, value: CellValue) {
        self.cells.insert(header.into(), value);
    }

    /// Cell under a header; absent cells read as empty
    pub fn get(&self, header: &str) -> &CellValue {
        self.cells.get(header).unwrap_or(&CellValue::Empty)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_empty)
    }
}

/// A loaded report: headers in file order plus data rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawReport {
    headers: Vec<String>,
    rows: Vec<RawRow>,
}

impl RawReport {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a report from headers and positional rows of cells
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut report = Self::new(headers);
        for cells in rows {
            report.push_positional(cells);
        }
        report
    }

    /// Append a row given in header order; missing trailing cells are empty
    /// and fully blank rows are ignored
    pub fn push_positional(&mut self, cells: Vec<CellValue>) {
        let mut row = RawRow::new();
        let mut cells = cells.into_iter();
        for header in &self.headers {
            row.insert(header.clone(), cells.next().unwrap_or(CellValue::Empty));
        }
        if !row.is_blank() {
            self.rows.push(row);
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load a report, picking the reader from the file extension
pub fn load_report(path: impl AsRef<Path>) -> FlowResult<RawReport> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "csv" | "txt" => delimited::read_csv_file(path),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => workbook::read_workbook(path),
        other => Err(FlowError::Parse(format!(
            "unsupported report format '.{other}' for {}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_rows_skip_blank_lines() {
        let report = RawReport::from_rows(
            vec!["ID".to_string(), "Amount".to_string()],
            vec![
                vec![CellValue::text("INV001"), CellValue::Number(10.0)],
                vec![CellValue::Empty, CellValue::text("  ")],
                vec![CellValue::text("INV002")],
            ],
        );

        assert_eq!(report.len(), 2);
        assert_eq!(report.rows()[1].get("Amount"), &CellValue::Empty);
        assert_eq!(report.rows()[0].get("Missing"), &CellValue::Empty);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Number(1001.0).to_string(), "1001");
        assert_eq!(CellValue::Number(12.5).to_string(), "12.5");
        assert_eq!(CellValue::text(" INV001 ").to_string(), "INV001");
        assert_eq!(
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).to_string(),
            "2024-03-01"
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_report("report.pdf").unwrap_err();
        assert_eq!(err.kind(), FlowErrorKind::Parse);
    }
}
