//! CSV report reader

use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;

use super::{CellValue, RawReport};
use crate::types::*;

/// Read a CSV report from disk; the first record holds the headers
pub fn read_csv_file(path: &Path) -> FlowResult<RawReport> {
    let file = std::fs::File::open(path)?;
    read_csv(file)
}

/// Read a CSV report from any reader
pub fn read_csv<R: Read>(reader: R) -> FlowResult<RawReport> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(FlowError::Parse("CSV report has no header row".to_string()));
    }

    let mut report = RawReport::new(headers);
    for record in rdr.records() {
        let record = record?;
        report.push_positional(record.iter().map(CellValue::text).collect());
    }

    Ok(report)
}
