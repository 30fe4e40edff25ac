//! Spreadsheet report reader (xlsx, xlsm, xlsb, xls, ods)

use calamine::{open_workbook_auto, Data, OdsError, Reader, XlsError, XlsbError, XlsxError};
use std::path::Path;

use super::{CellValue, RawReport};
use crate::types::*;

/// Read the first worksheet of a workbook. The first non-blank row holds the headers.
pub fn read_workbook(path: &Path) -> FlowResult<RawReport> {
    let mut workbook = open_workbook_auto(path).map_err(|e| open_error(path, e))?;

    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| FlowError::Parse(format!("no worksheet found in {}", path.display())))?;

    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| FlowError::Parse(format!("failed to read worksheet '{first_sheet}': {e}")))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(to_cell).collect::<Vec<_>>())
        .skip_while(|cells| cells.iter().all(CellValue::is_empty));

    let headers = rows
        .next()
        .map(|cells| cells.iter().map(|c| c.to_string()).collect::<Vec<_>>())
        .ok_or_else(|| FlowError::Parse(format!("worksheet '{first_sheet}' is empty")))?;

    let mut report = RawReport::new(headers);
    for cells in rows {
        report.push_positional(cells);
    }

    Ok(report)
}

/// I/O failures arrive wrapped in the format-specific error of each reader
fn open_error(path: &Path, err: calamine::Error) -> FlowError {
    match err {
        calamine::Error::Io(io)
        | calamine::Error::Xlsx(XlsxError::Io(io))
        | calamine::Error::Xlsb(XlsbError::Io(io))
        | calamine::Error::Xls(XlsError::Io(io))
        | calamine::Error::Ods(OdsError::Io(io)) => FlowError::Io(io),
        other => FlowError::Parse(format!("failed to open workbook {}: {other}", path.display())),
    }
}

fn to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        // as_datetime honours the workbook's 1900 or 1904 epoch
        Data::DateTime(dt) if !dt.is_duration() => dt
            .as_datetime()
            .map(|d| CellValue::Date(d.date()))
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::Error(_) => CellValue::Empty,
        other => CellValue::text(other.to_string()),
    }
}
