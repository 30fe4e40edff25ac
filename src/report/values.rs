//! Typed extraction of identifiers, dates and amounts from report cells

use bigdecimal::BigDecimal;
use chrono::{Days, NaiveDate, NaiveDateTime};
use std::str::FromStr;

use super::CellValue;

/// Largest serial Excel can represent (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Convert an Excel serial day number to a date. Time-of-day fractions are dropped.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    // Excel epoch is 1899-12-30 once the 1900 leap year bug is accounted for
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_days(Days::new(serial.floor() as u64))
}

/// Trimmed, non-empty text form of a cell
pub fn text_value(cell: &CellValue) -> Option<String> {
    let text = cell.to_string();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Parse a cell as a non-negative amount.
///
/// Accepts currency symbols, thousands separators and accounting-style
/// negatives such as `(1,250.00)`; the sign is dropped because direction
/// comes from the transaction type.
pub fn parse_amount(cell: &CellValue) -> Result<BigDecimal, String> {
    let amount = match cell {
        CellValue::Int(i) => BigDecimal::from(*i),
        CellValue::Number(n) => {
            if !n.is_finite() {
                return Err(format!("amount '{n}' is not a finite number"));
            }
            BigDecimal::from_str(&n.to_string()).map_err(|e| format!("amount '{n}': {e}"))?
        }
        CellValue::Text(raw) => parse_amount_text(raw)?,
        CellValue::Empty => return Err("amount is missing".to_string()),
        other => return Err(format!("amount '{other}' is not numeric")),
    };
    Ok(amount.abs())
}

fn parse_amount_text(raw: &str) -> Result<BigDecimal, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '€' | '£' | '¥' | '"' | '\'') && !c.is_whitespace())
        .collect();

    let unwrapped = cleaned
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .unwrap_or(&cleaned);

    if unwrapped.is_empty() {
        return Err(format!("amount '{}' is empty", raw.trim()));
    }

    BigDecimal::from_str(unwrapped).map_err(|_| format!("cannot parse amount '{}'", raw.trim()))
}

/// Parse a cell as a calendar date, trying `formats` in order for text cells
pub fn parse_date(cell: &CellValue, formats: &[String]) -> Result<NaiveDate, String> {
    match cell {
        CellValue::Date(d) => Ok(*d),
        CellValue::Int(i) => parse_numeric_date(*i as f64, &i.to_string()),
        CellValue::Number(n) => parse_numeric_date(*n, &n.to_string()),
        CellValue::Text(raw) => parse_date_text(raw.trim(), formats),
        CellValue::Empty => Err("date is missing".to_string()),
        other => Err(format!("'{other}' is not a date")),
    }
}

fn parse_numeric_date(value: f64, display: &str) -> Result<NaiveDate, String> {
    // Compact yyyymmdd integers are far beyond the Excel serial range
    if display.len() == 8 && display.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(date) = NaiveDate::parse_from_str(display, "%Y%m%d") {
            return Ok(date);
        }
    }

    excel_serial_to_date(value).ok_or_else(|| format!("'{display}' is not a valid date serial"))
}

fn parse_date_text(raw: &str, formats: &[String]) -> Result<NaiveDate, String> {
    for format in formats.iter().filter(|f| !f.trim().is_empty()) {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(datetime.date());
        }
    }

    if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit() || c == '.') {
        if let Ok(serial) = raw.parse::<f64>() {
            return parse_numeric_date(serial, raw);
        }
    }

    Err(format!("cannot parse date '{raw}'"))
}
