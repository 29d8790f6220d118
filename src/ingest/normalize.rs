use chrono::NaiveDate;
use crate::error::{ReportError, ReportResult};

/// Parse a numeric cell that may use a comma as decimal separator.
pub fn parse_decimal(raw: &str, column: &str, row: usize) -> ReportResult<f64> {
    let normalized = raw.trim().replace(',', ".");
    normalized.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ReportError::Parse(format!(
            "Row {}: column '{}' is not numeric: '{}'",
            row, column, raw
        )))
}

pub fn parse_integer(raw: &str, column: &str, row: usize) -> ReportResult<u32> {
    raw.trim().parse::<u32>().map_err(|_| ReportError::Parse(format!(
        "Row {}: column '{}' is not a whole number: '{}'",
        row, column, raw
    )))
}

pub fn parse_date(raw: &str, format: &str, column: &str, row: usize) -> ReportResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), format).map_err(|e| ReportError::Parse(format!(
        "Row {}: column '{}' value '{}' does not match '{}': {}",
        row, column, raw, format, e
    )))
}
