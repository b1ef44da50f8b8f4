// ============================================================
// SPREADSHEET READER
// ============================================================
// First worksheet of an xlsx/xlsm/xlsb/xls/ods workbook

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};

use super::header_label;
use crate::domain::error::{AppError, Result};
use crate::domain::patient_data::{FieldValue, RawTable};

#[derive(Default)]
pub struct SpreadsheetReader;

impl SpreadsheetReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self, bytes: Vec<u8>) -> Result<RawTable> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| AppError::ParseError(format!("Failed to open spreadsheet: {}", e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::ParseError("No worksheet found".to_string()))?
            .map_err(|e| AppError::ParseError(format!("Failed to read worksheet: {}", e)))?;

        let mut rows_iter = range.rows();
        let header_row = rows_iter
            .next()
            .ok_or_else(|| AppError::ParseError("No columns to parse from file".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .enumerate()
            .map(|(idx, cell)| header_label(idx, &header_text(cell)))
            .collect();

        let rows = rows_iter
            .filter(|row| !row.iter().all(|cell| matches!(cell, Data::Empty)))
            .map(|row| {
                let mut cells: Vec<FieldValue> = row.iter().map(cell_value).collect();
                cells.resize(headers.len(), FieldValue::Missing);
                cells
            })
            .collect();

        Ok(RawTable {
            headers,
            rows,
            infer_types: false,
        })
    }
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// ISO-8601 text for a workbook date or duration cell.
fn date_time_text(value: &ExcelDateTime) -> String {
    if value.is_duration() {
        if let Some(duration) = value.as_duration() {
            return duration.to_string();
        }
    } else if let Some(date_time) = value.as_datetime() {
        return date_time.format("%Y-%m-%dT%H:%M:%S").to_string();
    }
    value.to_string()
}

/// Map a workbook cell to a field value. Integral floats become integers
/// since workbooks store every number as a float.
fn cell_value(cell: &Data) -> FieldValue {
    match cell {
        Data::Empty | Data::Error(_) => FieldValue::Missing,
        Data::Int(v) => FieldValue::Integer(*v),
        Data::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 => {
            FieldValue::Integer(*v as i64)
        }
        Data::Float(v) if v.is_finite() => FieldValue::Float(*v),
        Data::String(s) if s.is_empty() => FieldValue::Missing,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            FieldValue::Text(s.clone())
        }
        Data::DateTime(value) => FieldValue::Text(date_time_text(value)),
        other => FieldValue::Text(other.to_string()),
    }
}
