// ============================================================
// DELIMITED TEXT READER
// ============================================================
// CSV/TSV parsing with BOM-aware, strict text decoding

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::{Encoding, UTF_8};

use super::header_label;
use crate::domain::error::{AppError, Result};
use crate::domain::patient_data::{FieldValue, RawTable};

/// Decode upload bytes. A byte-order mark picks the encoding and is
/// stripped; without one the input must be UTF-8. Malformed sequences fail.
pub fn decode_text(bytes: &[u8]) -> Result<String> {
    let (encoding, bom_len) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            AppError::ParseError(format!("input is not valid {} text", encoding.name()))
        })
}

/// Delimited text reader. The first record is the header row.
pub struct DelimitedReader {
    /// Delimiter character (default: comma)
    delimiter: u8,
}

impl Default for DelimitedReader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl DelimitedReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn read(&self, bytes: &[u8]) -> Result<RawTable> {
        let content = decode_text(bytes)?;
        self.read_content(&content)
    }

    /// Parse decoded text. Cells are not trimmed; empty cells become
    /// missing; short rows are padded, long rows are rejected.
    pub fn read_content(&self, content: &str) -> Result<RawTable> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .trim(Trim::None)
            .flexible(true)
            .from_reader(content.as_bytes());

        let header_record = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read header row: {}", e)))?
            .clone();

        if header_record.is_empty() {
            return Err(AppError::ParseError(
                "No columns to parse from file".to_string(),
            ));
        }

        let headers: Vec<String> = header_record
            .iter()
            .enumerate()
            .map(|(idx, raw)| header_label(idx, raw))
            .collect();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse row {}: {}", index + 1, e))
            })?;
            rows.push(self.parse_row(index, headers.len(), &record)?);
        }

        Ok(RawTable {
            headers,
            rows,
            infer_types: true,
        })
    }

    fn parse_row(
        &self,
        index: usize,
        width: usize,
        record: &StringRecord,
    ) -> Result<Vec<FieldValue>> {
        if record.len() > width {
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(index as u64 + 2);
            return Err(AppError::ParseError(format!(
                "Expected {} fields in line {}, saw {}",
                width,
                line,
                record.len()
            )));
        }

        let mut cells: Vec<FieldValue> = record
            .iter()
            .map(|value| {
                if value.is_empty() {
                    FieldValue::Missing
                } else {
                    FieldValue::Text(value.to_string())
                }
            })
            .collect();
        cells.resize(width, FieldValue::Missing);
        Ok(cells)
    }
}
