// ============================================================
// TABULAR INFRASTRUCTURE LAYER
// ============================================================
// Byte-level readers for delimited text and spreadsheets

mod delimited_reader;
mod spreadsheet_reader;

pub use delimited_reader::{decode_text, DelimitedReader};
pub use spreadsheet_reader::SpreadsheetReader;

use crate::domain::error::Result;
use crate::domain::patient_data::{RawTable, SourceFormat};

/// Read raw upload bytes with the reader matching `format`.
pub fn read_table(format: SourceFormat, bytes: Vec<u8>) -> Result<RawTable> {
    match format {
        SourceFormat::Delimited { delimiter } => {
            DelimitedReader::new().with_delimiter(delimiter).read(&bytes)
        }
        SourceFormat::Spreadsheet => SpreadsheetReader::new().read(bytes),
    }
}

/// Blank header cells get a positional placeholder name.
fn header_label(index: usize, raw: &str) -> String {
    if raw.trim().is_empty() {
        format!("Unnamed: {}", index)
    } else {
        raw.to_string()
    }
}
