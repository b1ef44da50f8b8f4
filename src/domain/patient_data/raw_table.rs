use super::FieldValue;

/// Which reader a file goes through, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited { delimiter: u8 },
    Spreadsheet,
}

impl SourceFormat {
    /// Pick a format from a file name. `None` means unsupported.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Some(SourceFormat::Delimited { delimiter: b',' }),
            "tsv" => Some(SourceFormat::Delimited { delimiter: b'\t' }),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceFormat::Spreadsheet),
            _ => None,
        }
    }
}

/// Parsed but not yet normalized table.
///
/// Delimited readers yield only `Text` and `Missing` cells and set
/// `infer_types`; spreadsheet readers yield the workbook's native types.
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<FieldValue>>,
    pub infer_types: bool,
}
