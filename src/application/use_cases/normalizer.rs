// ============================================================
// NORMALIZER USE CASE
// ============================================================
// Raw upload bytes -> Dataset with standardized columns and explicit
// missing values

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::domain::error::{AppError, Result};
use crate::domain::patient_data::{Dataset, FieldValue, RawTable, Record, SourceFormat};
use crate::infrastructure::tabular::read_table;

/// Known column spellings, keyed by their normalized form.
static COLUMN_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("glucose_(mg/dl)", "glucose_mg_dl"),
        ("insulin_(uu/ml)", "insulin_uu_ml"),
        ("a1c_(%)", "a1c_percent"),
    ])
});

/// Cell texts that mean "no value". Matched exactly and case-sensitively.
const MISSING_SENTINELS: [&str; 3] = ["missing", "N/A", "n/a"];

/// Trim, lowercase, spaces to underscores.
pub fn normalize_column_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Normalized name with the alias table applied.
pub fn canonical_column_name(raw: &str) -> String {
    let normalized = normalize_column_name(raw);
    match COLUMN_ALIASES.get(normalized.as_str()) {
        Some(alias) => alias.to_string(),
        None => normalized,
    }
}

pub fn is_missing_sentinel(value: &str) -> bool {
    MISSING_SENTINELS.contains(&value)
}

/// Suffix repeated names with `.1`, `.2`, ... in order of appearance.
fn dedupe_column_names(names: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        if used.insert(name.clone()) {
            out.push(name);
            continue;
        }
        let counter = counters.entry(name.clone()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{}.{}", name, counter);
            if used.insert(candidate.clone()) {
                out.push(candidate);
                break;
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Text,
}

fn parse_float(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn column_kind(rows: &[Vec<FieldValue>], column: usize) -> ColumnKind {
    let mut kind = ColumnKind::Integer;
    let mut has_text = false;

    for row in rows {
        match &row[column] {
            FieldValue::Text(s) => {
                has_text = true;
                if s.parse::<i64>().is_ok() {
                    continue;
                }
                if parse_float(s).is_some() {
                    kind = ColumnKind::Float;
                } else {
                    return ColumnKind::Text;
                }
            }
            FieldValue::Float(_) => kind = ColumnKind::Float,
            FieldValue::Integer(_) | FieldValue::Missing => {}
        }
    }

    if has_text {
        kind
    } else {
        ColumnKind::Text
    }
}

fn convert_cell(cell: &mut FieldValue, kind: ColumnKind) {
    let converted = match (&*cell, kind) {
        (FieldValue::Text(s), ColumnKind::Integer) => s.parse::<i64>().ok().map(FieldValue::Integer),
        (FieldValue::Text(s), ColumnKind::Float) => parse_float(s).map(FieldValue::Float),
        (FieldValue::Integer(v), ColumnKind::Float) => Some(FieldValue::Float(*v as f64)),
        _ => None,
    };
    if let Some(value) = converted {
        *cell = value;
    }
}

/// Normalizer for uploaded patient data files.
#[derive(Debug, Default, Clone)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse and clean an uploaded file. Every failure is reported as
    /// `AppError::DataCleaning` since the input is presumed at fault.
    pub fn normalize(&self, file_name: &str, bytes: Vec<u8>) -> Result<Dataset> {
        let format = SourceFormat::from_file_name(file_name).ok_or_else(|| {
            AppError::DataCleaning(format!(
                "Data cleaning failed: unsupported file type '{}'",
                file_name
            ))
        })?;

        let table = read_table(format, bytes).map_err(|e| {
            AppError::DataCleaning(format!("Data cleaning failed: {}", e.detail()))
        })?;

        let dataset = self.normalize_table(table);
        debug!(
            file_name,
            records = dataset.len(),
            columns = ?dataset.columns(),
            "Normalized upload"
        );
        Ok(dataset)
    }

    /// Column renaming, sentinel substitution and type inference over an
    /// already parsed table.
    pub fn normalize_table(&self, table: RawTable) -> Dataset {
        let RawTable {
            headers,
            mut rows,
            infer_types,
        } = table;

        let columns = dedupe_column_names(
            headers
                .iter()
                .map(|header| canonical_column_name(header))
                .collect(),
        );

        for cell in rows.iter_mut().flat_map(|row| row.iter_mut()) {
            if cell.as_text().is_some_and(is_missing_sentinel) {
                *cell = FieldValue::Missing;
            }
        }

        if infer_types {
            for column in 0..columns.len() {
                let kind = column_kind(&rows, column);
                if kind == ColumnKind::Text {
                    continue;
                }
                for row in rows.iter_mut() {
                    convert_cell(&mut row[column], kind);
                }
            }
        }

        let records = rows
            .into_iter()
            .map(|row| columns.iter().cloned().zip(row).collect::<Record>())
            .collect();

        Dataset::new(records)
    }
}
