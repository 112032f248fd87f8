//! Shape validation of caller-supplied value matrices.
//!
//! Runs before the access layer and reports `MalformedInput`; range syntax is
//! validated later, by the access layer, as `InvalidRange`.

use crate::errors::{Result, SheetsError};
use crate::model::{CellMatrix, CellValue};
use serde_json::Value;

/// Human label for a target range, used in validation messages.
pub fn range_label(sheet_name: &str, range: Option<&str>) -> String {
    match range.map(str::trim).filter(|r| !r.is_empty()) {
        None => sheet_name.to_string(),
        Some(range) if range.contains('!') => range.to_string(),
        Some(range) => format!("{sheet_name}!{range}"),
    }
}

/// Convert loosely typed rows into a `CellMatrix`.
///
/// Rejects an empty matrix, rows that are not arrays, empty rows, and cells
/// that are not scalars.
pub fn matrix_from_json(label: &str, rows: Vec<Value>) -> Result<CellMatrix> {
    if rows.is_empty() {
        return Err(SheetsError::malformed(format!(
            "values for range '{label}' must be a non-empty array of rows"
        )));
    }

    rows.into_iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let row_number = row_idx + 1;
            let Value::Array(cells) = row else {
                return Err(SheetsError::malformed(format!(
                    "row {row_number} of range '{label}' must be an array of cell values"
                )));
            };
            if cells.is_empty() {
                return Err(SheetsError::malformed(format!(
                    "row {row_number} of range '{label}' must contain at least one cell"
                )));
            }
            cells
                .into_iter()
                .enumerate()
                .map(|(col_idx, cell)| {
                    cell_from_json(cell).ok_or_else(|| {
                        SheetsError::malformed(format!(
                            "cell {} in row {row_number} of range '{label}' must be a string, number, boolean or null",
                            col_idx + 1
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}

fn cell_from_json(value: Value) -> Option<CellValue> {
    match value {
        Value::Null => Some(CellValue::Empty),
        Value::Bool(b) => Some(CellValue::Bool(b)),
        Value::Number(n) => n.as_f64().map(CellValue::Number),
        Value::String(s) => Some(CellValue::Text(s)),
        Value::Array(_) | Value::Object(_) => None,
    }
}
