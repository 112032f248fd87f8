//! Plain-text rendering of tool results.

use crate::model::{
    BatchUpdateOutcome, CellMatrix, SheetDescriptor, SpreadsheetSnapshot, UpdateOutcome,
};
use std::fmt::Write;

pub fn render_snapshot(snapshot: &SpreadsheetSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Spreadsheet: {}", snapshot.title);
    let _ = writeln!(out, "ID: {}", snapshot.id);
    if let Some(locale) = &snapshot.locale {
        let _ = writeln!(out, "Locale: {locale}");
    }
    if let Some(time_zone) = &snapshot.time_zone {
        let _ = writeln!(out, "Time zone: {time_zone}");
    }
    let _ = writeln!(out, "Sheets ({}):", snapshot.sheets.len());
    for sheet in &snapshot.sheets {
        let _ = writeln!(
            out,
            "- {} (sheetId: {}, {} rows x {} columns)",
            sheet.title, sheet.sheet_id, sheet.row_count, sheet.column_count
        );
    }
    out.trim_end().to_string()
}

/// One JSON array per row so that types survive the trip through text.
pub fn render_values(label: &str, values: &CellMatrix) -> String {
    if values.is_empty() {
        return format!("No data found in range '{label}'.");
    }

    let width = values.iter().map(Vec::len).max().unwrap_or(0);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Range '{label}': {} rows x {} columns",
        values.len(),
        width
    );
    for row in values {
        let encoded = serde_json::to_string(row).unwrap_or_else(|_| "[]".to_string());
        let _ = writeln!(out, "{encoded}");
    }
    out.trim_end().to_string()
}

pub fn render_update(label: &str, outcome: &UpdateOutcome) -> String {
    let target = outcome.updated_range.as_deref().unwrap_or(label);
    format!(
        "Updated range '{target}': {} rows, {} columns, {} cells",
        outcome.updated_rows, outcome.updated_columns, outcome.updated_cells
    )
}

pub fn render_batch(range_count: usize, outcome: &BatchUpdateOutcome) -> String {
    format!(
        "Batch update applied to {range_count} ranges across {} sheets: {} rows, {} columns, {} cells",
        outcome.updated_sheets, outcome.updated_rows, outcome.updated_columns, outcome.updated_cells
    )
}

pub fn render_new_sheet(sheet: &SheetDescriptor) -> String {
    format!(
        "Added sheet '{}' (sheetId: {}, index: {}, {} rows x {} columns)",
        sheet.title, sheet.sheet_id, sheet.index, sheet.row_count, sheet.column_count
    )
}
