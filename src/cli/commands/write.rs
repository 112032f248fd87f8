use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::path::Path;

use super::open_state;
use crate::cli::ConnectionArgs;
use crate::tools;
use crate::tools::{AddSheetParams, UpdateValuesParams};

pub async fn write(
    connection: ConnectionArgs,
    spreadsheet: String,
    sheet: String,
    range: String,
    values: String,
) -> Result<Value> {
    let rows = parse_rows_arg(&values)?;
    let state = open_state(connection)?;
    let response = tools::update_values(
        state,
        UpdateValuesParams {
            spreadsheet,
            sheet_name: sheet,
            range,
            values: rows,
        },
    )
    .await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn add_sheet(
    connection: ConnectionArgs,
    spreadsheet: String,
    title: String,
    rows: Option<u64>,
    columns: Option<u64>,
) -> Result<Value> {
    let state = open_state(connection)?;
    let response = tools::add_sheet(
        state,
        AddSheetParams {
            spreadsheet,
            title,
            row_count: rows,
            column_count: columns,
        },
    )
    .await?;
    Ok(serde_json::to_value(response)?)
}

/// Accepts inline JSON or `@path` to a JSON file.
pub fn parse_rows_arg(raw: &str) -> Result<Vec<Value>> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("failed to read values file {path:?}"))?,
        None => raw.to_string(),
    };
    let parsed: Value = serde_json::from_str(&text).context("values must be valid JSON")?;
    match parsed {
        Value::Array(rows) => Ok(rows),
        _ => bail!("values must be a JSON array of rows, for example: [[1, 2], [3, 4]]"),
    }
}
