pub mod input;
pub mod render;

use crate::errors::{Result, SheetsError};
use crate::model::{
    BatchUpdateOutcome, CellMatrix, NewSheetOptions, RangeUpdate, SheetDescriptor,
    SpreadsheetId, SpreadsheetSnapshot, UpdateOutcome,
};
use crate::resolver::resolve_spreadsheet_id;
use crate::state::AppState;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub use input::{matrix_from_json, range_label};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetMetadataParams {
    /// Spreadsheet sharing URL or bare ID.
    pub spreadsheet: String,
}

pub async fn get_metadata(
    state: Arc<AppState>,
    params: GetMetadataParams,
) -> Result<SpreadsheetSnapshot> {
    let id = resolve_spreadsheet_id(&params.spreadsheet)?;
    state.access().fetch_snapshot(&id).await
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetValuesParams {
    /// Spreadsheet sharing URL or bare ID.
    pub spreadsheet: String,
    /// Exact (case-sensitive) sheet title.
    pub sheet_name: String,
    /// A1 range such as `A1:C10`; omit to read the whole sheet.
    #[serde(default)]
    pub range: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GetValuesResponse {
    pub spreadsheet_id: SpreadsheetId,
    pub range: String,
    pub values: CellMatrix,
}

pub async fn get_values(
    state: Arc<AppState>,
    params: GetValuesParams,
) -> Result<GetValuesResponse> {
    let id = resolve_spreadsheet_id(&params.spreadsheet)?;
    let values = state
        .access()
        .read_values(&id, &params.sheet_name, params.range.as_deref())
        .await?;
    Ok(GetValuesResponse {
        range: range_label(&params.sheet_name, params.range.as_deref()),
        spreadsheet_id: id,
        values,
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateValuesParams {
    /// Spreadsheet sharing URL or bare ID.
    pub spreadsheet: String,
    pub sheet_name: String,
    /// Target A1 range, e.g. `A1:B2`.
    pub range: String,
    /// Rows of cell values. Strings starting with `=` are stored as formulas.
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct UpdateValuesResponse {
    pub spreadsheet_id: SpreadsheetId,
    pub range: String,
    #[serde(flatten)]
    pub outcome: UpdateOutcome,
}

pub async fn update_values(
    state: Arc<AppState>,
    params: UpdateValuesParams,
) -> Result<UpdateValuesResponse> {
    let id = resolve_spreadsheet_id(&params.spreadsheet)?;
    let label = range_label(&params.sheet_name, Some(&params.range));
    let values = matrix_from_json(&label, params.values)?;
    let outcome = state
        .access()
        .write_values(&id, &params.sheet_name, Some(&params.range), &values)
        .await?;
    Ok(UpdateValuesResponse {
        spreadsheet_id: id,
        range: label,
        outcome,
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RangeUpdateParams {
    pub sheet_name: String,
    /// A1 range; omit to target the whole sheet.
    #[serde(default)]
    pub range: Option<String>,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BatchUpdateValuesParams {
    /// Spreadsheet sharing URL or bare ID.
    pub spreadsheet: String,
    /// Applied atomically after every sheet and range is validated.
    pub updates: Vec<RangeUpdateParams>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct BatchUpdateValuesResponse {
    pub spreadsheet_id: SpreadsheetId,
    pub ranges: Vec<String>,
    #[serde(flatten)]
    pub outcome: BatchUpdateOutcome,
}

pub async fn batch_update_values(
    state: Arc<AppState>,
    params: BatchUpdateValuesParams,
) -> Result<BatchUpdateValuesResponse> {
    let id = resolve_spreadsheet_id(&params.spreadsheet)?;
    if params.updates.is_empty() {
        return Err(SheetsError::malformed(
            "updates must contain at least one range",
        ));
    }

    let mut ranges = Vec::with_capacity(params.updates.len());
    let mut updates = Vec::with_capacity(params.updates.len());
    for update in params.updates {
        let label = range_label(&update.sheet_name, update.range.as_deref());
        let values = matrix_from_json(&label, update.values)?;
        ranges.push(label);
        updates.push(RangeUpdate {
            sheet_name: update.sheet_name,
            range: update.range,
            values,
        });
    }

    let outcome = state.access().batch_write_values(&id, &updates).await?;
    Ok(BatchUpdateValuesResponse {
        spreadsheet_id: id,
        ranges,
        outcome,
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddSheetParams {
    /// Spreadsheet sharing URL or bare ID.
    pub spreadsheet: String,
    pub title: String,
    /// Defaults to 1000.
    #[serde(default)]
    pub row_count: Option<u64>,
    /// Defaults to 26.
    #[serde(default)]
    pub column_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct AddSheetResponse {
    pub spreadsheet_id: SpreadsheetId,
    pub sheet: SheetDescriptor,
}

pub async fn add_sheet(state: Arc<AppState>, params: AddSheetParams) -> Result<AddSheetResponse> {
    let id = resolve_spreadsheet_id(&params.spreadsheet)?;
    let options = NewSheetOptions {
        row_count: params.row_count,
        column_count: params.column_count,
    };
    let sheet = state.access().add_sheet(&id, &params.title, options).await?;
    Ok(AddSheetResponse {
        spreadsheet_id: id,
        sheet,
    })
}
