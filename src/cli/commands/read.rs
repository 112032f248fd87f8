use anyhow::Result;
use serde_json::{Value, json};

use super::open_state;
use crate::cli::ConnectionArgs;
use crate::resolver::resolve_spreadsheet_id;
use crate::tools;
use crate::tools::{GetMetadataParams, GetValuesParams};

pub fn resolve(spreadsheet: String) -> Result<Value> {
    let id = resolve_spreadsheet_id(&spreadsheet)?;
    Ok(json!({ "spreadsheet_id": id }))
}

pub async fn metadata(connection: ConnectionArgs, spreadsheet: String) -> Result<Value> {
    let state = open_state(connection)?;
    let snapshot = tools::get_metadata(state, GetMetadataParams { spreadsheet }).await?;
    Ok(serde_json::to_value(snapshot)?)
}

pub async fn read(
    connection: ConnectionArgs,
    spreadsheet: String,
    sheet: String,
    range: Option<String>,
) -> Result<Value> {
    let state = open_state(connection)?;
    let response = tools::get_values(
        state,
        GetValuesParams {
            spreadsheet,
            sheet_name: sheet,
            range,
        },
    )
    .await?;
    Ok(serde_json::to_value(response)?)
}
