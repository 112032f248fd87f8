#![allow(dead_code)]

use async_trait::async_trait;
use gsheets_mcp::api::SheetsApi;
use gsheets_mcp::api::types::{
    AddSheetReply, BatchUpdateSpreadsheetResponse, BatchUpdateValuesRequest,
    BatchUpdateValuesResponse, GridProperties, Reply, Sheet, SheetProperties,
    SpreadsheetMetadata, SpreadsheetProperties, StructuralRequest, UpdateValuesResponse,
    ValueInputOption, ValueRange,
};
use gsheets_mcp::config::ServerConfig;
use gsheets_mcp::errors::{Result, SheetsError};
use gsheets_mcp::model::{CellMatrix, SpreadsheetId};
use gsheets_mcp::state::AppState;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

pub const SPREADSHEET_ID: &str = "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms";

pub fn sharing_url() -> String {
    format!("https://docs.google.com/spreadsheets/d/{SPREADSHEET_ID}/edit#gid=0")
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetMetadata {
        id: String,
        fields: String,
    },
    GetValues {
        id: String,
        range: String,
    },
    UpdateValues {
        id: String,
        range: String,
        values: CellMatrix,
        input_option: ValueInputOption,
    },
    BatchUpdateValues {
        id: String,
        request: BatchUpdateValuesRequest,
    },
    BatchUpdate {
        id: String,
        requests: Vec<StructuralRequest>,
    },
}

impl Call {
    pub fn is_write(&self) -> bool {
        !matches!(self, Call::GetMetadata { .. } | Call::GetValues { .. })
    }
}

/// In-memory stand-in for the Sheets API that records every call.
pub struct MockSheetsApi {
    title: Option<String>,
    sheets: Mutex<Vec<String>>,
    values: Mutex<CellMatrix>,
    add_sheet_reply: Mutex<Option<BatchUpdateSpreadsheetResponse>>,
    failure: Mutex<Option<(u16, String)>>,
    calls: Mutex<Vec<Call>>,
}

impl MockSheetsApi {
    pub fn with_sheets(titles: &[&str]) -> Self {
        Self {
            title: Some("Budget".to_string()),
            sheets: Mutex::new(titles.iter().map(|t| t.to_string()).collect()),
            values: Mutex::new(Vec::new()),
            add_sheet_reply: Mutex::new(None),
            failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn untitled(mut self) -> Self {
        self.title = None;
        self
    }

    pub fn with_values(self, values: CellMatrix) -> Self {
        *self.values.lock() = values;
        self
    }

    pub fn with_add_sheet_reply(self, reply: BatchUpdateSpreadsheetResponse) -> Self {
        *self.add_sheet_reply.lock() = Some(reply);
        self
    }

    /// Every call after this one fails with the given remote status.
    pub fn failing(self, status: u16, message: &str) -> Self {
        *self.failure.lock() = Some((status, message.to_string()));
        self
    }

    /// Simulates a collaborator adding a tab outside this server.
    pub fn add_sheet_title(&self, title: &str) {
        self.sheets.lock().push(title.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn write_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().push(call);
        match self.failure.lock().as_ref() {
            Some((status, message)) => Err(SheetsError::remote(Some(*status), message.clone())),
            None => Ok(()),
        }
    }
}

fn sheet_properties(title: &str, position: usize) -> SheetProperties {
    SheetProperties {
        sheet_id: Some(position as i64 * 100),
        title: Some(title.to_string()),
        index: Some(position as i64),
        grid_properties: Some(GridProperties {
            row_count: Some(1000),
            column_count: Some(26),
        }),
    }
}

fn matrix_counts(values: &CellMatrix) -> (u64, u64, u64) {
    let rows = values.len() as u64;
    let columns = values.iter().map(Vec::len).max().unwrap_or(0) as u64;
    let cells = values.iter().map(Vec::len).sum::<usize>() as u64;
    (rows, columns, cells)
}

#[async_trait]
impl SheetsApi for MockSheetsApi {
    async fn get_metadata(
        &self,
        id: &SpreadsheetId,
        fields: &str,
    ) -> Result<SpreadsheetMetadata> {
        self.record(Call::GetMetadata {
            id: id.to_string(),
            fields: fields.to_string(),
        })?;
        Ok(SpreadsheetMetadata {
            spreadsheet_id: Some(id.to_string()),
            properties: Some(SpreadsheetProperties {
                title: self.title.clone(),
                locale: Some("en_US".to_string()),
                time_zone: Some("Europe/Berlin".to_string()),
            }),
            sheets: Some(
                self.sheets
                    .lock()
                    .iter()
                    .enumerate()
                    .map(|(position, title)| Sheet {
                        properties: Some(sheet_properties(title, position)),
                    })
                    .collect(),
            ),
        })
    }

    async fn get_values(&self, id: &SpreadsheetId, range: &str) -> Result<ValueRange> {
        self.record(Call::GetValues {
            id: id.to_string(),
            range: range.to_string(),
        })?;
        let values = self.values.lock().clone();
        Ok(ValueRange {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values: if values.is_empty() { None } else { Some(values) },
        })
    }

    async fn update_values(
        &self,
        id: &SpreadsheetId,
        range: &str,
        values: &CellMatrix,
        input_option: ValueInputOption,
    ) -> Result<UpdateValuesResponse> {
        self.record(Call::UpdateValues {
            id: id.to_string(),
            range: range.to_string(),
            values: values.clone(),
            input_option,
        })?;
        let (rows, columns, cells) = matrix_counts(values);
        Ok(UpdateValuesResponse {
            updated_range: Some(range.to_string()),
            updated_rows: Some(rows),
            updated_columns: Some(columns),
            updated_cells: Some(cells),
        })
    }

    async fn batch_update_values(
        &self,
        id: &SpreadsheetId,
        request: &BatchUpdateValuesRequest,
    ) -> Result<BatchUpdateValuesResponse> {
        self.record(Call::BatchUpdateValues {
            id: id.to_string(),
            request: request.clone(),
        })?;

        let mut responses = Vec::new();
        let mut sheets = BTreeSet::new();
        let (mut rows, mut columns, mut cells) = (0, 0, 0);
        for data in &request.data {
            let range = data.range.clone().unwrap_or_default();
            let sheet = range.split('!').next().unwrap_or_default().to_string();
            sheets.insert(sheet);
            let (r, c, n) = matrix_counts(data.values.as_ref().unwrap_or(&Vec::new()));
            rows += r;
            columns += c;
            cells += n;
            responses.push(UpdateValuesResponse {
                updated_range: Some(range),
                updated_rows: Some(r),
                updated_columns: Some(c),
                updated_cells: Some(n),
            });
        }

        Ok(BatchUpdateValuesResponse {
            total_updated_rows: Some(rows),
            total_updated_columns: Some(columns),
            total_updated_cells: Some(cells),
            total_updated_sheets: Some(sheets.len() as u64),
            responses: Some(responses),
        })
    }

    async fn batch_update(
        &self,
        id: &SpreadsheetId,
        requests: &[StructuralRequest],
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        self.record(Call::BatchUpdate {
            id: id.to_string(),
            requests: requests.to_vec(),
        })?;

        if let Some(reply) = self.add_sheet_reply.lock().clone() {
            return Ok(reply);
        }

        let mut sheets = self.sheets.lock();
        let replies = requests
            .iter()
            .map(|request| match request {
                StructuralRequest::AddSheet { properties } => {
                    let index = sheets.len() as i64;
                    sheets.push(properties.title.clone().unwrap_or_default());
                    Reply {
                        add_sheet: Some(AddSheetReply {
                            properties: Some(SheetProperties {
                                sheet_id: Some(987_654),
                                index: Some(index),
                                ..properties.clone()
                            }),
                        }),
                    }
                }
            })
            .collect();

        Ok(BatchUpdateSpreadsheetResponse {
            spreadsheet_id: Some(id.to_string()),
            replies: Some(replies),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

pub fn matrix(rows: serde_json::Value) -> CellMatrix {
    serde_json::from_value(rows).expect("matrix literal")
}

pub fn config_with_limit(max_response_chars: Option<u64>) -> ServerConfig {
    ServerConfig {
        max_response_chars,
        ..ServerConfig::default()
    }
}

pub fn app_state(api: Arc<MockSheetsApi>) -> Arc<AppState> {
    app_state_with_config(api, ServerConfig::default())
}

pub fn app_state_with_config(api: Arc<MockSheetsApi>, config: ServerConfig) -> Arc<AppState> {
    Arc::new(AppState::new_with_api(Arc::new(config), api))
}
