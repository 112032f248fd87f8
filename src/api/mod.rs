use crate::errors::Result;
use crate::model::{CellMatrix, SpreadsheetId};
use async_trait::async_trait;

pub mod auth;
pub mod google;
pub mod types;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use google::GoogleSheetsApi;
pub use types::{
    BatchUpdateSpreadsheetResponse, BatchUpdateValuesRequest, BatchUpdateValuesResponse,
    SpreadsheetMetadata, StructuralRequest, UpdateValuesResponse, ValueInputOption, ValueRange,
};

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// The outbound call shapes the access layer issues against the remote
/// spreadsheet service. Implementations must be safe for concurrent use;
/// none of them retry.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// `spreadsheets.get` restricted to the given field mask.
    async fn get_metadata(&self, id: &SpreadsheetId, fields: &str)
    -> Result<SpreadsheetMetadata>;

    async fn get_values(&self, id: &SpreadsheetId, range: &str) -> Result<ValueRange>;

    async fn update_values(
        &self,
        id: &SpreadsheetId,
        range: &str,
        values: &CellMatrix,
        input_option: ValueInputOption,
    ) -> Result<UpdateValuesResponse>;

    async fn batch_update_values(
        &self,
        id: &SpreadsheetId,
        request: &BatchUpdateValuesRequest,
    ) -> Result<BatchUpdateValuesResponse>;

    /// `spreadsheets.batchUpdate` carrying structural requests.
    async fn batch_update(
        &self,
        id: &SpreadsheetId,
        requests: &[StructuralRequest],
    ) -> Result<BatchUpdateSpreadsheetResponse>;

    fn name(&self) -> &'static str;
}
