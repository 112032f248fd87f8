use crate::access::SpreadsheetAccess;
use crate::api::{GoogleSheetsApi, SheetsApi};
use crate::config::ServerConfig;
use anyhow::Result;
use std::sync::Arc;

pub struct AppState {
    config: Arc<ServerConfig>,
    access: SpreadsheetAccess,
}

impl AppState {
    /// Build state backed by the live Google Sheets client.
    pub fn new(config: Arc<ServerConfig>) -> Result<Self> {
        let api: Arc<dyn SheetsApi> = Arc::new(GoogleSheetsApi::from_config(&config)?);
        Ok(Self::new_with_api(config, api))
    }

    pub fn new_with_api(config: Arc<ServerConfig>, api: Arc<dyn SheetsApi>) -> Self {
        tracing::debug!(
            backend = api.name(),
            max_response_chars = ?config.max_response_chars(),
            "spreadsheet access ready"
        );
        let access = SpreadsheetAccess::new(api, config.max_response_chars());
        Self { config, access }
    }

    pub fn config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }

    pub fn access(&self) -> &SpreadsheetAccess {
        &self.access
    }
}
