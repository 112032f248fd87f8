use crate::config::ServerConfig;
use crate::errors::SheetsError;
use crate::state::AppState;
use crate::tools::{self, render};
use anyhow::Result;
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::{
        stdio,
        streamable_http_server::{
            StreamableHttpServerConfig, StreamableHttpService,
            session::local::LocalSessionManager,
        },
    },
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

const INSTRUCTIONS: &str = "\
Google Sheets MCP: read and write cell values in Google Sheets spreadsheets.

IDENTIFIERS:
Every tool takes `spreadsheet`, which may be a full sharing URL \
(https://docs.google.com/spreadsheets/d/<ID>/edit#gid=0) or the bare ID.

WORKFLOW:
1) sheets_get_metadata to list sheet titles and grid sizes
2) sheets_get_values to read a sheet or an A1 range
3) sheets_update_values / sheets_batch_update_values to write
4) sheets_add_sheet to create a new tab

RULES:
- sheet_name must match a sheet title exactly (case-sensitive).
- Ranges use A1 notation with uppercase columns (A1, A1:C10). A range that already \
contains '!' is used as-is.
- Written values are interpreted as if typed by a user: '=SUM(A1:A3)' becomes a formula, \
'1/2/2024' may become a date.
- Batch updates validate every sheet and range first; one bad entry rejects the whole batch.
- Reads larger than the configured size ceiling are rejected; request a smaller range.";

#[derive(Clone)]
pub struct GsheetsServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<GsheetsServer>,
}

impl GsheetsServer {
    pub fn new(config: Arc<ServerConfig>) -> Result<Self> {
        let state = Arc::new(AppState::new(config)?);
        Ok(Self::from_state(state))
    }

    pub fn from_state(state: Arc<AppState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub async fn run_stdio(self) -> Result<()> {
        let service = self
            .serve(stdio())
            .await
            .inspect_err(|error| tracing::error!("serving error: {:?}", error))?;
        service.waiting().await?;
        Ok(())
    }

    pub async fn run_http(self, bind: SocketAddr) -> Result<()> {
        let service = StreamableHttpService::new(
            move || Ok(self.clone()),
            LocalSessionManager::default().into(),
            StreamableHttpServerConfig::default(),
        );
        let router = axum::Router::new().nest_service("/mcp", service);
        let listener = tokio::net::TcpListener::bind(bind).await?;
        tracing::info!(address = %bind, "serving MCP over streamable http at /mcp");

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("shutdown signal received");
            })
            .await?;
        Ok(())
    }

    fn ensure_tool_enabled(&self, tool: &str) -> Result<(), McpError> {
        tracing::info!(tool = tool, "tool invocation requested");
        if self.state.config().is_tool_enabled(tool) {
            Ok(())
        } else {
            Err(McpError::invalid_request(
                ToolDisabledError::new(tool).to_string(),
                None,
            ))
        }
    }
}

#[tool_router]
impl GsheetsServer {
    #[tool(
        name = "sheets_get_metadata",
        description = "Get spreadsheet title, locale and the list of sheets with their grid sizes"
    )]
    pub async fn sheets_get_metadata(
        &self,
        Parameters(params): Parameters<tools::GetMetadataParams>,
    ) -> Result<CallToolResult, McpError> {
        self.ensure_tool_enabled("sheets_get_metadata")?;
        Ok(into_tool_result(
            "sheets_get_metadata",
            tools::get_metadata(self.state.clone(), params)
                .await
                .map(|snapshot| render::render_snapshot(&snapshot)),
        ))
    }

    #[tool(
        name = "sheets_get_values",
        description = "Read cell values from a sheet, optionally limited to an A1 range"
    )]
    pub async fn sheets_get_values(
        &self,
        Parameters(params): Parameters<tools::GetValuesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.ensure_tool_enabled("sheets_get_values")?;
        Ok(into_tool_result(
            "sheets_get_values",
            tools::get_values(self.state.clone(), params)
                .await
                .map(|response| render::render_values(&response.range, &response.values)),
        ))
    }

    #[tool(
        name = "sheets_update_values",
        description = "Write a 2D array of values to an A1 range (values are parsed as if typed by a user)"
    )]
    pub async fn sheets_update_values(
        &self,
        Parameters(params): Parameters<tools::UpdateValuesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.ensure_tool_enabled("sheets_update_values")?;
        Ok(into_tool_result(
            "sheets_update_values",
            tools::update_values(self.state.clone(), params)
                .await
                .map(|response| render::render_update(&response.range, &response.outcome)),
        ))
    }

    #[tool(
        name = "sheets_batch_update_values",
        description = "Write several ranges, possibly on different sheets, in one validated request"
    )]
    pub async fn sheets_batch_update_values(
        &self,
        Parameters(params): Parameters<tools::BatchUpdateValuesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.ensure_tool_enabled("sheets_batch_update_values")?;
        Ok(into_tool_result(
            "sheets_batch_update_values",
            tools::batch_update_values(self.state.clone(), params)
                .await
                .map(|response| render::render_batch(response.ranges.len(), &response.outcome)),
        ))
    }

    #[tool(
        name = "sheets_add_sheet",
        description = "Add a new sheet (tab) with an optional grid size"
    )]
    pub async fn sheets_add_sheet(
        &self,
        Parameters(params): Parameters<tools::AddSheetParams>,
    ) -> Result<CallToolResult, McpError> {
        self.ensure_tool_enabled("sheets_add_sheet")?;
        Ok(into_tool_result(
            "sheets_add_sheet",
            tools::add_sheet(self.state.clone(), params)
                .await
                .map(|response| render::render_new_sheet(&response.sheet)),
        ))
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for GsheetsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..ServerInfo::default()
        }
    }
}

/// Domain failures are tool results flagged as errors, not protocol errors.
fn into_tool_result(tool: &str, result: Result<String, SheetsError>) -> CallToolResult {
    match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(error) => {
            tracing::warn!(tool = tool, code = error.code(), "tool failed: {error}");
            CallToolResult::error(vec![Content::text(format!("Error: {error}"))])
        }
    }
}

#[derive(Debug, Error)]
#[error("tool '{tool_name}' is disabled by server configuration")]
struct ToolDisabledError {
    tool_name: String,
}

impl ToolDisabledError {
    fn new(tool_name: &str) -> Self {
        Self {
            tool_name: tool_name.to_ascii_lowercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|content| content.as_text().map(|text| text.text.clone()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn errors_become_flagged_tool_results() {
        let result = into_tool_result(
            "sheets_get_values",
            Err(SheetsError::SheetNotFound {
                sheet: "Data".to_string(),
                available: vec!["Sheet1".to_string()],
            }),
        );
        assert_eq!(result.is_error, Some(true));
        let text = text_of(&result);
        assert!(text.starts_with("Error: "));
        assert!(text.contains("'Data'"));
        assert!(text.contains("'Sheet1'"));
    }

    #[test]
    fn success_is_plain_text() {
        let result = into_tool_result("sheets_add_sheet", Ok("Added sheet 'X'".to_string()));
        assert_ne!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "Added sheet 'X'");
    }

    #[test]
    fn disabled_tool_message_is_lowercased() {
        let err = ToolDisabledError::new("Sheets_Add_Sheet");
        assert_eq!(
            err.to_string(),
            "tool 'sheets_add_sheet' is disabled by server configuration"
        );
    }
}
