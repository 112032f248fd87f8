pub mod access;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod model;
pub mod range;
pub mod resolver;
pub mod server;
pub mod state;
pub mod tools;

pub use access::SpreadsheetAccess;
pub use config::{CliArgs, ServerConfig, TransportKind};
pub use errors::SheetsError;
pub use resolver::resolve_spreadsheet_id;
pub use server::GsheetsServer;

use anyhow::Result;
use std::sync::Arc;

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let config = Arc::new(config);
    let server = GsheetsServer::new(config.clone())?;
    tracing::info!(
        transport = %config.transport,
        tools = ?config.enabled_tools,
        "starting google sheets mcp server"
    );
    match config.transport {
        TransportKind::Stdio => server.run_stdio().await,
        TransportKind::Http => server.run_http(config.http_bind_address).await,
    }
}
