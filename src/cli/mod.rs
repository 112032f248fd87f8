pub mod commands;
pub mod errors;
pub mod output;

use crate::config::{CliArgs, ServerConfig};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "gsheets-cli",
    version,
    about = "Google Sheets command line interface",
    long_about = "One-shot Google Sheets reads and writes with JSON output.\n\nCommon workflows:\n  • Inspect a spreadsheet: metadata <url-or-id>\n  • Read a range: read <url-or-id> <sheet> --range A1:C10\n  • Write values: write <url-or-id> <sheet> A1:B2 --values '[[1,2],[3,\"=A1+B1\"]]'\n\nErrors are printed to stderr as {\"code\", \"message\"} JSON and exit with status 1."
)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(long, global = true, help = "Print single-line JSON")]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    #[arg(
        long,
        value_name = "FILE",
        global = true,
        help = "Path to a configuration file (YAML or JSON)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "GOOGLE_APPLICATION_CREDENTIALS",
        value_name = "FILE",
        global = true,
        help = "Service account or authorized user credentials JSON"
    )]
    pub credentials: Option<PathBuf>,

    #[arg(
        long,
        env = "GSHEETS_MCP_ACCESS_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true,
        global = true,
        help = "Pre-issued OAuth access token (overrides --credentials)"
    )]
    pub access_token: Option<String>,

    #[arg(long, env = "GOOGLE_PROJECT_ID", value_name = "ID", global = true)]
    pub project_id: Option<String>,

    #[arg(
        long,
        env = "GSHEETS_MCP_API_BASE_URL",
        value_name = "URL",
        global = true
    )]
    pub api_base_url: Option<String>,

    #[arg(
        long,
        env = "GSHEETS_MCP_MAX_RESPONSE_CHARS",
        value_name = "CHARS",
        global = true
    )]
    pub max_response_chars: Option<u64>,
}

impl ConnectionArgs {
    pub fn into_config(self) -> Result<ServerConfig> {
        ServerConfig::from_args(CliArgs {
            config: self.config,
            credentials: self.credentials,
            access_token: self.access_token,
            project_id: self.project_id,
            api_base_url: self.api_base_url,
            max_response_chars: self.max_response_chars,
            ..CliArgs::default()
        })
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract the spreadsheet ID from a sharing URL or bare ID (no network access).
    Resolve { spreadsheet: String },
    /// Show spreadsheet title and sheets.
    Metadata { spreadsheet: String },
    /// Read cell values from a sheet.
    Read {
        spreadsheet: String,
        sheet: String,
        #[arg(long)]
        range: Option<String>,
    },
    /// Write a 2D JSON array of values to a range.
    Write {
        spreadsheet: String,
        sheet: String,
        range: String,
        #[arg(
            long,
            value_name = "JSON|@FILE",
            help = "Rows as JSON, or @path to a JSON file"
        )]
        values: String,
    },
    /// Add a new sheet.
    AddSheet {
        spreadsheet: String,
        title: String,
        #[arg(long)]
        rows: Option<u64>,
        #[arg(long)]
        columns: Option<u64>,
    },
}

pub async fn run_command(connection: ConnectionArgs, command: Commands) -> Result<Value> {
    match command {
        Commands::Resolve { spreadsheet } => commands::read::resolve(spreadsheet),
        Commands::Metadata { spreadsheet } => {
            commands::read::metadata(connection, spreadsheet).await
        }
        Commands::Read {
            spreadsheet,
            sheet,
            range,
        } => commands::read::read(connection, spreadsheet, sheet, range).await,
        Commands::Write {
            spreadsheet,
            sheet,
            range,
            values,
        } => commands::write::write(connection, spreadsheet, sheet, range, values).await,
        Commands::AddSheet {
            spreadsheet,
            title,
            rows,
            columns,
        } => commands::write::add_sheet(connection, spreadsheet, title, rows, columns).await,
    }
}
