use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_MAX_RESPONSE_CHARS: u64 = 100_000;
const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8080";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[value(alias = "stream-http", alias = "stream_http")]
    #[serde(alias = "stream-http", alias = "stream_http")]
    Http,
    Stdio,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Http => write!(f, "http"),
            TransportKind::Stdio => write!(f, "stdio"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Service-account or authorized-user credentials JSON.
    pub credentials: Option<PathBuf>,
    /// Pre-issued bearer token; takes precedence over `credentials`.
    pub access_token: Option<String>,
    /// Sent as the quota project when set.
    pub project_id: Option<String>,
    pub api_base_url: String,
    pub max_response_chars: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub enabled_tools: Option<HashSet<String>>,
    pub transport: TransportKind,
    pub http_bind_address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            access_token: None,
            project_id: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            max_response_chars: Some(DEFAULT_MAX_RESPONSE_CHARS),
            request_timeout_ms: Some(DEFAULT_REQUEST_TIMEOUT_MS),
            enabled_tools: None,
            transport: TransportKind::Stdio,
            http_bind_address: DEFAULT_HTTP_BIND
                .parse()
                .expect("default bind address valid"),
        }
    }
}

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            credentials: cli_credentials,
            access_token: cli_access_token,
            project_id: cli_project_id,
            api_base_url: cli_api_base_url,
            max_response_chars: cli_max_response_chars,
            request_timeout_ms: cli_request_timeout_ms,
            enabled_tools: cli_enabled_tools,
            transport: cli_transport,
            http_bind: cli_http_bind,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            credentials: file_credentials,
            access_token: file_access_token,
            project_id: file_project_id,
            api_base_url: file_api_base_url,
            max_response_chars: file_max_response_chars,
            request_timeout_ms: file_request_timeout_ms,
            enabled_tools: file_enabled_tools,
            transport: file_transport,
            http_bind: file_http_bind,
        } = file_config;

        let credentials = cli_credentials.or(file_credentials);
        if let Some(path) = credentials.as_ref() {
            anyhow::ensure!(
                path.is_file(),
                "credentials file {:?} does not exist",
                path
            );
        }

        let access_token = cli_access_token
            .or(file_access_token)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        let project_id = cli_project_id
            .or(file_project_id)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        let api_base_url = cli_api_base_url
            .or(file_api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        anyhow::ensure!(
            api_base_url.starts_with("http://") || api_base_url.starts_with("https://"),
            "api base url '{}' must start with http:// or https://",
            api_base_url
        );

        let max_response_chars = cli_max_response_chars
            .or(file_max_response_chars)
            .unwrap_or(DEFAULT_MAX_RESPONSE_CHARS);
        let max_response_chars = if max_response_chars == 0 {
            None
        } else {
            Some(max_response_chars)
        };

        let request_timeout_ms = cli_request_timeout_ms
            .or(file_request_timeout_ms)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);
        let request_timeout_ms = if request_timeout_ms == 0 {
            None
        } else {
            Some(request_timeout_ms)
        };

        let enabled_tools = cli_enabled_tools
            .or(file_enabled_tools)
            .map(|tools| {
                tools
                    .into_iter()
                    .map(|tool| tool.trim().to_ascii_lowercase())
                    .filter(|tool| !tool.is_empty())
                    .collect::<HashSet<_>>()
            })
            .filter(|set| !set.is_empty());

        let transport = cli_transport
            .or(file_transport)
            .unwrap_or(TransportKind::Stdio);

        let http_bind_address = match cli_http_bind.or(file_http_bind) {
            Some(addr) => addr,
            None => DEFAULT_HTTP_BIND
                .parse()
                .context("default bind address is invalid")?,
        };

        Ok(Self {
            credentials,
            access_token,
            project_id,
            api_base_url,
            max_response_chars,
            request_timeout_ms,
            enabled_tools,
            transport,
            http_bind_address,
        })
    }

    pub fn is_tool_enabled(&self, tool: &str) -> bool {
        match &self.enabled_tools {
            Some(set) => set.contains(&tool.to_ascii_lowercase()),
            None => true,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    pub fn max_response_chars(&self) -> Option<usize> {
        self.max_response_chars
            .filter(|chars| *chars > 0)
            .map(|chars| chars as usize)
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "gsheets-mcp", about = "Google Sheets MCP server", version)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "GOOGLE_APPLICATION_CREDENTIALS",
        value_name = "FILE",
        help = "Service account or authorized user credentials JSON"
    )]
    pub credentials: Option<PathBuf>,

    #[arg(
        long,
        env = "GSHEETS_MCP_ACCESS_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true,
        help = "Pre-issued OAuth access token (overrides --credentials)"
    )]
    pub access_token: Option<String>,

    #[arg(
        long,
        env = "GOOGLE_PROJECT_ID",
        value_name = "ID",
        help = "Google Cloud project id billed for API quota"
    )]
    pub project_id: Option<String>,

    #[arg(
        long,
        env = "GSHEETS_MCP_API_BASE_URL",
        value_name = "URL",
        help = "Sheets API base URL (default: https://sheets.googleapis.com)"
    )]
    pub api_base_url: Option<String>,

    #[arg(
        long,
        env = "GSHEETS_MCP_MAX_RESPONSE_CHARS",
        value_name = "CHARS",
        help = "Max serialized size of read results in characters (default: 100000; 0 disables)",
        value_parser = clap::value_parser!(u64)
    )]
    pub max_response_chars: Option<u64>,

    #[arg(
        long,
        env = "GSHEETS_MCP_REQUEST_TIMEOUT_MS",
        value_name = "MS",
        help = "HTTP request timeout in milliseconds (default: 30000; 0 disables)",
        value_parser = clap::value_parser!(u64)
    )]
    pub request_timeout_ms: Option<u64>,

    #[arg(
        long,
        env = "GSHEETS_MCP_ENABLED_TOOLS",
        value_name = "TOOL",
        value_delimiter = ',',
        help = "Restrict execution to the provided tool names"
    )]
    pub enabled_tools: Option<Vec<String>>,

    #[arg(
        long,
        env = "GSHEETS_MCP_TRANSPORT",
        value_enum,
        value_name = "TRANSPORT",
        help = "Transport to expose (stdio or http)"
    )]
    pub transport: Option<TransportKind>,

    #[arg(
        long,
        env = "GSHEETS_MCP_HTTP_BIND",
        value_name = "ADDR",
        help = "HTTP bind address when using http transport"
    )]
    pub http_bind: Option<SocketAddr>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    credentials: Option<PathBuf>,
    access_token: Option<String>,
    project_id: Option<String>,
    api_base_url: Option<String>,
    max_response_chars: Option<u64>,
    request_timeout_ms: Option<u64>,
    enabled_tools: Option<Vec<String>>,
    transport: Option<TransportKind>,
    http_bind: Option<SocketAddr>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
