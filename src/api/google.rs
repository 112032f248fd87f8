use super::SheetsApi;
use super::auth::{CredentialsFile, TokenProvider};
use super::types::{
    BatchUpdateSpreadsheetRequest, BatchUpdateSpreadsheetResponse, BatchUpdateValuesRequest,
    BatchUpdateValuesResponse, GoogleErrorBody, SpreadsheetMetadata, StructuralRequest,
    UpdateValuesResponse, ValueInputOption, ValueRange,
};
use crate::config::ServerConfig;
use crate::errors::{Result, SheetsError};
use crate::model::{CellMatrix, SpreadsheetId};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// reqwest-backed client for the Sheets v4 REST API.
pub struct GoogleSheetsApi {
    http: Client,
    base_url: Url,
    tokens: TokenProvider,
    quota_project: Option<String>,
}

impl GoogleSheetsApi {
    pub fn new(http: Client, base_url: &str, tokens: TokenProvider) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .with_context(|| format!("invalid api base url '{base_url}'"))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "api base url '{base_url}' cannot carry a path"
        );
        Ok(Self {
            http,
            base_url,
            tokens,
            quota_project: None,
        })
    }

    pub fn with_quota_project(mut self, project_id: Option<String>) -> Self {
        self.quota_project = project_id.filter(|p| !p.trim().is_empty());
        self
    }

    /// Build the live client from server configuration. An explicit access
    /// token wins over a credentials file.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build http client")?;

        let tokens = if let Some(token) = config.access_token.as_deref() {
            TokenProvider::from_static(token)
        } else if let Some(path) = config.credentials.as_deref() {
            let credentials = CredentialsFile::from_path(path)?;
            if let (Some(configured), Some(from_file)) =
                (config.project_id.as_deref(), credentials.project_id())
                && configured != from_file
            {
                tracing::warn!(
                    configured,
                    from_file,
                    "configured project id differs from the credentials file"
                );
            }
            TokenProvider::from_credentials(credentials, http.clone())
        } else {
            anyhow::bail!(
                "no Google credentials configured; set GOOGLE_APPLICATION_CREDENTIALS or GSHEETS_MCP_ACCESS_TOKEN"
            );
        };

        tracing::info!(
            auth = tokens.kind(),
            base_url = %config.api_base_url,
            "configured Google Sheets client"
        );
        Ok(Self::new(http, &config.api_base_url, tokens)?
            .with_quota_project(config.project_id.clone()))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::remote(None, "api base url cannot carry a path"))?
            .pop_if_empty()
            .push("v4")
            .push("spreadsheets")
            .extend(segments);
        Ok(url)
    }

    async fn send<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.tokens.access_token().await?;
        tracing::debug!(method = %method, path = url.path(), "sheets api request");

        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(project) = &self.quota_project {
            request = request.header("x-goog-user-project", project);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_from_body(status.as_u16(), &text));
        }

        response.json::<T>().await.map_err(|e| {
            SheetsError::remote(
                Some(status.as_u16()),
                format!("unexpected response body: {e}"),
            )
        })
    }
}

#[async_trait]
impl SheetsApi for GoogleSheetsApi {
    async fn get_metadata(
        &self,
        id: &SpreadsheetId,
        fields: &str,
    ) -> Result<SpreadsheetMetadata> {
        let mut url = self.endpoint(&[id.as_str()])?;
        url.query_pairs_mut().append_pair("fields", fields);
        self.send::<(), _>(Method::GET, url, None).await
    }

    async fn get_values(&self, id: &SpreadsheetId, range: &str) -> Result<ValueRange> {
        let url = self.endpoint(&[id.as_str(), "values", range])?;
        self.send::<(), _>(Method::GET, url, None).await
    }

    async fn update_values(
        &self,
        id: &SpreadsheetId,
        range: &str,
        values: &CellMatrix,
        input_option: ValueInputOption,
    ) -> Result<UpdateValuesResponse> {
        let mut url = self.endpoint(&[id.as_str(), "values", range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", input_option.as_str());
        let body = ValueRange::rows(range, values.clone());
        self.send(Method::PUT, url, Some(&body)).await
    }

    async fn batch_update_values(
        &self,
        id: &SpreadsheetId,
        request: &BatchUpdateValuesRequest,
    ) -> Result<BatchUpdateValuesResponse> {
        let url = self.endpoint(&[id.as_str(), "values:batchUpdate"])?;
        self.send(Method::POST, url, Some(request)).await
    }

    async fn batch_update(
        &self,
        id: &SpreadsheetId,
        requests: &[StructuralRequest],
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        let segment = format!("{}:batchUpdate", id.as_str());
        let url = self.endpoint(&[segment.as_str()])?;
        let body = BatchUpdateSpreadsheetRequest {
            requests: requests.to_vec(),
        };
        self.send(Method::POST, url, Some(&body)).await
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

fn error_from_body(status: u16, body: &str) -> SheetsError {
    let detail = serde_json::from_str::<GoogleErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error);

    let message = match detail {
        Some(detail) => {
            let message = detail.message.unwrap_or_else(|| "no message".to_string());
            match detail.status {
                Some(code) => format!("{message} [{code}]"),
                None => message,
            }
        }
        None if body.trim().is_empty() => "empty error response".to_string(),
        None => body.trim().to_string(),
    };
    SheetsError::remote(Some(status), message)
}
