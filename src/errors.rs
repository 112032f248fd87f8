use thiserror::Error;

pub type Result<T, E = SheetsError> = std::result::Result<T, E>;

/// Failures surfaced by the resolver, the access layer and the tool layer.
///
/// Every variant renders to a message suitable for an `Error: <message>` tool
/// result; nothing here is retried.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error(
        "could not extract a spreadsheet id from '{input}'; pass a sharing URL or a bare spreadsheet id"
    )]
    InvalidIdentifier { input: String },

    #[error("sheet '{sheet}' not found in spreadsheet (available: {})", format_titles(.available))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error(
        "invalid range '{range}'; expected A1 notation like 'A1' or 'A1:C10' with uppercase columns"
    )]
    InvalidRange { range: String },

    #[error(
        "response too large ({size} characters > {limit} characters); request a smaller range"
    )]
    ResponseTooLarge { size: usize, limit: usize },

    #[error("sheet '{title}' already exists in spreadsheet")]
    SheetAlreadyExists { title: String },

    #[error("sheet '{title}' was not created: {reason}")]
    SheetCreationFailed { title: String, reason: String },

    #[error("{message}")]
    MalformedInput { message: String },

    #[error("{}", remote_message(.status, .message))]
    RemoteCallFailed { status: Option<u16>, message: String },

    #[error("authentication failed: {0}")]
    Auth(String),
}

impl SheetsError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RemoteCallFailed {
            status,
            message: message.into(),
        }
    }

    /// Stable machine-readable code, used by the CLI error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            SheetsError::InvalidIdentifier { .. } => "INVALID_IDENTIFIER",
            SheetsError::SheetNotFound { .. } => "SHEET_NOT_FOUND",
            SheetsError::InvalidRange { .. } => "INVALID_RANGE",
            SheetsError::ResponseTooLarge { .. } => "RESPONSE_TOO_LARGE",
            SheetsError::SheetAlreadyExists { .. } => "SHEET_ALREADY_EXISTS",
            SheetsError::SheetCreationFailed { .. } => "SHEET_CREATION_FAILED",
            SheetsError::MalformedInput { .. } => "MALFORMED_INPUT",
            SheetsError::RemoteCallFailed { .. } => "REMOTE_CALL_FAILED",
            SheetsError::Auth(_) => "AUTH_FAILED",
        }
    }
}

impl From<reqwest::Error> for SheetsError {
    fn from(error: reqwest::Error) -> Self {
        SheetsError::remote(error.status().map(|s| s.as_u16()), error.to_string())
    }
}

fn format_titles(titles: &[String]) -> String {
    if titles.is_empty() {
        return "none".to_string();
    }
    titles
        .iter()
        .map(|t| format!("'{t}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn remote_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Google Sheets API error ({code}): {message}"),
        None => format!("Google Sheets API request failed: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_not_found_lists_available_titles() {
        let err = SheetsError::SheetNotFound {
            sheet: "Q3".to_string(),
            available: vec!["Sheet1".to_string(), "Q2".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "sheet 'Q3' not found in spreadsheet (available: 'Sheet1', 'Q2')"
        );
    }

    #[test]
    fn response_too_large_cites_size_and_limit() {
        let msg = SheetsError::ResponseTooLarge {
            size: 150,
            limit: 100,
        }
        .to_string();
        assert!(msg.contains("150"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn remote_error_includes_status_when_known() {
        let err = SheetsError::remote(Some(404), "Requested entity was not found.");
        assert_eq!(
            err.to_string(),
            "Google Sheets API error (404): Requested entity was not found."
        );
        assert_eq!(err.code(), "REMOTE_CALL_FAILED");
    }
}
