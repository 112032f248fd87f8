use crate::errors::SheetsError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_you_mean: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub try_this: Option<String>,
}

pub fn envelope_for(error: &anyhow::Error) -> ErrorEnvelope {
    let message = error.to_string();

    let Some(sheets_error) = error.downcast_ref::<SheetsError>() else {
        return ErrorEnvelope {
            code: "COMMAND_FAILED".to_string(),
            message,
            did_you_mean: None,
            try_this: None,
        };
    };

    let mut envelope = ErrorEnvelope {
        code: sheets_error.code().to_string(),
        message,
        did_you_mean: None,
        try_this: None,
    };

    match sheets_error {
        SheetsError::SheetNotFound { sheet, available } => {
            envelope.did_you_mean = available
                .iter()
                .find(|title| title.eq_ignore_ascii_case(sheet) || title.trim() == sheet.trim())
                .cloned();
            envelope.try_this =
                Some("run `gsheets-cli metadata <spreadsheet>` to list sheet titles".to_string());
        }
        SheetsError::InvalidIdentifier { .. } => {
            envelope.try_this = Some(
                "pass a sharing URL (https://docs.google.com/spreadsheets/d/<ID>/edit) or the bare ID"
                    .to_string(),
            );
        }
        SheetsError::InvalidRange { .. } => {
            envelope.try_this =
                Some("use A1 notation with uppercase columns, for example: `A1:C10`".to_string());
        }
        SheetsError::ResponseTooLarge { .. } => {
            envelope.try_this = Some("pass --range to read a smaller block".to_string());
        }
        SheetsError::Auth(_) => {
            envelope.try_this = Some(
                "set GOOGLE_APPLICATION_CREDENTIALS or GSHEETS_MCP_ACCESS_TOKEN".to_string(),
            );
        }
        _ => {}
    }

    envelope
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_not_found_suggests_case_insensitive_match() {
        let error = anyhow::Error::new(SheetsError::SheetNotFound {
            sheet: "data".to_string(),
            available: vec!["Summary".to_string(), "Data".to_string()],
        });
        let envelope = envelope_for(&error);
        assert_eq!(envelope.code, "SHEET_NOT_FOUND");
        assert_eq!(envelope.did_you_mean.as_deref(), Some("Data"));
        assert!(envelope.try_this.is_some());
    }

    #[test]
    fn foreign_errors_are_command_failed() {
        let error = anyhow::anyhow!("config file \"x.yaml\" does not exist");
        let envelope = envelope_for(&error);
        assert_eq!(envelope.code, "COMMAND_FAILED");
        assert!(envelope.did_you_mean.is_none());
    }
}
