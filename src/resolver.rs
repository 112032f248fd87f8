use crate::errors::{Result, SheetsError};
use crate::model::SpreadsheetId;
use once_cell::sync::Lazy;
use regex::Regex;

static SHARING_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)").expect("regex"));
static BARE_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("regex"));

/// Extract the spreadsheet id from a sharing URL or accept a bare id.
///
/// The URL form is tried first so that a full link is never judged by the
/// bare-token rule. The captured id stops at the first character outside the
/// id alphabet (`/`, `?`, `#` or end of input).
pub fn resolve_spreadsheet_id(input: &str) -> Result<SpreadsheetId> {
    let trimmed = input.trim();

    if let Some(id) = SHARING_URL_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
    {
        return Ok(SpreadsheetId::new(id.as_str()));
    }

    if BARE_ID_RE.is_match(trimmed) {
        return Ok(SpreadsheetId::new(trimmed));
    }

    Err(SheetsError::InvalidIdentifier {
        input: input.to_string(),
    })
}
