use crate::errors::{Result, SheetsError};
use once_cell::sync::Lazy;
use regex::Regex;

static A1_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]+[0-9]+(:[A-Z]+[0-9]+)?$").expect("regex"));

/// Build the range string sent to the API for `sheet_title`.
///
/// - no range: the bare sheet title (whole sheet)
/// - range containing `!`: used verbatim
/// - otherwise: `sheet_title!range`
///
/// Only the caller's range is validated; the sheet title is taken as-is, so
/// titles containing `!` still address the whole sheet.
pub fn build_qualified_range(sheet_title: &str, raw_range: Option<&str>) -> Result<String> {
    match raw_range.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(sheet_title.to_string()),
        Some(range) if range.contains('!') => {
            validate_qualified_range(range)?;
            Ok(range.to_string())
        }
        Some(range) => {
            validate_sub_range(range)?;
            Ok(format!("{sheet_title}!{range}"))
        }
    }
}

/// A qualified range is valid when it either has no `!` (whole sheet) or its
/// part after the last `!` is a single cell or a rectangle in A1 notation.
pub fn validate_qualified_range(qualified: &str) -> Result<()> {
    match qualified.rsplit_once('!') {
        Some((_, sub_range)) => validate_sub_range(sub_range),
        None => Ok(()),
    }
}

fn validate_sub_range(sub_range: &str) -> Result<()> {
    if A1_RANGE_RE.is_match(sub_range) {
        Ok(())
    } else {
        Err(SheetsError::InvalidRange {
            range: sub_range.to_string(),
        })
    }
}
