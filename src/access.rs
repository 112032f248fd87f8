use crate::api::types::{GridProperties, SheetProperties};
use crate::api::{
    BatchUpdateValuesRequest, SheetsApi, StructuralRequest, ValueInputOption, ValueRange,
};
use crate::errors::{Result, SheetsError};
use crate::model::{
    BatchUpdateOutcome, CellMatrix, NewSheetOptions, RangeUpdate, SheetDescriptor, SpreadsheetId,
    SpreadsheetSnapshot, UpdateOutcome,
};
use crate::range::build_qualified_range;
use indexmap::IndexSet;
use std::sync::Arc;

/// Field mask for metadata fetches; never includes cell data.
pub const METADATA_FIELDS: &str =
    "spreadsheetId,properties(title,locale,timeZone),sheets.properties";
pub const UNTITLED_SPREADSHEET: &str = "Untitled spreadsheet";
pub const DEFAULT_NEW_SHEET_ROWS: u64 = 1000;
pub const DEFAULT_NEW_SHEET_COLUMNS: u64 = 26;

/// Validated, size-bounded access to remote spreadsheets.
///
/// Holds no spreadsheet state between calls: every public operation fetches a
/// fresh snapshot, validates against it, and issues its remote call. Batched
/// writes reuse one snapshot for all of their sub-updates.
#[derive(Clone)]
pub struct SpreadsheetAccess {
    api: Arc<dyn SheetsApi>,
    max_response_chars: Option<usize>,
}

impl SpreadsheetAccess {
    pub fn new(api: Arc<dyn SheetsApi>, max_response_chars: Option<usize>) -> Self {
        Self {
            api,
            max_response_chars,
        }
    }

    pub fn max_response_chars(&self) -> Option<usize> {
        self.max_response_chars
    }

    pub async fn fetch_snapshot(&self, id: &SpreadsheetId) -> Result<SpreadsheetSnapshot> {
        let metadata = self.api.get_metadata(id, METADATA_FIELDS).await?;
        let properties = metadata.properties.unwrap_or_default();

        let sheets = metadata
            .sheets
            .unwrap_or_default()
            .into_iter()
            .map(|sheet| descriptor_from_properties(sheet.properties.unwrap_or_default()))
            .collect::<Vec<_>>();

        tracing::debug!(spreadsheet = %id, sheets = sheets.len(), "fetched spreadsheet metadata");

        Ok(SpreadsheetSnapshot {
            id: metadata
                .spreadsheet_id
                .map(SpreadsheetId::new)
                .unwrap_or_else(|| id.clone()),
            title: properties
                .title
                .unwrap_or_else(|| UNTITLED_SPREADSHEET.to_string()),
            locale: properties.locale,
            time_zone: properties.time_zone,
            sheets,
        })
    }

    pub async fn read_values(
        &self,
        id: &SpreadsheetId,
        sheet_name: &str,
        range: Option<&str>,
    ) -> Result<CellMatrix> {
        let snapshot = self.fetch_snapshot(id).await?;
        ensure_sheet_exists(&snapshot, sheet_name)?;
        let qualified = build_qualified_range(sheet_name, range)?;

        let response = self.api.get_values(id, &qualified).await?;
        let values = response.values.unwrap_or_default();

        if let Some(limit) = self.max_response_chars {
            let size = serialized_chars(&values)?;
            if size > limit {
                tracing::warn!(range = %qualified, size, limit, "read result exceeds size ceiling");
                return Err(SheetsError::ResponseTooLarge { size, limit });
            }
        }

        Ok(values)
    }

    pub async fn write_values(
        &self,
        id: &SpreadsheetId,
        sheet_name: &str,
        range: Option<&str>,
        values: &CellMatrix,
    ) -> Result<UpdateOutcome> {
        let snapshot = self.fetch_snapshot(id).await?;
        ensure_sheet_exists(&snapshot, sheet_name)?;
        let qualified = build_qualified_range(sheet_name, range)?;

        let response = self
            .api
            .update_values(id, &qualified, values, ValueInputOption::UserEntered)
            .await?;

        Ok(UpdateOutcome {
            updated_range: response.updated_range,
            updated_rows: response.updated_rows.unwrap_or(0),
            updated_columns: response.updated_columns.unwrap_or(0),
            updated_cells: response.updated_cells.unwrap_or(0),
        })
    }

    /// Write several ranges with one metadata fetch and one remote call.
    ///
    /// All sheet names and ranges are validated before anything is sent; a
    /// single bad entry rejects the whole batch. Callers reject empty batches.
    pub async fn batch_write_values(
        &self,
        id: &SpreadsheetId,
        updates: &[RangeUpdate],
    ) -> Result<BatchUpdateOutcome> {
        let sheet_names: IndexSet<&str> = updates
            .iter()
            .map(|update| update.sheet_name.as_str())
            .collect();

        let snapshot = self.fetch_snapshot(id).await?;
        for name in &sheet_names {
            ensure_sheet_exists(&snapshot, name)?;
        }

        let data = updates
            .iter()
            .map(|update| {
                build_qualified_range(&update.sheet_name, update.range.as_deref())
                    .map(|qualified| ValueRange::rows(qualified, update.values.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            spreadsheet = %id,
            ranges = data.len(),
            sheets = sheet_names.len(),
            "issuing batch value update"
        );

        let request = BatchUpdateValuesRequest {
            value_input_option: ValueInputOption::UserEntered,
            data,
        };
        let response = self.api.batch_update_values(id, &request).await?;

        Ok(BatchUpdateOutcome {
            updated_rows: response.total_updated_rows.unwrap_or(0),
            updated_columns: response.total_updated_columns.unwrap_or(0),
            updated_cells: response.total_updated_cells.unwrap_or(0),
            updated_sheets: response.total_updated_sheets.unwrap_or(0),
            updated_ranges: response.responses.map(|r| r.len() as u64).unwrap_or(0),
        })
    }

    /// Create a sheet and return its descriptor as reported by the mutation
    /// reply itself.
    pub async fn add_sheet(
        &self,
        id: &SpreadsheetId,
        title: &str,
        options: NewSheetOptions,
    ) -> Result<SheetDescriptor> {
        let snapshot = self.fetch_snapshot(id).await?;
        if snapshot.sheet(title).is_some() {
            return Err(SheetsError::SheetAlreadyExists {
                title: title.to_string(),
            });
        }

        let request = StructuralRequest::AddSheet {
            properties: SheetProperties {
                title: Some(title.to_string()),
                grid_properties: Some(GridProperties {
                    row_count: Some(options.row_count.unwrap_or(DEFAULT_NEW_SHEET_ROWS)),
                    column_count: Some(
                        options.column_count.unwrap_or(DEFAULT_NEW_SHEET_COLUMNS),
                    ),
                }),
                ..SheetProperties::default()
            },
        };

        let response = self.api.batch_update(id, &[request]).await?;
        let properties = response
            .replies
            .unwrap_or_default()
            .into_iter()
            .find_map(|reply| reply.add_sheet.and_then(|added| added.properties))
            .ok_or_else(|| SheetsError::SheetCreationFailed {
                title: title.to_string(),
                reason: "response did not include the new sheet's properties".to_string(),
            })?;

        let descriptor = descriptor_from_properties(properties);
        tracing::info!(
            spreadsheet = %id,
            title = %descriptor.title,
            sheet_id = descriptor.sheet_id,
            "added sheet"
        );
        Ok(descriptor)
    }
}

/// Exact, case-sensitive title lookup.
pub fn ensure_sheet_exists<'a>(
    snapshot: &'a SpreadsheetSnapshot,
    title: &str,
) -> Result<&'a SheetDescriptor> {
    snapshot
        .sheet(title)
        .ok_or_else(|| SheetsError::SheetNotFound {
            sheet: title.to_string(),
            available: snapshot.sheet_titles(),
        })
}

fn descriptor_from_properties(properties: SheetProperties) -> SheetDescriptor {
    let grid = properties.grid_properties.unwrap_or_default();
    SheetDescriptor {
        title: properties.title.unwrap_or_default(),
        sheet_id: properties.sheet_id.unwrap_or(0),
        index: properties.index.unwrap_or(0),
        row_count: grid.row_count.unwrap_or(0),
        column_count: grid.column_count.unwrap_or(0),
    }
}

/// Size of the matrix as JSON text, in characters.
pub fn serialized_chars(values: &CellMatrix) -> Result<usize> {
    serde_json::to_string(values)
        .map(|json| json.chars().count())
        .map_err(|e| SheetsError::remote(None, format!("failed to measure response size: {e}")))
}
