//! Header-mapping ingestion engine.
//!
//! Turns a worksheet (row 0 = headers) into resources for one demand:
//!
//! 1. resolve each header cell to a canonical field; an empty mapping
//!    rejects the whole batch
//! 2. collect the mapped, non-empty cells of every data row; rows without a
//!    `name` are skipped silently
//! 3. build and validate a resource per remaining row; failures are counted
//!    and itemized, the batch carries on
//! 4. commit all accepted rows in one atomic store call
//!
//! When a row has several columns mapping to the same field, the rightmost
//! non-empty one wins.

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;
use validator::ValidationErrors;

use crate::errors::IngestError;
use crate::models::{
    BatchResult, CanonicalField, IngestStage, IngestedRecord, NewResource, RowError, TabularSheet,
};
use crate::services::header_map::resolve_columns;
use crate::services::store::ResourceStore;

/// Rows parsed from a sheet, before commit.
///
/// `stage` is `HeadersResolved` when the sheet had no data rows after the
/// header, `RowsProcessing` otherwise.
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub stage: IngestStage,
    pub columns: BTreeMap<usize, CanonicalField>,
    pub accepted: Vec<NewResource>,
    pub skipped_count: usize,
    pub row_errors: Vec<RowError>,
}

impl ParsedSheet {
    pub fn error_count(&self) -> usize {
        self.row_errors.len()
    }
}

/// Parses worksheets and commits the resulting resources.
#[derive(Clone)]
pub struct IngestionEngine {
    store: Arc<dyn ResourceStore>,
}

impl IngestionEngine {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    /// Parses the sheet without touching the store.
    pub fn parse(
        &self,
        sheet: &dyn TabularSheet,
        demand_id: Uuid,
        uploaded_by: Option<Uuid>,
    ) -> Result<ParsedSheet, IngestError> {
        let header = sheet.row(0).ok_or(IngestError::EmptySheet)?;
        let columns = resolve_columns(header.iter().map(|cell| cell.to_trimmed_string()));
        if columns.is_empty() {
            return Err(IngestError::UnmappableHeaders);
        }

        let mut parsed = ParsedSheet {
            stage: IngestStage::HeadersResolved,
            columns,
            accepted: Vec::new(),
            skipped_count: 0,
            row_errors: Vec::new(),
        };
        tracing::debug!(demand_id = %demand_id, columns = parsed.columns.len(), "Headers resolved");

        for index in 1..sheet.row_count() {
            parsed.stage = IngestStage::RowsProcessing;
            let Some(cells) = sheet.row(index) else {
                continue;
            };

            let mut record = IngestedRecord::new(demand_id);
            for (&col, &field) in &parsed.columns {
                if let Some(value) = cells.get(col).and_then(|c| c.to_trimmed_string()) {
                    record.fields.insert(field, value);
                }
            }

            let missing_mandatory = CanonicalField::ALL
                .iter()
                .any(|field| field.is_mandatory() && record.get(*field).is_none());
            if record.is_empty() || missing_mandatory {
                parsed.skipped_count += 1;
                continue;
            }

            // Spreadsheet rows are 1-indexed with the header on row 1.
            let row = index + 1;
            match NewResource::from_record(&record, uploaded_by) {
                Ok(resource) => parsed.accepted.push(resource),
                Err(errors) => {
                    let error = describe(&errors);
                    tracing::warn!(row, error = %error, "Skipping invalid resource row");
                    parsed.row_errors.push(RowError { row, error });
                }
            }
        }

        Ok(parsed)
    }

    /// Parses the sheet and commits the accepted rows as one batch.
    pub async fn ingest(
        &self,
        sheet: &dyn TabularSheet,
        demand_id: Uuid,
        uploaded_by: Option<Uuid>,
    ) -> BatchResult {
        let parsed = match self.parse(sheet, demand_id, uploaded_by) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(demand_id = %demand_id, error = %e, "Upload rejected");
                return BatchResult {
                    accepted_count: 0,
                    error_count: 0,
                    skipped_count: 0,
                    terminal_error: Some(e.to_string()),
                    row_errors: Vec::new(),
                    stage: IngestStage::NotStarted,
                };
            }
        };

        let error_count = parsed.error_count();
        let mut result = BatchResult {
            accepted_count: 0,
            error_count,
            skipped_count: parsed.skipped_count,
            terminal_error: None,
            row_errors: parsed.row_errors,
            stage: parsed.stage,
        };

        if parsed.accepted.is_empty() {
            result.stage = IngestStage::Committed;
        } else {
            match self.store.insert_batch(parsed.accepted).await {
                Ok(inserted) => {
                    result.accepted_count = inserted.len();
                    result.stage = IngestStage::Committed;
                }
                Err(e) => {
                    let err = IngestError::Commit(e.to_string());
                    tracing::error!(demand_id = %demand_id, error = %err, "Upload rolled back");
                    result.terminal_error = Some(err.to_string());
                    result.stage = IngestStage::RolledBack;
                    return result;
                }
            }
        }

        tracing::info!(
            demand_id = %demand_id,
            accepted = result.accepted_count,
            errors = result.error_count,
            skipped = result.skipped_count,
            "Resource upload committed"
        );
        result
    }
}

fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
