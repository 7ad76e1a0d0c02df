//! Resource upload batch models.

use serde::Serialize;

/// Progress of one upload pass.
///
/// `NotStarted → HeadersResolved → RowsProcessing → {Committed | RolledBack}`.
/// A batch rejected for unmappable headers never leaves `NotStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStage {
    NotStarted,
    HeadersResolved,
    RowsProcessing,
    Committed,
    RolledBack,
}

impl IngestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::HeadersResolved => "headers_resolved",
            Self::RowsProcessing => "rows_processing",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::RolledBack)
    }
}

impl std::fmt::Display for IngestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A data row that could not be turned into a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// Spreadsheet row number (1-indexed, header is row 1).
    pub row: usize,
    pub error: String,
}

/// Outcome of one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// Rows persisted. Zero when the batch was rejected or rolled back.
    pub accepted_count: usize,
    /// Rows that failed resource construction.
    pub error_count: usize,
    /// Blank or nameless rows passed over without counting as errors.
    pub skipped_count: usize,
    /// Batch-level failure (unmappable headers or commit failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_error: Option<String>,
    pub row_errors: Vec<RowError>,
    pub stage: IngestStage,
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        self.terminal_error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_as_str() {
        assert_eq!(IngestStage::NotStarted.as_str(), "not_started");
        assert_eq!(IngestStage::RolledBack.as_str(), "rolled_back");
        assert!(IngestStage::Committed.is_terminal());
        assert!(!IngestStage::RowsProcessing.is_terminal());
    }

    #[test]
    fn test_batch_result_serialize() {
        let result = BatchResult {
            accepted_count: 3,
            error_count: 1,
            skipped_count: 2,
            terminal_error: None,
            row_errors: vec![RowError {
                row: 5,
                error: "name must be 1-255 characters".to_string(),
            }],
            stage: IngestStage::Committed,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["acceptedCount"], 3);
        assert_eq!(json["rowErrors"][0]["row"], 5);
        assert_eq!(json["stage"], "committed");
        assert!(json.get("terminalError").is_none());
    }
}
