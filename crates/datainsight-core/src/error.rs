//! Custom error types for the insight pipeline.
//!
//! Only input-shape problems and adapter failures are errors here. Computation
//! degradations (an ill-formed chart spec, a column without valid numbers, a
//! narrative without matching sections) are never errors: they resolve to
//! empty results so the caller can show a placeholder.
//!
//! Errors are serializable so they can be handed to a frontend for display.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::ai::NarrativeFailure;

/// The main error type for the insight pipeline.
#[derive(Error, Debug)]
pub enum InsightError {
    /// The dataset has no records.
    #[error("Dataset is empty")]
    EmptyDataset,

    /// The dataset declares no columns.
    #[error("Dataset has no columns")]
    NoColumns,

    /// A column name appears twice in the column list.
    #[error("Column '{0}' is declared more than once")]
    DuplicateColumn(String),

    /// A record carries a field that is not part of the column set.
    #[error("Record {row} has field '{column}' which is not a dataset column")]
    ColumnMismatch { row: usize, column: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The input file type cannot be decoded.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The narrative generator reported a failure.
    #[error("Narrative generation failed: {0}")]
    Narrative(#[from] NarrativeFailure),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error (only with "ai" feature).
    #[cfg(feature = "ai")]
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<InsightError>,
    },
}

impl InsightError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        InsightError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::NoColumns => "NO_COLUMNS",
            Self::DuplicateColumn(_) => "DUPLICATE_COLUMN",
            Self::ColumnMismatch { .. } => "COLUMN_MISMATCH",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::Narrative(failure) => failure.kind.error_code(),
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            #[cfg(feature = "ai")]
            Self::HttpRequest(_) => "HTTP_REQUEST_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error describes a malformed dataset, raised before any
    /// analysis component runs.
    pub fn is_input_shape(&self) -> bool {
        match self {
            Self::EmptyDataset
            | Self::NoColumns
            | Self::DuplicateColumn(_)
            | Self::ColumnMismatch { .. } => true,
            Self::WithContext { source, .. } => source.is_input_shape(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for InsightError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("InsightError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for insight operations.
pub type Result<T> = std::result::Result<T, InsightError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| InsightError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FailureKind;

    #[test]
    fn test_error_code() {
        assert_eq!(InsightError::EmptyDataset.error_code(), "EMPTY_DATASET");
        assert_eq!(
            InsightError::DuplicateColumn("region".to_string()).error_code(),
            "DUPLICATE_COLUMN"
        );
    }

    #[test]
    fn test_narrative_error_code_follows_failure_kind() {
        let error = InsightError::from(NarrativeFailure::new(
            FailureKind::QuotaExceeded,
            "quota exhausted",
        ));
        assert_eq!(error.error_code(), "QUOTA_EXCEEDED");
    }

    #[test]
    fn test_is_input_shape() {
        assert!(InsightError::EmptyDataset.is_input_shape());
        assert!(
            InsightError::ColumnMismatch {
                row: 2,
                column: "extra".to_string()
            }
            .is_input_shape()
        );
        assert!(!InsightError::InvalidConfig("bad".to_string()).is_input_shape());
    }

    #[test]
    fn test_error_serialization() {
        let error = InsightError::ColumnMismatch {
            row: 3,
            column: "bonus".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_MISMATCH"));
        assert!(json.contains("bonus"));
    }

    #[test]
    fn test_with_context() {
        let error = InsightError::NoColumns.with_context("While loading sales.csv");
        assert!(error.to_string().contains("While loading sales.csv"));
        assert_eq!(error.error_code(), "NO_COLUMNS");
        assert!(error.is_input_shape());
    }
}
