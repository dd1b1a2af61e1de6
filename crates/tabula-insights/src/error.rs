//! Custom error types for the insight pipeline.
//!
//! This module provides a comprehensive error hierarchy using `thiserror`
//! for better error handling and context throughout the pipeline.
//!
//! Errors are serializable so the HTTP layer can send them to clients as
//! structured JSON.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the insight pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The dataset could not be loaded. This is the only fatal stage error.
    #[error("Failed to ingest dataset: {0}")]
    IngestFailed(String),

    /// A non-ingest stage failed. Recorded per stage, never aborts the run.
    #[error("Stage '{stage}' failed: {reason}")]
    StageFailed { stage: String, reason: String },

    /// The language model could not produce a reply.
    #[error("Language model unavailable: {0}")]
    ModelUnavailable(String),

    /// A report id was not present in the store.
    #[error("Report '{0}' not found")]
    ReportNotFound(String),

    /// A report id contained path separators or other rejected characters.
    #[error("Invalid report id '{0}'")]
    InvalidReportId(String),

    /// Reading or writing the report store failed.
    #[error("Report storage error: {0}")]
    Storage(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable machine-readable code for API clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::IngestFailed(_) => "INGEST_FAILED",
            Self::StageFailed { .. } => "STAGE_FAILED",
            Self::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            Self::ReportNotFound(_) => "REPORT_NOT_FOUND",
            Self::InvalidReportId(_) => "INVALID_REPORT_ID",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error aborts a pipeline run.
    ///
    /// Only ingest failures (and the config errors that prevent a run from
    /// starting) are fatal; everything else is recorded per stage.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::IngestFailed(_) | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// Check if this error maps to an HTTP 404.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::ReportNotFound(_) | Self::InvalidReportId(_) => true,
            Self::WithContext { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

/// Serialize implementation for API error payloads.
///
/// Errors are serialized as a struct with `code` and `message` fields,
/// making them easy to handle in clients.
impl Serialize for PipelineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PipelineError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

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
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            PipelineError::IngestFailed("bad file".to_string()).error_code(),
            "INGEST_FAILED"
        );
        assert_eq!(
            PipelineError::ReportNotFound("orders_x".to_string()).error_code(),
            "REPORT_NOT_FOUND"
        );
    }

    #[test]
    fn test_is_fatal() {
        assert!(PipelineError::IngestFailed("empty".to_string()).is_fatal());
        assert!(
            !PipelineError::StageFailed {
                stage: "cleaner".to_string(),
                reason: "dataset missing".to_string(),
            }
            .is_fatal()
        );
        assert!(!PipelineError::ModelUnavailable("timeout".to_string()).is_fatal());
    }

    #[test]
    fn test_is_not_found() {
        assert!(PipelineError::ReportNotFound("x".to_string()).is_not_found());
        assert!(PipelineError::InvalidReportId("../etc".to_string()).is_not_found());
        assert!(!PipelineError::Storage("disk full".to_string()).is_not_found());
    }

    #[test]
    fn test_error_serialization() {
        let error = PipelineError::ReportNotFound("sales_20240101".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("REPORT_NOT_FOUND"));
        assert!(json.contains("sales_20240101"));
    }

    #[test]
    fn test_with_context() {
        let error = PipelineError::Storage("permission denied".to_string())
            .with_context("While saving report");
        assert!(error.to_string().contains("While saving report"));
        assert_eq!(error.error_code(), "STORAGE_ERROR"); // Preserves original code
    }
}
