//! Custom error types for the analysis pipeline.
//!
//! This module provides the error hierarchy using `thiserror` for the
//! loading, preprocessing and export stages.
//!
//! Errors are serializable so they can be embedded in JSON output alongside
//! the analysis report.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum EdaError {
    /// Input workbook does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input file has an extension other than a spreadsheet workbook.
    #[error("Unsupported file format: '{0}' (expected .xlsx or .xls)")]
    UnsupportedFormat(String),

    /// Workbook contains no worksheet or no header row.
    #[error("Workbook '{}' contains no readable sheet", .0.display())]
    EmptyWorkbook(PathBuf),

    /// Spreadsheet reader error.
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A derived column name is already taken by another column.
    #[error("Derived column '{0}' would replace an existing column")]
    ColumnCollision(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EdaError>,
    },
}

impl EdaError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EdaError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InputNotFound(_) => "INPUT_NOT_FOUND",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::EmptyWorkbook(_) => "EMPTY_WORKBOOK",
            Self::Workbook(_) => "WORKBOOK_ERROR",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::ColumnCollision(_) => "COLUMN_COLLISION",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is a load-time rejection of the input.
    ///
    /// These are reported to the user and end the run without a result,
    /// rather than being treated as a fault in the data processing itself.
    pub fn is_load_failure(&self) -> bool {
        match self {
            Self::InputNotFound(_)
            | Self::UnsupportedFormat(_)
            | Self::EmptyWorkbook(_)
            | Self::Workbook(_) => true,
            Self::WithContext { source, .. } => source.is_load_failure(),
            _ => false,
        }
    }
}

impl From<crate::config::ConfigValidationError> for EdaError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        EdaError::InvalidConfig(err.to_string())
    }
}

impl Serialize for EdaError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("EdaError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, EdaError>;

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
        self.map_err(|e| EdaError::Polars(e).with_context(context))
    }
}
