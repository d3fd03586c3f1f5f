//! Error types for the dashboard core.
//!
//! Only contract violations and infrastructure failures are errors here. Data
//! quality problems (missing file, undecodable bytes, absent columns, bad
//! dates) are reported through [`crate::LoadStatus`] and
//! [`crate::Capabilities`] instead, so a presentation layer can degrade
//! gracefully.
//!
//! Errors are serializable so they can be handed to a frontend as JSON.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the dashboard core.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A filter or aggregate referenced a column the table does not have.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A selection value does not belong to the column's option list.
    #[error("Value '{value}' is not an option for column '{column}'")]
    InvalidSelection { column: String, value: String },

    /// The configured fallback encoding label is not known.
    #[error("Unknown text encoding '{0}'")]
    UnknownEncoding(String),

    /// An operation needed a loaded table but the load did not succeed.
    #[error("No data loaded")]
    NoDataLoaded,

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
        source: Box<DashboardError>,
    },
}

impl DashboardError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        DashboardError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidSelection { .. } => "INVALID_SELECTION",
            Self::UnknownEncoding(_) => "UNKNOWN_ENCODING",
            Self::NoDataLoaded => "NO_DATA_LOADED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is a caller contract violation rather than an
    /// infrastructure failure.
    pub fn is_contract_violation(&self) -> bool {
        match self {
            Self::ColumnNotFound(_) | Self::InvalidSelection { .. } => true,
            Self::WithContext { source, .. } => source.is_contract_violation(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for DashboardError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("DashboardError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;

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
        self.map_err(|e| DashboardError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(DashboardError::NoDataLoaded.error_code(), "NO_DATA_LOADED");
        assert_eq!(
            DashboardError::ColumnNotFound("Area".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_contract_violation() {
        assert!(DashboardError::ColumnNotFound("Area".to_string()).is_contract_violation());
        assert!(
            DashboardError::InvalidSelection {
                column: "Area".to_string(),
                value: "Nowhere".to_string(),
            }
            .is_contract_violation()
        );
        assert!(!DashboardError::NoDataLoaded.is_contract_violation());
    }

    #[test]
    fn test_error_serialization() {
        let error = DashboardError::ColumnNotFound("Recruiter".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Recruiter"));
    }

    #[test]
    fn test_with_context() {
        let error = DashboardError::ColumnNotFound("Area".to_string())
            .with_context("While applying filters");
        assert!(error.to_string().contains("While applying filters"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
        assert!(error.is_contract_violation());
    }
}
