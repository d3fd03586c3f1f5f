//! Configuration types for the dashboard core.
//!
//! This module provides configuration options using the builder pattern.
//! A configuration can also be read from a JSON file, in which case every
//! field is optional and missing fields take their defaults.

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DashboardError, ResultExt};

/// File name the dashboard looks for when no input path is given.
pub const DEFAULT_INPUT_FILE: &str = "Vacancy File-Store&Area Hr 2026.xlsx - ALL_AREA.csv";

/// WHATWG label of the legacy single-byte encoding tried after UTF-8.
///
/// The source files are exported from Thai-locale spreadsheets, so the
/// Windows Thai code page (a superset of TIS-620) is the default.
pub const DEFAULT_FALLBACK_ENCODING: &str = "windows-874";

/// Name of the notification-date column ("date notified").
pub const DEFAULT_DATE_COLUMN: &str = "วันที่แจ้ง";

/// Exact column names the dashboard expects.
///
/// Every column is optional in the input; a missing one only disables the
/// features that depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub area: String,
    pub recruiter: String,
    pub status: String,
    pub store: String,
    pub position: String,
    pub notified_date: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            area: "Area".to_string(),
            recruiter: "Recruiter".to_string(),
            status: "Sta_Area HR".to_string(),
            store: "ST Name".to_string(),
            position: "Position".to_string(),
            notified_date: DEFAULT_DATE_COLUMN.to_string(),
        }
    }
}

impl ColumnNames {
    fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("area", &self.area),
            ("recruiter", &self.recruiter),
            ("status", &self.status),
            ("store", &self.store),
            ("position", &self.position),
            ("notified_date", &self.notified_date),
        ]
    }
}

/// chrono formats tried, in order, for the notification-date column.
///
/// Month-first is tried before day-first for slash dates, so an ambiguous
/// `01/02/2026` reads as January 2nd.
pub fn default_date_formats() -> Vec<String> {
    [
        "%Y-%m-%d",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%m/%d/%Y",
        "%d/%m/%Y",
        "%m/%d/%Y %H:%M",
        "%d/%m/%Y %H:%M",
        "%Y/%m/%d",
        "%d-%m-%Y",
        "%d %b %Y",
        "%d-%b-%Y",
    ]
    .iter()
    .map(|f| f.to_string())
    .collect()
}

/// Configuration for loading and summarising a vacancy file.
///
/// Use [`DashboardConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use vacancy_dashboard::config::DashboardConfig;
///
/// let config = DashboardConfig::builder()
///     .input_path("vacancies.csv")
///     .top_n(5)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Path of the delimited text file to load.
    /// Default: [`DEFAULT_INPUT_FILE`]
    pub input_path: PathBuf,

    /// Field delimiter, must be a single ASCII character.
    /// Default: ','
    pub delimiter: char,

    /// Label of the single-byte encoding tried when UTF-8 decoding fails.
    /// Default: [`DEFAULT_FALLBACK_ENCODING`]
    pub fallback_encoding: String,

    /// Number of rows sampled for column type inference.
    /// Default: 1000
    pub infer_schema_length: usize,

    /// Exact names of the expected columns.
    pub columns: ColumnNames,

    /// Date formats for the notification-date column.
    pub date_formats: Vec<String>,

    /// Status value counted as an open vacancy.
    /// Default: "Vacant"
    pub vacant_value: String,

    /// Number of entries in the top positions chart.
    /// Default: 10
    pub top_n: usize,

    /// Maximum number of grid rows serialized into a dashboard view.
    /// Default: 100
    pub grid_row_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_FILE),
            delimiter: ',',
            fallback_encoding: DEFAULT_FALLBACK_ENCODING.to_string(),
            infer_schema_length: 1000,
            columns: ColumnNames::default(),
            date_formats: default_date_formats(),
            vacant_value: "Vacant".to_string(),
            top_n: 10,
            grid_row_limit: 100,
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration builder.
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Read a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DashboardError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(DashboardError::from)
            .context(format!("Reading config file {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.delimiter.is_ascii() {
            return Err(ConfigValidationError::InvalidDelimiter(self.delimiter));
        }

        self.resolve_fallback_encoding()?;

        if self.top_n == 0 {
            return Err(ConfigValidationError::InvalidTopN(self.top_n));
        }

        if self.date_formats.is_empty() {
            return Err(ConfigValidationError::NoDateFormats);
        }

        if let Some((field, _)) = self
            .columns
            .fields()
            .into_iter()
            .find(|(_, name)| name.trim().is_empty())
        {
            return Err(ConfigValidationError::EmptyColumnName(field.to_string()));
        }

        Ok(())
    }

    /// Look up the fallback encoding by its WHATWG label.
    pub fn resolve_fallback_encoding(&self) -> Result<&'static Encoding, ConfigValidationError> {
        let encoding = Encoding::for_label(self.fallback_encoding.trim().as_bytes())
            .ok_or_else(|| ConfigValidationError::UnknownEncoding(self.fallback_encoding.clone()))?;
        if !encoding.is_single_byte() {
            return Err(ConfigValidationError::NotSingleByte(
                encoding.name().to_string(),
            ));
        }
        Ok(encoding)
    }

    /// Delimiter as the byte polars expects.
    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII
        self.delimiter as u8
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid delimiter {0:?} (must be a single ASCII character)")]
    InvalidDelimiter(char),

    #[error("Unknown fallback encoding label '{0}'")]
    UnknownEncoding(String),

    #[error("Fallback encoding '{0}' is not a single-byte encoding")]
    NotSingleByte(String),

    #[error("Invalid top-n: {0} (must be at least 1)")]
    InvalidTopN(usize),

    #[error("At least one date format is required")]
    NoDateFormats,

    #[error("Column name for '{0}' must not be empty")]
    EmptyColumnName(String),
}

impl From<ConfigValidationError> for DashboardError {
    fn from(err: ConfigValidationError) -> Self {
        match err {
            ConfigValidationError::UnknownEncoding(label) => DashboardError::UnknownEncoding(label),
            other => DashboardError::InvalidConfig(other.to_string()),
        }
    }
}

/// Builder for [`DashboardConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    input_path: Option<PathBuf>,
    delimiter: Option<char>,
    fallback_encoding: Option<String>,
    infer_schema_length: Option<usize>,
    columns: Option<ColumnNames>,
    date_formats: Option<Vec<String>>,
    vacant_value: Option<String>,
    top_n: Option<usize>,
    grid_row_limit: Option<usize>,
}

impl DashboardConfigBuilder {
    /// Start from an existing configuration, e.g. one read from a file.
    pub fn from_config(config: DashboardConfig) -> Self {
        Self {
            input_path: Some(config.input_path),
            delimiter: Some(config.delimiter),
            fallback_encoding: Some(config.fallback_encoding),
            infer_schema_length: Some(config.infer_schema_length),
            columns: Some(config.columns),
            date_formats: Some(config.date_formats),
            vacant_value: Some(config.vacant_value),
            top_n: Some(config.top_n),
            grid_row_limit: Some(config.grid_row_limit),
        }
    }

    /// Set the path of the file to load.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the field delimiter.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set the legacy encoding tried after UTF-8 (a WHATWG label such as
    /// `"windows-1252"` or `"tis-620"`).
    pub fn fallback_encoding(mut self, label: impl Into<String>) -> Self {
        self.fallback_encoding = Some(label.into());
        self
    }

    /// Set how many rows polars samples for type inference.
    pub fn infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Override the expected column names.
    pub fn columns(mut self, columns: ColumnNames) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Replace the list of accepted date formats.
    pub fn date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_formats = Some(formats.into_iter().map(Into::into).collect());
        self
    }

    /// Set the status value counted as an open vacancy.
    pub fn vacant_value(mut self, value: impl Into<String>) -> Self {
        self.vacant_value = Some(value.into());
        self
    }

    /// Set the length of the top positions chart.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Set the maximum number of grid rows serialized in a view.
    pub fn grid_row_limit(mut self, rows: usize) -> Self {
        self.grid_row_limit = Some(rows);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `DashboardConfig` or an error if validation fails.
    pub fn build(self) -> Result<DashboardConfig, ConfigValidationError> {
        let defaults = DashboardConfig::default();
        let config = DashboardConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            fallback_encoding: self.fallback_encoding.unwrap_or(defaults.fallback_encoding),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
            columns: self.columns.unwrap_or(defaults.columns),
            date_formats: self.date_formats.unwrap_or(defaults.date_formats),
            vacant_value: self.vacant_value.unwrap_or(defaults.vacant_value),
            top_n: self.top_n.unwrap_or(defaults.top_n),
            grid_row_limit: self.grid_row_limit.unwrap_or(defaults.grid_row_limit),
        };

        config.validate()?;
        Ok(config)
    }
}
