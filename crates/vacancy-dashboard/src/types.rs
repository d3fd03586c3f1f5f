use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

// ============================================================================
// Cell values
// ============================================================================

/// A single non-null cell value.
///
/// Equality is type-aware: `Text("1")` never equals `Integer(1)`, and an
/// integer never equals a float. Floats compare by bit pattern so the type
/// can be hashed and totally ordered.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
}

impl Scalar {
    /// Convenience constructor for text values.
    pub fn text(value: impl Into<String>) -> Self {
        Scalar::Text(value.into())
    }

    fn rank(&self) -> u8 {
        match self {
            Scalar::Boolean(_) => 0,
            Scalar::Integer(_) => 1,
            Scalar::Float(_) => 2,
            Scalar::Date(_) => 3,
            Scalar::Text(_) => 4,
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Scalar::Text(a), Scalar::Text(b)) => a.cmp(b),
            (Scalar::Integer(a), Scalar::Integer(b)) => a.cmp(b),
            (Scalar::Float(a), Scalar::Float(b)) => a.total_cmp(b),
            (Scalar::Boolean(a), Scalar::Boolean(b)) => a.cmp(b),
            (Scalar::Date(a), Scalar::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Scalar::Text(s) => s.hash(state),
            Scalar::Integer(i) => i.hash(state),
            Scalar::Float(f) => f.to_bits().hash(state),
            Scalar::Boolean(b) => b.hash(state),
            Scalar::Date(d) => d.hash(state),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => write!(f, "{s}"),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Boolean(b) => write!(f, "{b}"),
            Scalar::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(value: NaiveDate) -> Self {
        Scalar::Date(value)
    }
}

// ============================================================================
// Aggregates
// ============================================================================

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub value: Scalar,
    pub count: usize,
}

// ============================================================================
// Loading
// ============================================================================

/// Outcome of a load attempt.
///
/// Only `Loaded` carries data; every other variant comes with an empty table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadStatus {
    /// The file was read, decoded and parsed.
    Loaded,
    /// No file exists at the expected path.
    MissingFile { expected: PathBuf },
    /// The file exists but could not be read (permissions, I/O error).
    ReadFailed { reason: String },
    /// The bytes are neither valid UTF-8 nor valid in the fallback encoding.
    DecodeFailed { fallback: String },
    /// The text decoded but is not a readable delimited table.
    ParseFailed { reason: String },
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded)
    }

    /// Stable code for frontend handling.
    pub fn code(&self) -> &'static str {
        match self {
            LoadStatus::Loaded => "LOADED",
            LoadStatus::MissingFile { .. } => "FILE_NOT_FOUND",
            LoadStatus::ReadFailed { .. } => "FILE_READ_ERROR",
            LoadStatus::DecodeFailed { .. } => "FILE_DECODE_ERROR",
            LoadStatus::ParseFailed { .. } => "FILE_PARSE_ERROR",
        }
    }

    /// Message to show the user, `None` when loading succeeded.
    pub fn user_message(&self) -> Option<String> {
        match self {
            LoadStatus::Loaded => None,
            LoadStatus::MissingFile { expected } => {
                let name = expected
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| expected.display().to_string());
                Some(format!(
                    "File '{name}' not found. Place it in the same folder as the program."
                ))
            }
            LoadStatus::ReadFailed { reason } => {
                Some(format!("The data file could not be read: {reason}"))
            }
            LoadStatus::DecodeFailed { fallback } => Some(format!(
                "The data file is neither UTF-8 nor {fallback} text. Please check the CSV file."
            )),
            LoadStatus::ParseFailed { reason } => Some(format!(
                "The data file is not a readable CSV table ({reason}). Please check the CSV file."
            )),
        }
    }
}

/// Metadata about a loaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub path: String,
    pub name: String,
    pub size_bytes: u64,
    /// Hex SHA-256 of the raw file bytes, empty when nothing was read.
    pub content_hash: String,
    /// Name of the encoding that decoded the file.
    pub encoding: Option<String>,
    pub row_count: usize,
    pub column_count: usize,
    /// Date cells that matched none of the configured formats.
    pub unparseable_dates: usize,
}

impl SourceInfo {
    pub(crate) fn for_path(path: &std::path::Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Self {
            path: path.display().to_string(),
            name,
            size_bytes: 0,
            content_hash: String::new(),
            encoding: None,
            row_count: 0,
            column_count: 0,
            unparseable_dates: 0,
        }
    }
}
