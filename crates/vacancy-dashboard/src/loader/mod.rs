//! Record loading: bytes → decoded text → polars `DataFrame`.
//!
//! Loading never fails with an error for data problems. A missing file,
//! undecodable bytes or unparseable text produce an empty table whose
//! [`LoadStatus`] tells the caller what to show. Only an invalid
//! configuration is reported as an error, when the loader is built.
//!
//! ```rust,ignore
//! use vacancy_dashboard::{DashboardConfig, RecordLoader};
//!
//! let loader = RecordLoader::new(&DashboardConfig::default())?;
//! let loaded = loader.load("ALL_AREA.csv");
//! if let Some(message) = loaded.status.user_message() {
//!     eprintln!("{message}");
//! }
//! ```

mod dates;
mod encoding;

pub use dates::{parse_date, parse_date_column};
pub use encoding::{Decoded, decode_with_fallback};

use encoding_rs::Encoding;
use polars::prelude::*;
use sha2::{Digest, Sha256};
use std::fmt::Write;
use std::io::{Cursor, ErrorKind};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::schema::has_column;
use crate::types::{LoadStatus, SourceInfo};

/// A load result: the table, how the load went, and where it came from.
///
/// The table is empty unless `status` is [`LoadStatus::Loaded`].
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub df: DataFrame,
    pub status: LoadStatus,
    pub source: SourceInfo,
}

impl LoadedTable {
    pub(crate) fn empty(status: LoadStatus, source: SourceInfo) -> Self {
        Self {
            df: DataFrame::empty(),
            status,
            source,
        }
    }

    /// `true` when the file was read, decoded and parsed.
    pub fn is_ok(&self) -> bool {
        self.status.is_loaded()
    }
}

/// Hex SHA-256 of raw file content.
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}

/// Read the raw bytes of `path`, mapping failures to a load status.
pub(crate) fn read_source(path: &Path) -> std::result::Result<Vec<u8>, LoadStatus> {
    std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            warn!("Data file not found: {}", path.display());
            LoadStatus::MissingFile {
                expected: path.to_path_buf(),
            }
        }
        _ => {
            warn!("Could not read {}: {}", path.display(), e);
            LoadStatus::ReadFailed {
                reason: e.to_string(),
            }
        }
    })
}

/// Loads vacancy files according to a [`DashboardConfig`].
#[derive(Debug, Clone)]
pub struct RecordLoader {
    config: DashboardConfig,
    fallback: &'static Encoding,
}

impl RecordLoader {
    /// Build a loader, validating the configuration.
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        config.validate()?;
        let fallback = config.resolve_fallback_encoding()?;
        Ok(Self {
            config: config.clone(),
            fallback,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Load `path`. Never panics and never returns an error: failures are
    /// reported through [`LoadedTable::status`].
    pub fn load(&self, path: impl AsRef<Path>) -> LoadedTable {
        let path = path.as_ref();
        match read_source(path) {
            Ok(bytes) => self.load_bytes(path, &bytes),
            Err(status) => LoadedTable::empty(status, SourceInfo::for_path(path)),
        }
    }

    /// Decode and parse bytes already read from `path`.
    pub fn load_bytes(&self, path: &Path, bytes: &[u8]) -> LoadedTable {
        let start_time = Instant::now();
        let mut source = SourceInfo::for_path(path);
        source.size_bytes = bytes.len() as u64;
        source.content_hash = content_hash(bytes);

        let Some(decoded) = decode_with_fallback(bytes, self.fallback) else {
            warn!(
                "{} is neither UTF-8 nor {}",
                path.display(),
                self.fallback.name()
            );
            let status = LoadStatus::DecodeFailed {
                fallback: self.fallback.name().to_string(),
            };
            return LoadedTable::empty(status, source);
        };
        source.encoding = Some(decoded.encoding.name().to_string());

        let mut df = match self.parse_csv(decoded.text) {
            Ok(df) => df,
            Err(e) => {
                warn!("Could not parse {} as CSV: {}", path.display(), e);
                let status = LoadStatus::ParseFailed {
                    reason: e.to_string(),
                };
                return LoadedTable::empty(status, source);
            }
        };

        let date_column = &self.config.columns.notified_date;
        if has_column(&df, date_column) {
            match parse_date_column(&mut df, date_column, &self.config.date_formats) {
                Ok(unparseable) => source.unparseable_dates = unparseable,
                Err(e) => {
                    // leave the column as text rather than fail the load
                    warn!("Could not convert '{}' to dates: {}", date_column, e);
                }
            }
        } else {
            debug!("No '{}' column, skipping date parsing", date_column);
        }

        source.row_count = df.height();
        source.column_count = df.width();
        info!(
            "Loaded {} ({} rows x {} columns, {}) in {}ms",
            source.name,
            source.row_count,
            source.column_count,
            decoded.encoding.name(),
            start_time.elapsed().as_millis()
        );

        LoadedTable {
            df,
            status: LoadStatus::Loaded,
            source,
        }
    }

    /// Parse with inferred column types, falling back to all-text columns
    /// when a value past the inference window contradicts the inferred type.
    fn parse_csv(&self, text: String) -> PolarsResult<DataFrame> {
        let bytes = text.into_bytes();
        match self.read_csv(&bytes, Some(self.config.infer_schema_length)) {
            Ok(df) => Ok(df),
            Err(typed_err) => {
                debug!("Typed CSV read failed ({}), retrying as text", typed_err);
                // 0 rows of inference reads every column as String
                self.read_csv(&bytes, Some(0)).map_err(|_| typed_err)
            }
        }
    }

    fn read_csv(&self, bytes: &[u8], infer_schema_length: Option<usize>) -> PolarsResult<DataFrame> {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(infer_schema_length)
            .with_parse_options(
                CsvParseOptions::default()
                    .with_separator(self.config.delimiter_byte())
                    .with_quote_char(Some(b'"')),
            )
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
    }
}

/// Load `path` with `config`. Shorthand for [`RecordLoader::new`] + [`RecordLoader::load`].
pub fn load(path: impl AsRef<Path>, config: &DashboardConfig) -> Result<LoadedTable> {
    Ok(RecordLoader::new(config)?.load(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scalar;
    use crate::utils::column_values;
    use std::io::Write as _;

    fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    fn loader() -> RecordLoader {
        RecordLoader::new(&DashboardConfig::default()).unwrap()
    }

    #[test]
    fn test_content_hash_is_hex_sha256() {
        let hash = content_hash(b"");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(content_hash(b"a"), content_hash(b"b"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nonexistent.csv");

        let loaded = loader().load(&path);

        assert!(!loaded.is_ok());
        assert_eq!(loaded.status, LoadStatus::MissingFile { expected: path });
        assert_eq!(loaded.df.height(), 0);
        assert_eq!(loaded.source.name, "nonexistent.csv");
    }

    #[test]
    fn test_load_utf8_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "vacancies.csv",
            b"Area,Recruiter,Sta_Area HR\nNorth,A,Vacant\n",
        );

        let loaded = loader().load(&path);

        assert!(loaded.is_ok());
        assert_eq!(loaded.df.shape(), (1, 3));
        assert_eq!(loaded.source.encoding.as_deref(), Some("UTF-8"));
        assert_eq!(
            column_values(&loaded.df, "Sta_Area HR").unwrap(),
            vec![Some(Scalar::text("Vacant"))]
        );
    }

    #[test]
    fn test_load_legacy_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let (bytes, _, _) = encoding_rs::WINDOWS_874.encode("Area,Recruiter\nภาคเหนือ,สมชาย\n");
        let path = write_file(&dir, "thai.csv", &bytes);

        let loaded = loader().load(&path);

        assert!(loaded.is_ok());
        assert_eq!(loaded.source.encoding.as_deref(), Some("windows-874"));
        assert_eq!(
            column_values(&loaded.df, "Recruiter").unwrap(),
            vec![Some(Scalar::text("สมชาย"))]
        );
    }

    #[test]
    fn test_load_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "broken.csv", b"Area\n\xfc\xfd\xfe\xff\n");

        let loaded = loader().load(&path);

        assert!(!loaded.is_ok());
        assert_eq!(loaded.status.code(), "FILE_DECODE_ERROR");
        assert_eq!(loaded.df.height(), 0);
        assert!(!loaded.source.content_hash.is_empty());
    }

    #[test]
    fn test_load_parses_date_column_leniently() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "dated.csv",
            "Area,วันที่แจ้ง\nNorth,2026-01-15\nSouth,someday\n".as_bytes(),
        );

        let loaded = loader().load(&path);

        assert!(loaded.is_ok());
        assert_eq!(loaded.source.unparseable_dates, 1);
        let dates = column_values(&loaded.df, "วันที่แจ้ง").unwrap();
        assert_eq!(
            dates,
            vec![
                Some(Scalar::Date(chrono::NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())),
                None
            ]
        );
    }

    #[test]
    fn test_load_custom_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "semi.csv", b"Area;Position\nNorth;Cashier\n");
        let config = DashboardConfig::builder().delimiter(';').build().unwrap();

        let loaded = load(&path, &config).unwrap();

        assert!(loaded.is_ok());
        assert_eq!(loaded.df.width(), 2);
    }

    #[test]
    fn test_load_column_changing_type_after_inference_window() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = String::from("Area,ST Code\n");
        for i in 0..1500 {
            let code = if i < 1200 {
                (100 + i).to_string()
            } else {
                format!("S{i}")
            };
            content.push_str(&format!("North,{code}\n"));
        }
        let path = write_file(&dir, "late_text.csv", content.as_bytes());

        let loaded = loader().load(&path);

        assert!(loaded.is_ok(), "{:?}", loaded.status);
        assert_eq!(loaded.df.height(), 1500);
        let codes = column_values(&loaded.df, "ST Code").unwrap();
        assert_eq!(codes[0], Some(Scalar::text("100")));
        assert_eq!(codes[1200], Some(Scalar::text("S1200")));
    }

    #[test]
    fn test_load_empty_file_is_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        for (name, bytes) in [("empty.csv", &b""[..]), ("blank_lines.csv", &b"\n\n"[..])] {
            let path = write_file(&dir, name, bytes);

            let loaded = loader().load(&path);

            assert!(
                matches!(loaded.status, LoadStatus::ParseFailed { .. }),
                "{name}: {:?}",
                loaded.status
            );
            assert_eq!(loaded.status.code(), "FILE_PARSE_ERROR");
            assert_eq!(loaded.df.height(), 0);
        }
    }

    #[test]
    fn test_load_header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "header.csv", b"Area,Recruiter\n");

        let loaded = loader().load(&path);

        assert!(loaded.is_ok());
        assert_eq!(loaded.df.shape(), (0, 2));
    }

    #[test]
    fn test_load_directory_is_read_failure() {
        let dir = tempfile::tempdir().unwrap();

        let loaded = loader().load(dir.path());

        assert!(
            matches!(loaded.status, LoadStatus::ReadFailed { .. }),
            "{:?}",
            loaded.status
        );
        assert_eq!(loaded.status.code(), "FILE_READ_ERROR");
        assert!(loaded.status.user_message().unwrap().contains("could not be read"));
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "same.csv", b"Area\nNorth\nSouth\n");
        let loader = loader();

        let first = loader.load(&path);
        let second = loader.load(&path);

        assert!(first.df.equals_missing(&second.df));
        assert_eq!(first.source, second.source);
    }
}
