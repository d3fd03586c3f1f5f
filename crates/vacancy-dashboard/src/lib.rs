//! Vacancy Dashboard Core
//!
//! Loading, filtering and aggregation for an HR job-vacancy dashboard, built
//! with Rust and Polars.
//!
//! # Overview
//!
//! - **Loading**: reads a delimited vacancy file, decoding UTF-8 first and a
//!   legacy single-byte encoding (Thai `windows-874` by default) second, and
//!   parses the notification-date column leniently
//! - **Schema probing**: every expected column is optional; an absent one
//!   disables only the features that need it
//! - **Filtering**: per-column "All"-or-value selections combined with AND
//! - **Aggregation**: counts, distinct counts and frequency tables for the
//!   metric cards and charts
//! - **Caching**: a process-wide table cache keyed by file content
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vacancy_dashboard::{Dashboard, DashboardConfig, RecordLoader, TableCache};
//!
//! let config = DashboardConfig::builder()
//!     .input_path("ALL_AREA.csv")
//!     .build()?;
//! let loader = RecordLoader::new(&config)?;
//!
//! let table = TableCache::global().load(&loader, &config.input_path);
//! if let Some(message) = table.status.user_message() {
//!     eprintln!("{message}");
//!     return Ok(());
//! }
//!
//! let dashboard = Dashboard::new(table, &config)?;
//! let selection = dashboard.default_selection().with("Area", "North");
//! let view = dashboard.render(&selection)?;
//!
//! println!("Total positions: {}", view.metrics.total_positions);
//! ```
//!
//! # Lower-level API
//!
//! The pieces behind [`Dashboard`] are usable on any polars `DataFrame`:
//!
//! ```rust,ignore
//! use vacancy_dashboard::{Aggregator, FilterEngine, FilterSelection};
//!
//! let view = FilterEngine::apply(&df, &FilterSelection::new().with("Recruiter", "Somchai"))?;
//! let by_status = Aggregator::frequency(&view, "Sta_Area HR")?;
//! ```

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod schema;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use aggregate::Aggregator;
pub use cache::TableCache;
pub use config::{ColumnNames, ConfigValidationError, DashboardConfig, DashboardConfigBuilder};
pub use dashboard::{Dashboard, DashboardView, FilterOptions, Metrics};
pub use error::{DashboardError, Result as DashboardResult, ResultExt};
pub use filter::{ALL_LABEL, FilterChoice, FilterEngine, FilterSelection};
pub use loader::{LoadedTable, RecordLoader, content_hash, load};
pub use schema::{Capabilities, SchemaProbe, has_column};
pub use types::{FrequencyEntry, LoadStatus, Scalar, SourceInfo};
pub use utils::{DtypeCategory, column_values, get_dtype_category, grid_rows};
