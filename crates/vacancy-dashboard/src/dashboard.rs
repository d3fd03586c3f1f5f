//! One dashboard interaction cycle.
//!
//! [`Dashboard`] wraps a successfully loaded table. It probes the schema and
//! computes filter option lists once, then [`Dashboard::render`] turns a
//! [`FilterSelection`] into a [`DashboardView`]: metrics, the three chart
//! inputs and the first rows of the filtered grid.
//!
//! Widgets whose column is absent are left out of the view (their fields
//! are `None` and skipped when serializing), so a partial file still renders.

use chrono::Local;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::aggregate::Aggregator;
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result, ResultExt};
use crate::filter::{FilterChoice, FilterEngine, FilterSelection};
use crate::loader::LoadedTable;
use crate::schema::{Capabilities, SchemaProbe};
use crate::types::{FrequencyEntry, Scalar, SourceInfo};
use crate::utils::grid_rows;

// ============================================================================
// View Types
// ============================================================================

/// Option list of one filterable column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub column: String,
    pub options: Vec<FilterChoice>,
}

/// Headline numbers of the filtered view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metrics {
    /// Rows in the filtered view.
    pub total_positions: usize,
    /// Distinct store names, `None` without a store column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_count: Option<usize>,
    /// Rows whose status is the configured vacant value, `None` without a
    /// status column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vacant_count: Option<usize>,
}

/// Everything a presentation layer needs for one render.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// Timestamp when the view was generated
    pub generated_at: String,
    pub source: SourceInfo,
    pub selection: FilterSelection,
    pub capabilities: Capabilities,
    /// Expected columns the file does not have.
    pub missing_columns: Vec<String>,
    pub filter_options: Vec<FilterOptions>,
    pub metrics: Metrics,
    /// Pie chart input: count per status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_distribution: Option<Vec<FrequencyEntry>>,
    /// Bar chart input: count per recruiter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recruiter_workload: Option<Vec<FrequencyEntry>>,
    /// Horizontal bar chart input: most frequent positions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_positions: Option<Vec<FrequencyEntry>>,
    /// Grid header.
    pub columns: Vec<String>,
    /// Grid body, at most `grid_row_limit` rows.
    pub rows: Vec<Vec<Option<Scalar>>>,
    /// Height of the whole filtered view.
    pub shown_rows: usize,
}

impl DashboardView {
    /// `true` when the grid holds fewer rows than the filtered view.
    pub fn is_truncated(&self) -> bool {
        self.rows.len() < self.shown_rows
    }
}

// ============================================================================
// Dashboard
// ============================================================================

/// A loaded table ready to be filtered and summarised.
#[derive(Debug, Clone)]
pub struct Dashboard {
    table: Arc<LoadedTable>,
    config: DashboardConfig,
    capabilities: Capabilities,
    filter_options: Vec<FilterOptions>,
}

impl Dashboard {
    /// Prepare a dashboard over `table`.
    ///
    /// Fails with [`DashboardError::NoDataLoaded`] unless the load succeeded;
    /// callers show [`crate::LoadStatus::user_message`] instead.
    pub fn new(table: Arc<LoadedTable>, config: &DashboardConfig) -> Result<Self> {
        if !table.is_ok() {
            return Err(DashboardError::NoDataLoaded);
        }

        let capabilities = SchemaProbe::probe(&table.df, &config.columns);
        let mut filter_options = Vec::new();
        for column in capabilities.filterable_columns(&config.columns) {
            let options = FilterEngine::options(&table.df, column)
                .context(format!("Listing filter options for '{column}'"))?;
            if let Some(options) = options {
                filter_options.push(FilterOptions {
                    column: column.to_string(),
                    options,
                });
            }
        }

        debug!(
            "Dashboard ready with {} filters, missing columns: {:?}",
            filter_options.len(),
            capabilities.missing_columns(&config.columns)
        );

        Ok(Self {
            table,
            config: config.clone(),
            capabilities,
            filter_options,
        })
    }

    pub fn table(&self) -> &LoadedTable {
        &self.table
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn filter_options(&self) -> &[FilterOptions] {
        &self.filter_options
    }

    /// "All" for every offered filter.
    pub fn default_selection(&self) -> FilterSelection {
        FilterSelection::all(self.filter_options.iter().map(|f| f.column.clone()))
    }

    /// Apply `selection` to the loaded table.
    pub fn filtered_view(&self, selection: &FilterSelection) -> Result<DataFrame> {
        FilterEngine::apply(&self.table.df, selection)
    }

    /// Run one interaction cycle.
    pub fn render(&self, selection: &FilterSelection) -> Result<DashboardView> {
        let start_time = Instant::now();
        let view = self.filtered_view(selection)?;
        let columns = &self.config.columns;
        let caps = self.capabilities;

        let metrics = Metrics {
            total_positions: Aggregator::total_count(&view),
            store_count: caps
                .store
                .then(|| Aggregator::distinct_count(&view, &columns.store))
                .transpose()?,
            vacant_count: caps
                .status
                .then(|| {
                    let vacant = Scalar::text(self.config.vacant_value.as_str());
                    Aggregator::matching_count(&view, &columns.status, &vacant)
                })
                .transpose()?,
        };

        let status_distribution = caps
            .status
            .then(|| Aggregator::frequency(&view, &columns.status))
            .transpose()?;
        let recruiter_workload = caps
            .recruiter
            .then(|| Aggregator::frequency(&view, &columns.recruiter))
            .transpose()?;
        let top_positions = caps
            .position
            .then(|| Aggregator::top_n(&view, &columns.position, self.config.top_n))
            .transpose()?;

        let rendered = DashboardView {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            source: self.table.source.clone(),
            selection: selection.clone(),
            capabilities: caps,
            missing_columns: caps
                .missing_columns(columns)
                .into_iter()
                .map(str::to_string)
                .collect(),
            filter_options: self.filter_options.clone(),
            metrics,
            status_distribution,
            recruiter_workload,
            top_positions,
            columns: view
                .get_column_names()
                .iter()
                .map(|name| name.to_string())
                .collect(),
            rows: grid_rows(&view, self.config.grid_row_limit).context("Building data grid")?,
            shown_rows: view.height(),
        };

        info!(
            "Rendered {} of {} rows in {}ms",
            rendered.shown_rows,
            self.table.df.height(),
            start_time.elapsed().as_millis()
        );
        Ok(rendered)
    }
}
