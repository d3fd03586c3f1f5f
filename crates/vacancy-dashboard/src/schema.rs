//! Schema probing for the expected-but-optional vacancy columns.
//!
//! The probe runs once per load and yields a [`Capabilities`] set. Every
//! column-dependent feature consults it instead of re-checking the table, so
//! an absent column disables its features in exactly one place.

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::debug;

use crate::config::ColumnNames;

/// Check whether `table` has a column named exactly `name`.
pub fn has_column(table: &DataFrame, name: &str) -> bool {
    table
        .get_column_names()
        .iter()
        .any(|column| column.as_str() == name)
}

/// Which of the expected columns are present in a loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub area: bool,
    pub recruiter: bool,
    pub status: bool,
    pub store: bool,
    pub position: bool,
    pub notified_date: bool,
}

impl Capabilities {
    /// Names of the filterable columns (area, recruiter, status) that exist,
    /// in the order filters are offered.
    pub fn filterable_columns<'a>(&self, columns: &'a ColumnNames) -> Vec<&'a str> {
        [
            (self.area, columns.area.as_str()),
            (self.recruiter, columns.recruiter.as_str()),
            (self.status, columns.status.as_str()),
        ]
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .collect()
    }

    /// Expected columns that are absent, by configured name.
    pub fn missing_columns<'a>(&self, columns: &'a ColumnNames) -> Vec<&'a str> {
        [
            (self.area, columns.area.as_str()),
            (self.recruiter, columns.recruiter.as_str()),
            (self.status, columns.status.as_str()),
            (self.store, columns.store.as_str()),
            (self.position, columns.position.as_str()),
            (self.notified_date, columns.notified_date.as_str()),
        ]
        .into_iter()
        .filter_map(|(present, name)| (!present).then_some(name))
        .collect()
    }
}

/// Schema probe over the configured column names.
pub struct SchemaProbe;

impl SchemaProbe {
    pub fn probe(table: &DataFrame, columns: &ColumnNames) -> Capabilities {
        let capabilities = Capabilities {
            area: has_column(table, &columns.area),
            recruiter: has_column(table, &columns.recruiter),
            status: has_column(table, &columns.status),
            store: has_column(table, &columns.store),
            position: has_column(table, &columns.position),
            notified_date: has_column(table, &columns.notified_date),
        };
        debug!("Probed schema: {:?}", capabilities);
        capabilities
    }
}
