//! Filter selections and the filter engine.
//!
//! A [`FilterSelection`] maps column names to a [`FilterChoice`]. Applying it
//! keeps the rows whose cell equals every active choice. Equality is the
//! type-aware [`Scalar`] equality, so a text `"1"` never matches an integer
//! `1`, and null cells never match anything.

use polars::prelude::*;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

use crate::error::{DashboardError, Result};
use crate::schema::has_column;
use crate::types::Scalar;
use crate::utils::column_values;

/// Label of the unconstrained choice, first in every option list.
pub const ALL_LABEL: &str = "All";

// ============================================================================
// Selection
// ============================================================================

/// One entry of a filter option list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterChoice {
    /// No constraint on the column.
    All,
    /// Keep only rows equal to this value.
    Value(Scalar),
}

impl FilterChoice {
    pub fn is_all(&self) -> bool {
        matches!(self, FilterChoice::All)
    }

    pub fn value(&self) -> Option<&Scalar> {
        match self {
            FilterChoice::All => None,
            FilterChoice::Value(v) => Some(v),
        }
    }
}

impl fmt::Display for FilterChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterChoice::All => write!(f, "{ALL_LABEL}"),
            FilterChoice::Value(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for FilterChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FilterChoice::All => serializer.serialize_str(ALL_LABEL),
            FilterChoice::Value(v) => v.serialize(serializer),
        }
    }
}

impl From<Scalar> for FilterChoice {
    fn from(value: Scalar) -> Self {
        FilterChoice::Value(value)
    }
}

impl From<&str> for FilterChoice {
    fn from(value: &str) -> Self {
        FilterChoice::Value(Scalar::from(value))
    }
}

impl From<i64> for FilterChoice {
    fn from(value: i64) -> Self {
        FilterChoice::Value(Scalar::Integer(value))
    }
}

/// Per-column choices, in the order they were set.
///
/// Built fresh for each interaction; setting a column twice replaces the
/// earlier choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    entries: Vec<(String, FilterChoice)>,
}

impl Serialize for FilterSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (column, choice) in &self.entries {
            map.serialize_entry(column, choice)?;
        }
        map.end()
    }
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A selection with "All" for each of `columns`.
    pub fn all<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::new();
        for column in columns {
            selection.set(column, FilterChoice::All);
        }
        selection
    }

    /// Constrain `column` to `value`.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.set(column, FilterChoice::Value(value.into()));
        self
    }

    /// Set the choice for `column`, replacing any earlier one.
    pub fn set(&mut self, column: impl Into<String>, choice: FilterChoice) {
        let column = column.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = choice,
            None => self.entries.push((column, choice)),
        }
    }

    /// Select the option of `column` whose label is `text`.
    ///
    /// `"All"` always resolves to [`FilterChoice::All`]. Any other text must
    /// match the display label of one of the column's options, which makes
    /// the choice carry the column's own type (a label `"3"` on an integer
    /// column becomes `Integer(3)`).
    pub fn choose_text(mut self, table: &DataFrame, column: &str, text: &str) -> Result<Self> {
        let text = text.trim();
        let options = FilterEngine::options(table, column)?
            .ok_or_else(|| DashboardError::ColumnNotFound(column.to_string()))?;

        let choice = if text == ALL_LABEL {
            FilterChoice::All
        } else {
            options
                .into_iter()
                .find(|option| !option.is_all() && option.to_string() == text)
                .ok_or_else(|| DashboardError::InvalidSelection {
                    column: column.to_string(),
                    value: text.to_string(),
                })?
        };
        self.set(column, choice);
        Ok(self)
    }

    pub fn get(&self, column: &str) -> Option<&FilterChoice> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, choice)| choice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterChoice)> {
        self.entries.iter().map(|(name, choice)| (name.as_str(), choice))
    }

    /// Entries that actually constrain rows.
    pub fn active(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries
            .iter()
            .filter_map(|(name, choice)| choice.value().map(|v| (name.as_str(), v)))
    }

    /// `true` when no entry constrains rows.
    pub fn is_unconstrained(&self) -> bool {
        self.active().next().is_none()
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Applies selections and lists filter options.
pub struct FilterEngine;

impl FilterEngine {
    /// Keep the rows of `table` that satisfy every active choice.
    ///
    /// Any column named by the selection must exist in `table`, otherwise
    /// the call fails with [`DashboardError::ColumnNotFound`]. A selection
    /// with no active choice returns a copy of `table`.
    pub fn apply(table: &DataFrame, selection: &FilterSelection) -> Result<DataFrame> {
        if let Some((missing, _)) = selection.iter().find(|(name, _)| !has_column(table, name)) {
            return Err(DashboardError::ColumnNotFound(missing.to_string()));
        }

        if selection.is_unconstrained() {
            return Ok(table.clone());
        }

        let mut keep = vec![true; table.height()];
        for (column, value) in selection.active() {
            let cells = column_values(table, column)?;
            for (row, cell) in keep.iter_mut().zip(cells) {
                *row &= cell.as_ref() == Some(value);
            }
        }

        let mask = BooleanChunked::from_slice("mask".into(), &keep);
        let filtered = table.filter(&mask)?;
        debug!(
            "Filtered {} rows down to {}",
            table.height(),
            filtered.height()
        );
        Ok(filtered)
    }

    /// Option list for `column`: "All" followed by its distinct non-null
    /// values in ascending order. `None` when the column is absent.
    pub fn options(table: &DataFrame, column: &str) -> Result<Option<Vec<FilterChoice>>> {
        if !has_column(table, column) {
            return Ok(None);
        }

        let distinct: BTreeSet<Scalar> = column_values(table, column)?
            .into_iter()
            .flatten()
            .collect();

        let mut options = Vec::with_capacity(distinct.len() + 1);
        options.push(FilterChoice::All);
        options.extend(distinct.into_iter().map(FilterChoice::Value));
        Ok(Some(options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vacancies() -> DataFrame {
        df!(
            "Area" => &[Some("North"), Some("South"), Some("North"), None, Some("East")],
            "Recruiter" => &[Some("A"), Some("B"), Some("B"), Some("A"), Some("A")],
            "Sta_Area HR" => &[Some("Vacant"), Some("Filled"), Some("Vacant"), Some("Vacant"), None],
            "Headcount" => &[1i64, 2, 3, 1, 2]
        )
        .unwrap()
    }

    fn row_matches(df: &DataFrame, row: usize, selection: &FilterSelection) -> bool {
        selection.active().all(|(column, value)| {
            column_values(df, column).unwrap()[row].as_ref() == Some(value)
        })
    }

    #[test]
    fn test_all_selection_is_identity() {
        let df = vacancies();
        let selection = FilterSelection::all(["Area", "Recruiter", "Sta_Area HR"]);

        let filtered = FilterEngine::apply(&df, &selection).unwrap();
        assert!(filtered.equals_missing(&df));

        let empty = FilterEngine::apply(&df, &FilterSelection::new()).unwrap();
        assert!(empty.equals_missing(&df));
    }

    #[test]
    fn test_single_filter() {
        let df = vacancies();
        let selection = FilterSelection::new().with("Area", "North");

        let filtered = FilterEngine::apply(&df, &selection).unwrap();

        assert_eq!(filtered.height(), 2);
        assert_eq!(
            column_values(&filtered, "Recruiter").unwrap(),
            vec![Some(Scalar::text("A")), Some(Scalar::text("B"))]
        );
    }

    #[test]
    fn test_filters_combine_with_and() {
        let df = vacancies();
        let selection = FilterSelection::new()
            .with("Recruiter", "A")
            .with("Sta_Area HR", "Vacant");

        let filtered = FilterEngine::apply(&df, &selection).unwrap();

        // rows 0 and 3; row 4 has a null status
        assert_eq!(filtered.height(), 2);
    }

    #[test]
    fn test_filtered_rows_sound_and_complete() {
        let df = vacancies();
        let areas = ["North", "South", "East", "West"];
        let recruiters = ["A", "B"];

        for area in areas {
            for recruiter in recruiters {
                let selection = FilterSelection::new()
                    .with("Area", area)
                    .with("Recruiter", recruiter);
                let filtered = FilterEngine::apply(&df, &selection).unwrap();

                for row in 0..filtered.height() {
                    assert!(row_matches(&filtered, row, &selection));
                }
                let expected = (0..df.height())
                    .filter(|&row| row_matches(&df, row, &selection))
                    .count();
                assert_eq!(filtered.height(), expected, "{area}/{recruiter}");
            }
        }
    }

    #[test]
    fn test_nulls_never_match() {
        let df = vacancies();
        let selection = FilterSelection::new().with("Area", "");

        let filtered = FilterEngine::apply(&df, &selection).unwrap();
        assert_eq!(filtered.height(), 0);
    }

    #[test]
    fn test_equality_is_type_aware() {
        let df = vacancies();

        let as_text = FilterSelection::new().with("Headcount", "1");
        assert_eq!(FilterEngine::apply(&df, &as_text).unwrap().height(), 0);

        let as_int = FilterSelection::new().with("Headcount", 1i64);
        assert_eq!(FilterEngine::apply(&df, &as_int).unwrap().height(), 2);
    }

    #[test]
    fn test_absent_column_is_rejected() {
        let df = vacancies();
        let selection = FilterSelection::new().with("Region", "North");

        let err = FilterEngine::apply(&df, &selection).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");

        let all_on_absent = FilterSelection::all(["Region"]);
        assert!(FilterEngine::apply(&df, &all_on_absent).is_err());
    }

    #[test]
    fn test_options_sorted_deduplicated_without_nulls() {
        let df = vacancies();

        let options = FilterEngine::options(&df, "Area").unwrap().unwrap();

        assert_eq!(
            options,
            vec![
                FilterChoice::All,
                FilterChoice::from("East"),
                FilterChoice::from("North"),
                FilterChoice::from("South"),
            ]
        );
    }

    #[test]
    fn test_options_absent_column() {
        assert_eq!(FilterEngine::options(&vacancies(), "Region").unwrap(), None);
    }

    #[test]
    fn test_choose_text_resolves_typed_option() {
        let df = vacancies();

        let selection = FilterSelection::new()
            .choose_text(&df, "Headcount", "2")
            .unwrap()
            .choose_text(&df, "Area", "All")
            .unwrap();

        assert_eq!(
            selection.get("Headcount"),
            Some(&FilterChoice::Value(Scalar::Integer(2)))
        );
        assert_eq!(selection.get("Area"), Some(&FilterChoice::All));
        assert_eq!(FilterEngine::apply(&df, &selection).unwrap().height(), 2);
    }

    #[test]
    fn test_choose_text_unknown_value() {
        let err = FilterSelection::new()
            .choose_text(&vacancies(), "Area", "West")
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SELECTION");
    }

    #[test]
    fn test_set_replaces_previous_choice() {
        let mut selection = FilterSelection::new().with("Area", "North");
        selection.set("Area", FilterChoice::All);

        assert_eq!(selection.iter().count(), 1);
        assert!(selection.is_unconstrained());
    }

    #[test]
    fn test_choice_serializes_as_plain_value() {
        let json = serde_json::to_string(&vec![
            FilterChoice::All,
            FilterChoice::from("North"),
            FilterChoice::from(3i64),
        ])
        .unwrap();
        assert_eq!(json, r#"["All","North",3]"#);

        let selection = FilterSelection::all(["Area"]).with("Recruiter", "A");
        assert_eq!(
            serde_json::to_string(&selection).unwrap(),
            r#"{"Area":"All","Recruiter":"A"}"#
        );
    }
}
