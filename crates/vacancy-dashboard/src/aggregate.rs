//! Aggregates over a filtered view.
//!
//! Every function here is pure and tolerates absent columns: counts become
//! 0 and frequency tables become empty. Presentation code decides whether an
//! absent column hides a widget; see [`crate::schema::Capabilities`].

use polars::prelude::DataFrame;
use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::schema::has_column;
use crate::types::{FrequencyEntry, Scalar};
use crate::utils::column_values;

/// Stateless aggregate functions.
pub struct Aggregator;

impl Aggregator {
    /// Number of rows.
    pub fn total_count(view: &DataFrame) -> usize {
        view.height()
    }

    /// Number of distinct non-null values in `column`, 0 when absent.
    pub fn distinct_count(view: &DataFrame, column: &str) -> Result<usize> {
        if !has_column(view, column) {
            return Ok(0);
        }
        let distinct: HashSet<Scalar> = column_values(view, column)?
            .into_iter()
            .flatten()
            .collect();
        Ok(distinct.len())
    }

    /// Number of rows where `column` equals `value`, 0 when absent.
    pub fn matching_count(view: &DataFrame, column: &str, value: &Scalar) -> Result<usize> {
        if !has_column(view, column) {
            return Ok(0);
        }
        Ok(column_values(view, column)?
            .iter()
            .filter(|cell| cell.as_ref() == Some(value))
            .count())
    }

    /// Count per distinct non-null value of `column`.
    ///
    /// Sorted by descending count; equal counts keep the order in which the
    /// values first appear. Empty when the column is absent.
    pub fn frequency(view: &DataFrame, column: &str) -> Result<Vec<FrequencyEntry>> {
        if !has_column(view, column) {
            return Ok(Vec::new());
        }

        let mut index: HashMap<Scalar, usize> = HashMap::new();
        let mut entries: Vec<FrequencyEntry> = Vec::new();
        for value in column_values(view, column)?.into_iter().flatten() {
            match index.get(&value) {
                Some(&i) => entries[i].count += 1,
                None => {
                    index.insert(value.clone(), entries.len());
                    entries.push(FrequencyEntry { value, count: 1 });
                }
            }
        }

        // stable: ties stay in first-seen order
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(entries)
    }

    /// The first `n` entries of [`Aggregator::frequency`].
    pub fn top_n(view: &DataFrame, column: &str, n: usize) -> Result<Vec<FrequencyEntry>> {
        let mut entries = Self::frequency(view, column)?;
        entries.truncate(n);
        Ok(entries)
    }
}
