//! Shared helpers for reading typed values out of polars columns.

use chrono::NaiveDate;
use polars::prelude::*;

use crate::error::{DashboardError, Result};
use crate::types::Scalar;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type, as far as cell values are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    Integer,
    Float,
    Date,
    Boolean,
    Text,
}

/// Check if a DataType is a signed or unsigned integer.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is a calendar date or datetime.
#[inline]
pub fn is_date_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Get the category of a DataType. Anything unrecognised is read as text.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_integer_dtype(dtype) {
        DtypeCategory::Integer
    } else if is_float_dtype(dtype) {
        DtypeCategory::Float
    } else if is_date_dtype(dtype) {
        DtypeCategory::Date
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else {
        DtypeCategory::Text
    }
}

// =============================================================================
// Date Utilities
// =============================================================================

/// `NaiveDate::num_days_from_ce()` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Convert a polars physical date (days since the Unix epoch) to a date.
pub fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

/// Convert a date to polars' physical date representation.
pub fn date_to_epoch_days(date: NaiveDate) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

// =============================================================================
// Value Extraction
// =============================================================================

/// NaN counts as missing, and `-0.0` is folded into `0.0`.
fn float_scalar(value: f64) -> Option<Scalar> {
    if value.is_nan() {
        None
    } else {
        Some(Scalar::Float(value + 0.0))
    }
}

/// Read every cell of a series as an optional [`Scalar`], nulls as `None`.
pub fn series_values(series: &Series) -> PolarsResult<Vec<Option<Scalar>>> {
    let values = match get_dtype_category(series.dtype()) {
        DtypeCategory::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| v.map(Scalar::Boolean))
            .collect(),
        DtypeCategory::Integer => {
            let cast = series.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(Scalar::Integer))
                .collect()
        }
        DtypeCategory::Float => {
            let cast = series.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.and_then(float_scalar))
                .collect()
        }
        DtypeCategory::Date => {
            let days = series.cast(&DataType::Date)?.cast(&DataType::Int32)?;
            days.i32()?
                .into_iter()
                .map(|v| v.and_then(epoch_days_to_date).map(Scalar::Date))
                .collect()
        }
        DtypeCategory::Text => {
            let cast = series.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| Scalar::Text(s.to_string())))
                .collect()
        }
    };
    Ok(values)
}

/// Read every cell of a named column.
///
/// Fails with [`DashboardError::ColumnNotFound`] when the column is absent;
/// callers that tolerate absence check [`crate::schema::has_column`] first.
pub fn column_values(df: &DataFrame, name: &str) -> Result<Vec<Option<Scalar>>> {
    if !crate::schema::has_column(df, name) {
        return Err(DashboardError::ColumnNotFound(name.to_string()));
    }
    let column = df.column(name)?;
    Ok(series_values(column.as_materialized_series())?)
}

/// Read the first `limit` rows as a grid of optional scalars, in column order.
pub fn grid_rows(df: &DataFrame, limit: usize) -> Result<Vec<Vec<Option<Scalar>>>> {
    let head = df.head(Some(limit));
    let columns = head
        .get_columns()
        .iter()
        .map(|c| series_values(c.as_materialized_series()))
        .collect::<PolarsResult<Vec<_>>>()?;

    let rows = (0..head.height())
        .map(|row| columns.iter().map(|col| col[row].clone()).collect())
        .collect();
    Ok(rows)
}

// =============================================================================
// Tests
// =============================================================================
