//! Lenient parsing of the notification-date column.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::debug;

use crate::utils::date_to_epoch_days;

/// Parse a single cell against `formats`, first match wins.
///
/// Formats with a time component are accepted too; the time is dropped.
pub fn parse_date(raw: &str, formats: &[String]) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    formats.iter().find_map(|format| {
        NaiveDate::parse_from_str(value, format)
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(value, format)
                    .ok()
                    .map(|dt| dt.date())
            })
    })
}

/// Replace column `name` with a polars `Date` column.
///
/// Cells matching no format become null. Returns how many non-empty cells
/// were coerced that way.
pub fn parse_date_column(df: &mut DataFrame, name: &str, formats: &[String]) -> PolarsResult<usize> {
    let text = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;

    let mut unparseable = 0usize;
    let days: Vec<Option<i32>> = text
        .str()?
        .into_iter()
        .map(|cell| {
            let raw = cell?;
            if raw.trim().is_empty() {
                return None;
            }
            let parsed = parse_date(raw, formats).map(date_to_epoch_days);
            if parsed.is_none() {
                unparseable += 1;
            }
            parsed
        })
        .collect();

    let dates = Series::new(name.into(), days).cast(&DataType::Date)?;
    df.with_column(dates)?;

    debug!("Parsed date column '{}', {} unparseable values", name, unparseable);
    Ok(unparseable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_date_formats;
    use crate::types::Scalar;
    use crate::utils::column_values;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        let formats = default_date_formats();
        assert_eq!(parse_date("2026-01-15", &formats), Some(ymd(2026, 1, 15)));
        assert_eq!(parse_date(" 2026-01-15 08:30:00 ", &formats), Some(ymd(2026, 1, 15)));
        assert_eq!(parse_date("01/02/2026", &formats), Some(ymd(2026, 1, 2)));
        assert_eq!(parse_date("25/12/2026", &formats), Some(ymd(2026, 12, 25)));
        assert_eq!(parse_date("5 Mar 2026", &formats), Some(ymd(2026, 3, 5)));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        let formats = default_date_formats();
        assert_eq!(parse_date("", &formats), None);
        assert_eq!(parse_date("soon", &formats), None);
        assert_eq!(parse_date("2026-13-45", &formats), None);
    }

    #[test]
    fn test_parse_date_column_coerces_failures_to_null() {
        let mut df = df!(
            "วันที่แจ้ง" => &[Some("2026-01-15"), Some("not a date"), None, Some("")]
        )
        .unwrap();

        let unparseable = parse_date_column(&mut df, "วันที่แจ้ง", &default_date_formats()).unwrap();

        assert_eq!(unparseable, 1);
        assert_eq!(df.column("วันที่แจ้ง").unwrap().dtype(), &DataType::Date);
        assert_eq!(
            column_values(&df, "วันที่แจ้ง").unwrap(),
            vec![Some(Scalar::Date(ymd(2026, 1, 15))), None, None, None]
        );
    }
}
