/// data.rs — Price series loading
///
/// Reads a daily CSV (e.g. a stooq export with `Data` / `Otwarcie` columns)
/// into a validated `PriceSeries`. Only the date and opening price are kept.
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use polars::prelude::*;
use std::path::Path;
use tracing::{info, warn};

use crate::models::{PricePoint, PriceSeries};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%d-%m-%Y"];

/// Load `path` and build a series from `date_column` and `open_column`.
pub fn load_price_csv(path: &Path, date_column: &str, open_column: &str) -> Result<PriceSeries> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("opening {}", path.display()))?
        .finish()
        .with_context(|| format!("reading {}", path.display()))?;

    info!("Loaded {} rows from {}", df.height(), path.display());
    series_from_frame(&df, date_column, open_column)
}

/// Build a series from two columns of an in-memory frame.
pub fn series_from_frame(df: &DataFrame, date_column: &str, open_column: &str) -> Result<PriceSeries> {
    let dates = df
        .column(date_column)
        .with_context(|| format!("missing date column '{date_column}'"))?
        .cast(&DataType::String)?;
    let opens = df
        .column(open_column)
        .with_context(|| format!("missing open column '{open_column}'"))?
        .cast(&DataType::Float64)?;

    let dates = dates.as_materialized_series().str()?;
    let opens = opens.as_materialized_series().f64()?;

    let mut points = Vec::with_capacity(df.height());
    for (row, (date, open)) in dates.into_iter().zip(opens.into_iter()).enumerate() {
        let (Some(date), Some(open)) = (date, open) else {
            warn!("Row {row}: missing date or open price, skipped");
            continue;
        };
        let date = parse_date(date).with_context(|| format!("row {row}: unparseable date '{date}'"))?;
        points.push(PricePoint::new(date, open));
    }

    series_from_rows(points)
}

/// Sort rows ascending by date and validate them into a series.
pub fn series_from_rows(mut points: Vec<PricePoint>) -> Result<PriceSeries> {
    points.sort_by_key(|p| p.date);
    PriceSeries::new(points).context("invalid price series")
}

/// Parse an ISO-8601 / common locale date, or an RFC 3339 timestamp's date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_formats() {
        let d = NaiveDate::from_ymd_opt(2022, 3, 21).unwrap();
        assert_eq!(parse_date("2022-03-21"), Some(d));
        assert_eq!(parse_date("2022/03/21"), Some(d));
        assert_eq!(parse_date("21.03.2022"), Some(d));
        assert_eq!(parse_date(" 21-03-2022 "), Some(d));
        assert_eq!(parse_date("2022-03-21T09:00:00+01:00"), Some(d));
        assert_eq!(parse_date("March 21st"), None);
    }

    #[test]
    fn rows_are_sorted_before_validation() {
        let d = |day| NaiveDate::from_ymd_opt(2022, 3, day).unwrap();
        let rows = vec![
            PricePoint::new(d(3), 3.0),
            PricePoint::new(d(1), 1.0),
            PricePoint::new(d(2), 2.0),
        ];
        let s = series_from_rows(rows).unwrap();
        assert_eq!(s.opens(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn duplicate_dates_fail() {
        let d = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        let rows = vec![PricePoint::new(d, 1.0), PricePoint::new(d, 2.0)];
        assert!(series_from_rows(rows).is_err());
    }

    #[test]
    fn frame_with_integer_opens_and_gaps() {
        let df = df!(
            "Data" => [Some("2022-03-02"), Some("2022-03-01"), None],
            "Otwarcie" => [Some(2i64), Some(1i64), Some(5i64)],
        )
        .unwrap();
        let s = series_from_frame(&df, "Data", "Otwarcie").unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.opens(), vec![1.0, 2.0]);
    }

    #[test]
    fn missing_column_is_reported() {
        let df = df!("Date" => ["2022-03-01"], "Open" => [1.0]).unwrap();
        let err = series_from_frame(&df, "Data", "Open").unwrap_err();
        assert!(format!("{err:#}").contains("Data"));
    }
}
