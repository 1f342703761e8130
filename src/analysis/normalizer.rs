use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::error::BassError;
use crate::io::{RawCell, RawTable};
use crate::models::{Observation, ObservationSeries};

/// Turn one category column of a raw table into a validated series.
///
/// Years may arrive as numbers, dates, or text; sales may use a comma as the
/// decimal separator. Any cell that cannot be coerced is a `DataError`.
pub fn normalize(table: &RawTable, category: &str) -> Result<ObservationSeries, BassError> {
    let year_col = table.year_column();
    let sales_col = table
        .column_index(category)
        .filter(|&c| c != year_col)
        .ok_or_else(|| {
            BassError::DataError(format!(
                "Category '{category}' not found in '{}'; available: {}",
                table.name,
                table.categories().join(", ")
            ))
        })?;

    let mut observations = Vec::with_capacity(table.num_rows());
    for row in 0..table.num_rows() {
        let year = coerce_year(table.cell(row, year_col)).map_err(|msg| {
            BassError::DataError(format!("Row {}: year {msg}", row + 1))
        })?;
        let sales = coerce_sales(table.cell(row, sales_col)).map_err(|msg| {
            BassError::DataError(format!("Row {} ({year}): {category} {msg}", row + 1))
        })?;
        observations.push(Observation { year, sales });
    }

    let series = ObservationSeries::new(table.headers[sales_col].trim(), observations)?;
    tracing::debug!(
        category = series.category(),
        points = series.len(),
        base_year = series.base_year(),
        "normalized series"
    );
    Ok(series)
}

/// Coerce a year cell to a plain integer year.
pub fn coerce_year(cell: &RawCell) -> Result<i32, String> {
    match cell {
        RawCell::Number(n) => integral_year(*n).ok_or_else(|| format!("'{n}' is not a whole year")),
        RawCell::Date(d) => Ok(d.year()),
        RawCell::Text(s) => parse_year_text(s).ok_or_else(|| format!("'{s}' is not a year")),
        RawCell::Empty => Err("is missing".to_string()),
    }
}

/// Coerce a sales cell to a float, accepting `,` as the decimal separator.
pub fn coerce_sales(cell: &RawCell) -> Result<f64, String> {
    match cell {
        RawCell::Number(n) => Ok(*n),
        RawCell::Text(s) => {
            let cleaned = s.trim().replace(',', ".");
            cleaned
                .parse::<f64>()
                .map_err(|_| format!("'{s}' is not a number"))
        }
        RawCell::Date(d) => Err(format!("'{d}' is a date, not a sales figure")),
        RawCell::Empty => Err("is missing".to_string()),
    }
}

fn integral_year(n: f64) -> Option<i32> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= f64::from(i32::MAX) {
        Some(n as i32)
    } else {
        None
    }
}

fn parse_year_text(s: &str) -> Option<i32> {
    let s = s.trim();
    if let Ok(year) = s.parse::<i32>() {
        return Some(year);
    }
    if let Some(year) = s.parse::<f64>().ok().and_then(integral_year) {
        return Some(year);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.year());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    fn sample_table() -> RawTable {
        let mut table = RawTable::new(
            "ev",
            vec![
                "Year".to_string(),
                "Two-Wheeler".to_string(),
                "Three-Wheeler".to_string(),
            ],
        );
        let rows = [
            (RawCell::Number(2019.0), text("1000"), text("10,5")),
            (text("2020"), RawCell::Number(1100.0), text("25")),
            (
                RawCell::Date(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()),
                text("1200,25"),
                RawCell::Number(60.0),
            ),
            (text("2022-01-01 00:00:00"), text("1300"), text(" 150,75 ")),
        ];
        for (year, two, three) in rows {
            table.rows.push(vec![year, two, three]);
        }
        table
    }

    #[test]
    fn test_normalize_mixed_cells() {
        let series = normalize(&sample_table(), "Three-Wheeler").unwrap();
        assert_eq!(series.category(), "Three-Wheeler");
        assert_eq!(series.years(), vec![2019, 2020, 2021, 2022]);
        assert_eq!(series.sales(), vec![10.5, 25.0, 60.0, 150.75]);
    }

    #[test]
    fn test_normalize_case_insensitive_category() {
        let series = normalize(&sample_table(), "two-wheeler").unwrap();
        assert_eq!(series.category(), "Two-Wheeler");
        assert_eq!(series.sales(), vec![1000.0, 1100.0, 1200.25, 1300.0]);
    }

    #[test]
    fn test_unknown_category() {
        let err = normalize(&sample_table(), "Bus").unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, BassError::DataError(_)));
        assert!(msg.contains("Bus"));
        assert!(msg.contains("Three-Wheeler"));
    }

    #[test]
    fn test_year_column_is_not_a_category() {
        assert!(normalize(&sample_table(), "Year").is_err());
    }

    #[test]
    fn test_unparsable_sales() {
        let mut table = sample_table();
        table.rows[1][2] = text("n/a");
        let err = normalize(&table, "Three-Wheeler").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Row 2"));
        assert!(msg.contains("n/a"));
    }

    #[test]
    fn test_thousands_separator_rejected() {
        // Only the decimal comma is rewritten; "1,234.5" becomes "1.234.5".
        let mut table = sample_table();
        table.rows[0][2] = text("1,234.5");
        assert!(normalize(&table, "Three-Wheeler").is_err());
    }

    #[test]
    fn test_missing_sales() {
        let mut table = sample_table();
        table.rows[3][2] = RawCell::Empty;
        let err = normalize(&table, "Three-Wheeler").unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_non_monotonic_years() {
        let mut table = sample_table();
        table.rows[3][0] = RawCell::Number(2020.0);
        let err = normalize(&table, "Three-Wheeler").unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn test_negative_sales() {
        let mut table = sample_table();
        table.rows[0][2] = text("-3");
        assert!(matches!(
            normalize(&table, "Three-Wheeler"),
            Err(BassError::DataError(_))
        ));
    }

    #[test]
    fn test_coerce_year_variants() {
        assert_eq!(coerce_year(&RawCell::Number(2019.0)), Ok(2019));
        assert_eq!(coerce_year(&text("2019.0")), Ok(2019));
        assert_eq!(coerce_year(&text("2019-06-30")), Ok(2019));
        assert_eq!(coerce_year(&text("2019-06-30T12:00:00")), Ok(2019));
        assert!(coerce_year(&RawCell::Number(2019.5)).is_err());
        assert!(coerce_year(&text("FY19")).is_err());
        assert!(coerce_year(&RawCell::Empty).is_err());
    }

    #[test]
    fn test_coerce_sales_variants() {
        assert_eq!(coerce_sales(&text("3,5")), Ok(3.5));
        assert_eq!(coerce_sales(&text("42")), Ok(42.0));
        assert_eq!(coerce_sales(&RawCell::Number(7.25)), Ok(7.25));
        let date = RawCell::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert!(coerce_sales(&date).is_err());
    }

    #[test]
    fn test_empty_table() {
        let table = RawTable::new("empty", vec!["Year".to_string(), "EV".to_string()]);
        assert!(matches!(normalize(&table, "EV"), Err(BassError::DataError(_))));
    }
}
