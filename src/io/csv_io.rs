use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::analysis::BassReport;
use crate::error::BassError;

use super::table::{RawCell, RawTable};

/// Pick `;` when the header line uses it and has no `,`; otherwise `,`.
///
/// Semicolon-separated files are how comma-decimal locales export tables.
pub fn sniff_delimiter(data: &[u8]) -> u8 {
    let header = data.split(|&b| b == b'\n').next().unwrap_or_default();
    let has_semicolon = header.contains(&b';');
    let has_comma = header.contains(&b',');
    if has_semicolon && !has_comma {
        b';'
    } else {
        b','
    }
}

fn parse_csv_table<R: Read>(rdr: &mut csv::Reader<R>, name: &str) -> Result<RawTable, BassError> {
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(BassError::DataError(format!("Table '{name}' has no header row")));
    }

    let mut table = RawTable::new(name, headers);
    for result in rdr.records() {
        let record = result?;
        let cells: Vec<RawCell> = record.iter().map(RawCell::from_text).collect();
        if cells.iter().all(RawCell::is_empty) {
            continue;
        }
        table.rows.push(cells);
    }

    tracing::debug!(table = name, rows = table.num_rows(), "parsed CSV table");
    Ok(table)
}

fn reader_builder(delimiter: u8) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter);
    builder
}

/// Read a raw year/category table from a CSV file.
///
/// With no explicit delimiter it is sniffed from the header line.
pub fn read_csv(path: impl AsRef<Path>, delimiter: Option<u8>) -> Result<RawTable, BassError> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    read_csv_from_bytes(&data, &name, delimiter)
}

/// Read a raw year/category table from CSV bytes.
pub fn read_csv_from_bytes(
    data: &[u8],
    name: &str,
    delimiter: Option<u8>,
) -> Result<RawTable, BassError> {
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(data));
    let mut rdr = reader_builder(delimiter).from_reader(data);
    parse_csv_table(&mut rdr, name)
}

#[derive(Debug, Serialize)]
struct ForecastRow {
    year: i32,
    observed_sales: Option<f64>,
    fitted_sales: Option<f64>,
    predicted_sales: f64,
}

/// Write the forecast of a report as CSV, with observed and fitted values
/// alongside for years that were observed.
pub fn write_csv(report: &BassReport, path: impl AsRef<Path>) -> Result<(), BassError> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    let cmp = &report.comparison;

    for point in &report.forecast.points {
        let observed_idx = cmp.observed_years.iter().position(|&y| y == point.year);
        let row = ForecastRow {
            year: point.year,
            observed_sales: observed_idx.and_then(|i| cmp.observed_sales.get(i).copied()),
            fitted_sales: observed_idx.and_then(|i| cmp.fitted_sales.get(i).copied()),
            predicted_sales: point.predicted_sales,
        };
        wtr.serialize(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
