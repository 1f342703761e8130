use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Range, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};

use crate::analysis::BassReport;
use crate::error::BassError;

use super::table::{RawCell, RawTable, SheetLayout};

/// Read the year/category block described by `layout` from a workbook
/// (.xlsx or .xls).
pub fn read_excel(path: impl AsRef<Path>, layout: &SheetLayout) -> Result<RawTable, BassError> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)?;
    let sheets = workbook.sheet_names().to_vec();
    if !sheets.iter().any(|s| s == &layout.sheet) {
        return Err(missing_sheet(&layout.sheet, &sheets));
    }
    let range = workbook.worksheet_range(&layout.sheet)?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    range_to_table(&range, layout, &name)
}

/// Read the year/category block from in-memory .xlsx bytes.
pub fn read_excel_from_bytes(
    data: &[u8],
    name: &str,
    layout: &SheetLayout,
) -> Result<RawTable, BassError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))?;
    let sheets = workbook.sheet_names().to_vec();
    if !sheets.iter().any(|s| s == &layout.sheet) {
        return Err(missing_sheet(&layout.sheet, &sheets));
    }
    let range = workbook.worksheet_range(&layout.sheet)?;
    range_to_table(&range, layout, name)
}

fn missing_sheet(wanted: &str, sheets: &[String]) -> BassError {
    BassError::Excel(format!(
        "Sheet '{wanted}' not found; available sheets: {}",
        sheets.join(", ")
    ))
}

fn range_to_table(
    range: &Range<Data>,
    layout: &SheetLayout,
    name: &str,
) -> Result<RawTable, BassError> {
    let (last_row, last_col) = range
        .end()
        .ok_or_else(|| BassError::Excel(format!("Sheet '{}' is empty", layout.sheet)))?;

    let header_row = layout.header_row;
    let first_col = layout.first_column;

    let cell = |row: u32, col: u32| -> RawCell {
        range
            .get_value((row, col))
            .map(to_raw_cell)
            .unwrap_or(RawCell::Empty)
    };

    let mut headers = Vec::new();
    match layout.columns {
        Some(n) => {
            let col_end = block_end(first_col, n, last_col, layout, "first_column + columns")?;
            for col in first_col..col_end {
                headers.push(header_text(&cell(header_row, col)));
            }
        }
        None => {
            for col in first_col..=last_col {
                let header = header_text(&cell(header_row, col));
                if header.is_empty() {
                    break;
                }
                headers.push(header);
            }
        }
    }

    if headers.is_empty() {
        return Err(BassError::Excel(format!(
            "No headers found on row {} of sheet '{}'",
            u64::from(header_row) + 1,
            layout.sheet
        )));
    }

    let width = headers.len() as u32;
    let first_data_row = offset(header_row, 1, layout, "header_row")?;
    let col_end = offset(first_col, width, layout, "first_column")?;
    let mut table = RawTable::new(name, headers);

    match layout.rows {
        Some(n) => {
            let row_end = block_end(first_data_row, n, last_row, layout, "header_row + rows")?;
            for row in first_data_row..row_end {
                table.rows.push((first_col..col_end).map(|col| cell(row, col)).collect());
            }
        }
        None => {
            for row in first_data_row..=last_row {
                if cell(row, first_col).is_empty() {
                    break;
                }
                table.rows.push((first_col..col_end).map(|col| cell(row, col)).collect());
            }
        }
    }

    tracing::debug!(
        sheet = %layout.sheet,
        columns = table.headers.len(),
        rows = table.num_rows(),
        "read worksheet block"
    );

    Ok(table)
}

fn offset(start: u32, count: u32, layout: &SheetLayout, what: &str) -> Result<u32, BassError> {
    start.checked_add(count).ok_or_else(|| {
        BassError::Excel(format!(
            "Layout {what} of sheet '{}' is out of range: {start} + {count}",
            layout.sheet
        ))
    })
}

/// Exclusive end of a block of `count` cells from `start`. Cells past the
/// used range are all empty, so at most one of them is read; a block that
/// runs short still shows a blank row or column to the normalizer.
fn block_end(
    start: u32,
    count: u32,
    used_end: u32,
    layout: &SheetLayout,
    what: &str,
) -> Result<u32, BassError> {
    let end = offset(start, count, layout, what)?;
    Ok(end.min(used_end.saturating_add(2)))
}

fn header_text(cell: &RawCell) -> String {
    match cell {
        RawCell::Empty => String::new(),
        other => other.to_string(),
    }
}

fn to_raw_cell(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::Empty,
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Float(f) => RawCell::Number(*f),
        Data::String(s) => RawCell::from_text(s),
        Data::DateTime(_) | Data::DateTimeIso(_) => match data.as_date() {
            Some(date) => RawCell::Date(date),
            None => RawCell::Text(data.to_string()),
        },
        other => RawCell::Text(other.to_string()),
    }
}

/// Write a fit report to an Excel (.xlsx) workbook with `Parameters`, `Fit`,
/// and `Forecast` sheets.
pub fn write_excel(report: &BassReport, path: impl AsRef<Path>) -> Result<(), BassError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Parameters")?;
        sheet.write_string_with_format(0, 0, "Parameter", &bold)?;
        sheet.write_string_with_format(0, 1, "Value", &bold)?;

        let params = &report.fit.params;
        let rows: [(&str, f64); 7] = [
            ("p (innovation)", params.p),
            ("q (imitation)", params.q),
            ("M (market potential)", params.m),
            ("Base year", f64::from(report.fit.base_year)),
            ("SSE", report.fit.statistics.sse),
            ("RMSE", report.fit.statistics.rmse),
            ("Evaluations", report.fit.evaluations as f64),
        ];
        for (i, (label, value)) in rows.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, *label)?;
            sheet.write_number(row, 1, *value)?;
        }
        if let Some(r2) = report.fit.statistics.r_squared {
            sheet.write_string(8, 0, "R-squared")?;
            sheet.write_number(8, 1, r2)?;
        }
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Fit")?;
        for (col, header) in ["year", "observed_sales", "fitted_sales", "residual"]
            .iter()
            .enumerate()
        {
            sheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }
        let cmp = &report.comparison;
        let rows = cmp
            .observed_years
            .iter()
            .zip(&cmp.observed_sales)
            .zip(&cmp.fitted_sales);
        for (i, ((year, observed), fitted)) in rows.enumerate() {
            let row = i as u32 + 1;
            sheet.write_number(row, 0, f64::from(*year))?;
            sheet.write_number(row, 1, *observed)?;
            sheet.write_number(row, 2, *fitted)?;
            sheet.write_number(row, 3, observed - fitted)?;
        }
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Forecast")?;
        sheet.write_string_with_format(0, 0, "year", &bold)?;
        sheet.write_string_with_format(0, 1, "predicted_sales", &bold)?;
        for (i, point) in report.forecast.points.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_number(row, 0, f64::from(point.year))?;
            sheet.write_number(row, 1, point.predicted_sales)?;
        }
    }

    workbook.save(path.as_ref())?;
    Ok(())
}
