mod table;
mod csv_io;
mod json_io;
mod excel_io;

use std::path::Path;

use crate::analysis::BassReport;
use crate::error::BassError;

pub use table::{RawCell, RawTable, SheetLayout};
pub use csv_io::{read_csv, read_csv_from_bytes, sniff_delimiter, write_csv};
pub use json_io::{read_json, report_from_json, report_to_json, write_json};
pub use excel_io::{read_excel, read_excel_from_bytes, write_excel};

/// Trait for reading a raw year/category table from a file.
pub trait TableReader {
    fn read(&self, path: &Path) -> Result<RawTable, BassError>;
}

/// Trait for writing a fit report to a file.
pub trait ReportWriter {
    fn write(&self, report: &BassReport, path: &Path) -> Result<(), BassError>;
}

/// CSV format reader/writer.
#[derive(Debug, Default)]
pub struct CsvFormat {
    /// Field delimiter; sniffed from the header when `None`
    pub delimiter: Option<u8>,
}

impl TableReader for CsvFormat {
    fn read(&self, path: &Path) -> Result<RawTable, BassError> {
        read_csv(path, self.delimiter)
    }
}

impl ReportWriter for CsvFormat {
    fn write(&self, report: &BassReport, path: &Path) -> Result<(), BassError> {
        write_csv(report, path)
    }
}

/// JSON report writer.
#[derive(Debug, Default)]
pub struct JsonFormat {
    pub pretty: bool,
}

impl ReportWriter for JsonFormat {
    fn write(&self, report: &BassReport, path: &Path) -> Result<(), BassError> {
        write_json(report, path, self.pretty)
    }
}

/// Excel format reader/writer.
#[derive(Debug, Default)]
pub struct ExcelFormat {
    pub layout: SheetLayout,
}

impl TableReader for ExcelFormat {
    fn read(&self, path: &Path) -> Result<RawTable, BassError> {
        read_excel(path, &self.layout)
    }
}

impl ReportWriter for ExcelFormat {
    fn write(&self, report: &BassReport, path: &Path) -> Result<(), BassError> {
        write_excel(report, path)
    }
}

/// Pick a table reader from the file extension.
pub fn reader_for_path(
    path: &Path,
    layout: &SheetLayout,
    delimiter: Option<u8>,
) -> Result<Box<dyn TableReader>, BassError> {
    match extension(path).as_str() {
        "csv" | "txt" => Ok(Box::new(CsvFormat { delimiter })),
        "xlsx" | "xls" | "xlsm" | "ods" => Ok(Box::new(ExcelFormat {
            layout: layout.clone(),
        })),
        ext => Err(BassError::DataError(format!(
            "Unsupported input format: .{ext}. Use .csv or .xlsx"
        ))),
    }
}

/// Pick a report writer from the file extension.
pub fn writer_for_path(path: &Path, pretty: bool) -> Result<Box<dyn ReportWriter>, BassError> {
    match extension(path).as_str() {
        "csv" => Ok(Box::new(CsvFormat::default())),
        "json" => Ok(Box::new(JsonFormat { pretty })),
        "xlsx" => Ok(Box::new(ExcelFormat::default())),
        ext => Err(BassError::DataError(format!(
            "Unsupported output format: .{ext}. Use .csv, .json, or .xlsx"
        ))),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}
