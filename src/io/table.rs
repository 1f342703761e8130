use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single cell as read from a spreadsheet or CSV file, before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl RawCell {
    /// Build a cell from free text; blank text becomes `Empty`.
    pub fn from_text(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawCell::Empty)
    }
}

impl std::fmt::Display for RawCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawCell::Empty => write!(f, "<empty>"),
            RawCell::Number(n) => write!(f, "{n}"),
            RawCell::Text(s) => write!(f, "{s}"),
            RawCell::Date(d) => write!(f, "{d}"),
        }
    }
}

/// A rectangular block of raw cells: one header row, then one row per year.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Name or identifier for this table (usually the file stem)
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Index of the column whose header matches `name`, ignoring case and
    /// surrounding whitespace.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.trim().to_lowercase() == wanted)
    }

    /// Index of the year column: the `Year` header, else the first column.
    pub fn year_column(&self) -> usize {
        self.column_index("year").unwrap_or(0)
    }

    /// Every header except the year column.
    pub fn categories(&self) -> Vec<String> {
        let year_col = self.year_column();
        self.headers
            .iter()
            .enumerate()
            .filter(|(i, h)| *i != year_col && !h.trim().is_empty())
            .map(|(_, h)| h.trim().to_string())
            .collect()
    }

    /// Cell at `(row, col)`; missing cells in ragged rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &RawCell {
        static EMPTY: RawCell = RawCell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

/// Where the year/category block sits inside a workbook.
///
/// Rows and columns are zero-based. The defaults describe a `Data` sheet with
/// headers on row 4 and columns B:F holding six years of data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetLayout {
    pub sheet: String,
    pub header_row: u32,
    pub first_column: u32,
    /// Number of columns; `None` reads until the first blank header
    pub columns: Option<u32>,
    /// Number of data rows; `None` reads until the first blank year cell
    pub rows: Option<u32>,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet: "Data".to_string(),
            header_row: 3,
            first_column: 1,
            columns: Some(5),
            rows: Some(6),
        }
    }
}
