use thiserror::Error;

/// Errors that can occur while loading, fitting, or forecasting a sales series.
#[derive(Error, Debug)]
pub enum BassError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("Config error: {0}")]
    Config(String),

    /// Raw input could not be coerced into an observation series.
    #[error("Data error: {0}")]
    DataError(String),

    /// The optimizer could not produce a fit within its bounds or budget.
    #[error("Fit error: {reason} (evaluations: {evaluations}{})", format_residual(.residual))]
    FitError {
        reason: String,
        evaluations: usize,
        residual: Option<f64>,
    },

    /// A forecast range that runs backwards or is too long.
    #[error("Range error: {}", describe_range(.base_year, .end_year))]
    RangeError { base_year: i32, end_year: i32 },
}

fn describe_range(base_year: &i32, end_year: &i32) -> String {
    if end_year < base_year {
        format!("end year {end_year} is before base year {base_year}")
    } else {
        format!(
            "end year {end_year} is more than {} years after base year {base_year}",
            crate::models::MAX_FORECAST_SPAN
        )
    }
}

fn format_residual(residual: &Option<f64>) -> String {
    match residual {
        Some(r) => format!(", residual sum of squares: {r:.4}"),
        None => String::new(),
    }
}

impl From<calamine::Error> for BassError {
    fn from(e: calamine::Error) -> Self {
        BassError::Excel(e.to_string())
    }
}

impl From<calamine::XlsxError> for BassError {
    fn from(e: calamine::XlsxError) -> Self {
        BassError::Excel(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for BassError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        BassError::Excel(e.to_string())
    }
}

impl From<toml::de::Error> for BassError {
    fn from(e: toml::de::Error) -> Self {
        BassError::Config(e.to_string())
    }
}
