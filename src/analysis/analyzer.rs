use serde::{Deserialize, Serialize};

use crate::analysis::{fit_bass, forecast, normalize, BassFit};
use crate::config::{AppConfig, FitConfig, ForecastConfig};
use crate::error::BassError;
use crate::io::RawTable;
use crate::models::{BassParameters, ComparisonSeries, ForecastSeries, ObservationSeries};

/// Everything one pipeline run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BassReport {
    pub series: ObservationSeries,
    pub fit: BassFit,
    pub forecast: ForecastSeries,
    pub comparison: ComparisonSeries,
}

/// Unified API over normalize, fit, and forecast with explicit configuration.
#[derive(Debug, Clone, Default)]
pub struct BassAnalyzer {
    fit_config: FitConfig,
    forecast_config: ForecastConfig,
}

impl BassAnalyzer {
    pub fn new(fit_config: FitConfig, forecast_config: ForecastConfig) -> Self {
        Self {
            fit_config,
            forecast_config,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.fit.clone(), config.forecast.clone())
    }

    pub fn fit_config(&self) -> &FitConfig {
        &self.fit_config
    }

    pub fn forecast_config(&self) -> &ForecastConfig {
        &self.forecast_config
    }

    /// Extract and clean one category column.
    pub fn normalize(&self, table: &RawTable, category: &str) -> Result<ObservationSeries, BassError> {
        normalize(table, category)
    }

    /// Fit the Bass model to a series.
    pub fn fit(&self, series: &ObservationSeries) -> Result<BassFit, BassError> {
        fit_bass(series, &self.fit_config)
    }

    /// Forecast from the base year through the configured end year.
    pub fn forecast(
        &self,
        params: &BassParameters,
        base_year: i32,
    ) -> Result<ForecastSeries, BassError> {
        forecast(params, base_year, self.forecast_config.end_year)
    }

    /// Fit a series and forecast it, without a raw table.
    pub fn run_series(&self, series: ObservationSeries) -> Result<BassReport, BassError> {
        let fit = self.fit(&series)?;
        let forecast = self.forecast(&fit.params, fit.base_year)?;
        let comparison = ComparisonSeries {
            observed_years: series.years(),
            observed_sales: series.sales(),
            fitted_sales: fit.fitted_sales.clone(),
            forecast_years: forecast.years(),
            forecast_sales: forecast.predicted_sales(),
        };
        Ok(BassReport {
            series,
            fit,
            forecast,
            comparison,
        })
    }

    /// Normalize, fit, and forecast one category of a raw table.
    pub fn run(&self, table: &RawTable, category: &str) -> Result<BassReport, BassError> {
        let series = self.normalize(table, category)?;
        self.run_series(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::RawCell;

    fn sample_table() -> RawTable {
        let mut table = RawTable::new(
            "analyzer",
            vec!["Year".to_string(), "Three-Wheeler".to_string()],
        );
        for (year, sales) in [
            (2019, "10"),
            (2020, "25"),
            (2021, "60"),
            (2022, "150"),
            (2023, "300"),
            (2024, "420"),
        ] {
            table.rows.push(vec![
                RawCell::Number(f64::from(year)),
                RawCell::Text(sales.to_string()),
            ]);
        }
        table
    }

    #[test]
    fn test_run_produces_aligned_sequences() {
        let report = BassAnalyzer::default()
            .run(&sample_table(), "Three-Wheeler")
            .unwrap();
        let cmp = &report.comparison;
        assert_eq!(cmp.observed_years, vec![2019, 2020, 2021, 2022, 2023, 2024]);
        assert_eq!(cmp.observed_sales.len(), 6);
        assert_eq!(cmp.fitted_sales.len(), 6);
        assert_eq!(cmp.forecast_years, (2019..=2026).collect::<Vec<_>>());
        assert_eq!(cmp.forecast_sales.len(), 8);
    }

    #[test]
    fn test_forecast_matches_fitted_at_observed_years() {
        let report = BassAnalyzer::default()
            .run(&sample_table(), "Three-Wheeler")
            .unwrap();
        for (i, year) in report.comparison.observed_years.iter().enumerate() {
            let predicted = report.forecast.at(*year).unwrap();
            assert!((predicted - report.fit.fitted_sales[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_custom_end_year() {
        let analyzer = BassAnalyzer::new(FitConfig::default(), ForecastConfig { end_year: 2030 });
        let report = analyzer.run(&sample_table(), "Three-Wheeler").unwrap();
        assert_eq!(report.forecast.len(), 12);
    }

    #[test]
    fn test_end_year_before_data_is_range_error() {
        let analyzer = BassAnalyzer::new(FitConfig::default(), ForecastConfig { end_year: 2000 });
        assert!(matches!(
            analyzer.run(&sample_table(), "Three-Wheeler"),
            Err(BassError::RangeError { .. })
        ));
    }

    #[test]
    fn test_from_config() {
        let mut config = AppConfig::default();
        config.forecast.end_year = 2035;
        config.fit.q0 = 0.5;
        let analyzer = BassAnalyzer::from_config(&config);
        assert_eq!(analyzer.forecast_config().end_year, 2035);
        assert_eq!(analyzer.fit_config().q0, 0.5);
    }

    #[test]
    fn test_unknown_category_propagates() {
        assert!(matches!(
            BassAnalyzer::default().run(&sample_table(), "Bus"),
            Err(BassError::DataError(_))
        ));
    }
}
