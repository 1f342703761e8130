use serde::{Deserialize, Serialize};

use crate::config::FitConfig;
use crate::error::BassError;
use crate::models::{BassParameters, ObservationSeries};

use super::optimizer::{levenberg_marquardt, LeastSquaresConfig, Termination};
use super::statistics::FitStatistics;

/// Result of fitting the Bass model to an observation series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BassFit {
    pub params: BassParameters,
    /// Year used as t = 0
    pub base_year: i32,
    /// Fitted sales at each observed year
    pub fitted_sales: Vec<f64>,
    pub statistics: FitStatistics,
    pub evaluations: usize,
    pub iterations: usize,
    pub termination: Termination,
}

/// Seeds and bounds derived from a config and the series peak.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSetup {
    pub initial: BassParameters,
    pub lower: BassParameters,
    pub upper: BassParameters,
}

impl FitSetup {
    /// Scale the market-potential seed and bounds by `max_sales`.
    pub fn new(config: &FitConfig, max_sales: f64) -> Result<Self, BassError> {
        if !(max_sales.is_finite() && max_sales > 0.0) {
            return Err(BassError::FitError {
                reason: format!(
                    "max sales is {max_sales}; market potential bounds would be empty"
                ),
                evaluations: 0,
                residual: None,
            });
        }
        Ok(Self {
            initial: BassParameters::new(config.p0, config.q0, config.m0_multiplier * max_sales),
            lower: BassParameters::new(
                config.p_bounds.0,
                config.q_bounds.0,
                config.m_lower_multiplier * max_sales,
            ),
            upper: BassParameters::new(
                config.p_bounds.1,
                config.q_bounds.1,
                config.m_upper_multiplier * max_sales,
            ),
        })
    }
}

/// Fit p, q, and M by bounded nonlinear least squares.
///
/// Time is measured in years since the first observed year. A fit that does
/// not converge within `config.max_evaluations` is an error, never a default.
pub fn fit_bass(series: &ObservationSeries, config: &FitConfig) -> Result<BassFit, BassError> {
    let setup = FitSetup::new(config, series.max_sales())?;
    if setup.lower.p <= 0.0 || setup.lower.q <= 0.0 {
        return Err(BassError::FitError {
            reason: "lower bounds for p and q must be positive".to_string(),
            evaluations: 0,
            residual: None,
        });
    }

    let elapsed = series.elapsed();
    let sales = series.sales();

    let residual_f = |x: &[f64]| -> Vec<f64> {
        let params = BassParameters::from_slice(x);
        elapsed
            .iter()
            .zip(&sales)
            .map(|(&t, &observed)| params.predicted_sales(t) - observed)
            .collect()
    };

    let lsq_config = LeastSquaresConfig {
        max_evaluations: config.max_evaluations,
        ftol: config.ftol,
        xtol: config.xtol,
        gtol: config.gtol,
    };

    let outcome = levenberg_marquardt(
        residual_f,
        &setup.initial.to_vec(),
        &setup.lower.to_vec(),
        &setup.upper.to_vec(),
        &lsq_config,
    )?;

    let params = BassParameters::from_slice(&outcome.params);
    let fitted_sales: Vec<f64> = elapsed.iter().map(|&t| params.predicted_sales(t)).collect();
    let statistics = FitStatistics::compute(&sales, &outcome, config.confidence);

    tracing::info!(
        category = series.category(),
        p = params.p,
        q = params.q,
        m = params.m,
        sse = outcome.cost,
        evaluations = outcome.evaluations,
        "fitted Bass model"
    );

    Ok(BassFit {
        params,
        base_year: series.base_year(),
        fitted_sales,
        statistics,
        evaluations: outcome.evaluations,
        iterations: outcome.iterations,
        termination: outcome.termination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn sample_series() -> ObservationSeries {
        ObservationSeries::from_pairs(
            "Three-Wheeler",
            &[2019, 2020, 2021, 2022, 2023, 2024],
            &[10.0, 25.0, 60.0, 150.0, 300.0, 420.0],
        )
        .unwrap()
    }

    fn synthetic_series(params: BassParameters, years: usize) -> ObservationSeries {
        let year_list: Vec<i32> = (0..years as i32).map(|i| 2000 + i).collect();
        let sales: Vec<f64> = (0..years).map(|t| params.predicted_sales(t as f64)).collect();
        ObservationSeries::from_pairs("synthetic", &year_list, &sales).unwrap()
    }

    #[test]
    fn test_fit_setup_scales_with_max_sales() {
        let setup = FitSetup::new(&FitConfig::default(), 420.0).unwrap();
        assert_eq!(setup.initial, BassParameters::new(0.05, 0.3, 1260.0));
        assert_eq!(setup.lower, BassParameters::new(0.001, 0.001, 420.0));
        assert_eq!(setup.upper, BassParameters::new(1.0, 1.0, 4200.0));
    }

    #[test]
    fn test_fit_setup_rejects_zero_peak() {
        let err = FitSetup::new(&FitConfig::default(), 0.0).unwrap_err();
        assert!(matches!(err, BassError::FitError { evaluations: 0, .. }));
    }

    #[test]
    fn test_fit_sample_series_within_bounds() {
        let fit = fit_bass(&sample_series(), &FitConfig::default()).unwrap();
        assert_eq!(fit.base_year, 2019);
        assert!(fit.params.p > 0.0 && fit.params.p < 1.0);
        assert!(fit.params.q > 0.0 && fit.params.q <= 1.0);
        assert!(fit.params.m >= 420.0 && fit.params.m <= 4200.0);
        assert_eq!(fit.fitted_sales.len(), 6);
        assert!(fit.evaluations <= FitConfig::default().max_evaluations);
    }

    #[test]
    fn test_fit_tracks_sample_closely() {
        let fit = fit_bass(&sample_series(), &FitConfig::default()).unwrap();
        let observed = [10.0, 25.0, 60.0, 150.0, 300.0, 420.0];
        for (fitted, obs) in fit.fitted_sales.iter().zip(observed) {
            assert!((fitted - obs).abs() < 10.0, "fitted {fitted} vs observed {obs}");
        }
    }

    #[test]
    fn test_recovers_known_parameters() {
        let truth = BassParameters::new(0.03, 0.38, 1000.0);
        let series = synthetic_series(truth, 12);
        let mut config = FitConfig::default();
        // The peak sales is about 110, so M must be allowed up to ~9x that.
        config.m_upper_multiplier = 20.0;
        let fit = fit_bass(&series, &config).unwrap();
        assert_approx_eq!(fit.params.p, 0.03, 1e-4);
        assert_approx_eq!(fit.params.q, 0.38, 1e-4);
        assert_approx_eq!(fit.params.m, 1000.0, 0.5);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let a = fit_bass(&sample_series(), &FitConfig::default()).unwrap();
        let b = fit_bass(&sample_series(), &FitConfig::default()).unwrap();
        assert_eq!(a.params, b.params);
        assert_eq!(a.fitted_sales, b.fitted_sales);
        assert_eq!(a.evaluations, b.evaluations);
    }

    #[test]
    fn test_zero_sales_fails_without_fitting() {
        let series =
            ObservationSeries::from_pairs("dead", &[2019, 2020, 2021], &[0.0, 0.0, 0.0]).unwrap();
        match fit_bass(&series, &FitConfig::default()) {
            Err(BassError::FitError { evaluations, .. }) => assert_eq!(evaluations, 0),
            other => panic!("expected FitError, got {other:?}"),
        }
    }

    #[test]
    fn test_tiny_budget_fails() {
        let config = FitConfig {
            max_evaluations: 8,
            ..FitConfig::default()
        };
        let err = fit_bass(&sample_series(), &config).unwrap_err();
        match err {
            BassError::FitError {
                evaluations,
                residual,
                ..
            } => {
                assert!(evaluations >= 8);
                assert!(residual.is_some());
            }
            other => panic!("expected FitError, got {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_lower_bound_rejected() {
        let config = FitConfig {
            p_bounds: (0.0, 1.0),
            ..FitConfig::default()
        };
        assert!(matches!(
            fit_bass(&sample_series(), &config),
            Err(BassError::FitError { .. })
        ));
    }

    #[test]
    fn test_single_observation_fits() {
        let series = ObservationSeries::from_pairs("one", &[2024], &[5.0]).unwrap();
        let fit = fit_bass(&series, &FitConfig::default()).unwrap();
        assert!(fit.params.m >= 5.0);
        assert_approx_eq!(fit.fitted_sales[0], 5.0, 1e-3);
    }

    #[test]
    fn test_fit_serializes() {
        let fit = fit_bass(&sample_series(), &FitConfig::default()).unwrap();
        let json = serde_json::to_string(&fit).unwrap();
        let back: BassFit = serde_json::from_str(&json).unwrap();
        assert_eq!(back.base_year, fit.base_year);
        assert_eq!(back.termination, fit.termination);
    }
}
