use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

use super::optimizer::LeastSquaresOutcome;

/// Estimate and confidence interval for one fitted parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterEstimate {
    pub estimate: f64,
    pub std_error: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Confidence intervals for p, q, and M.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterIntervals {
    pub confidence_level: f64,
    pub p: ParameterEstimate,
    pub q: ParameterEstimate,
    pub m: ParameterEstimate,
}

/// Goodness of fit for a Bass fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitStatistics {
    /// Sum of squared residuals
    pub sse: f64,
    pub rmse: f64,
    /// `None` when observed sales have no variance
    pub r_squared: Option<f64>,
    /// Mean absolute percentage error over non-zero observations
    pub mape: Option<f64>,
    /// Observations minus fitted parameters (zero when underdetermined)
    pub degrees_of_freedom: usize,
    /// `None` when there are no residual degrees of freedom or the
    /// Jacobian is rank deficient
    pub parameter_intervals: Option<ParameterIntervals>,
}

impl FitStatistics {
    pub fn compute(observed: &[f64], outcome: &LeastSquaresOutcome, confidence: f64) -> Self {
        let n = observed.len();
        let k = outcome.params.len();
        let sse = outcome.cost;
        let rmse = (sse / n as f64).sqrt();

        let mean = observed.iter().mean();
        let sst: f64 = observed.iter().map(|y| (y - mean).powi(2)).sum();
        let r_squared = if sst > 0.0 { Some(1.0 - sse / sst) } else { None };

        let pct: Vec<f64> = observed
            .iter()
            .zip(&outcome.residuals)
            .filter(|(y, _)| **y != 0.0)
            .map(|(y, r)| (r / y).abs() * 100.0)
            .collect();
        let mape = if pct.is_empty() {
            None
        } else {
            Some(pct.iter().mean())
        };

        let degrees_of_freedom = n.saturating_sub(k);
        let parameter_intervals = if degrees_of_freedom == 0 {
            tracing::warn!(
                observations = n,
                parameters = k,
                "no residual degrees of freedom; parameter intervals unavailable"
            );
            None
        } else {
            compute_intervals(&outcome.params, &outcome.jacobian, sse, degrees_of_freedom, confidence)
        };

        Self {
            sse,
            rmse,
            r_squared,
            mape,
            degrees_of_freedom,
            parameter_intervals,
        }
    }
}

/// Student-t intervals from the covariance `s^2 (J^T J)^-1`.
fn compute_intervals(
    params: &[f64],
    jacobian: &DMatrix<f64>,
    sse: f64,
    df: usize,
    confidence: f64,
) -> Option<ParameterIntervals> {
    if params.len() != 3 || !(confidence > 0.0 && confidence < 1.0) {
        return None;
    }

    let normal = jacobian.transpose() * jacobian;
    let Some(inverse) = normal.try_inverse() else {
        tracing::warn!("Jacobian is rank deficient; parameter intervals unavailable");
        return None;
    };

    let variance = sse / df as f64;
    let t_dist = StudentsT::new(0.0, 1.0, df as f64).ok()?;
    let t_value = t_dist.inverse_cdf(1.0 - (1.0 - confidence) / 2.0);

    let mut estimates = [ParameterEstimate {
        estimate: 0.0,
        std_error: 0.0,
        lower: 0.0,
        upper: 0.0,
    }; 3];
    for (i, est) in estimates.iter_mut().enumerate() {
        let var = variance * inverse[(i, i)];
        if !var.is_finite() || var < 0.0 {
            tracing::warn!(parameter = i, var, "invalid parameter variance");
            return None;
        }
        let std_error = var.sqrt();
        *est = ParameterEstimate {
            estimate: params[i],
            std_error,
            lower: params[i] - t_value * std_error,
            upper: params[i] + t_value * std_error,
        };
    }

    Some(ParameterIntervals {
        confidence_level: confidence,
        p: estimates[0],
        q: estimates[1],
        m: estimates[2],
    })
}
