use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::BassError;

/// Stopping rules and evaluation budget for [`levenberg_marquardt`].
#[derive(Clone, Debug)]
pub struct LeastSquaresConfig {
    pub max_evaluations: usize,
    pub ftol: f64,
    pub xtol: f64,
    pub gtol: f64,
}

impl Default for LeastSquaresConfig {
    fn default() -> Self {
        Self {
            max_evaluations: 10_000,
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 1e-10,
        }
    }
}

/// Why the optimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Relative cost reduction fell below `ftol`
    CostReduction,
    /// Step size fell below `xtol`
    StepSize,
    /// Projected gradient fell below `gtol`
    Gradient,
    /// Residuals are exactly zero
    ExactFit,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::CostReduction => write!(f, "cost reduction below ftol"),
            Termination::StepSize => write!(f, "step size below xtol"),
            Termination::Gradient => write!(f, "gradient below gtol"),
            Termination::ExactFit => write!(f, "exact fit"),
        }
    }
}

#[derive(Debug)]
pub struct LeastSquaresOutcome {
    pub params: Vec<f64>,
    pub residuals: Vec<f64>,
    /// Jacobian of the residuals at `params`, one row per residual
    pub jacobian: DMatrix<f64>,
    /// Sum of squared residuals
    pub cost: f64,
    pub evaluations: usize,
    pub iterations: usize,
    pub termination: Termination,
}

const MIN_LAMBDA: f64 = 1e-12;
const MAX_LAMBDA: f64 = 1e16;

/// Box-constrained Levenberg-Marquardt.
///
/// Minimizes the sum of squared residuals returned by `residual_f` subject to
/// `lower <= x <= upper`. Parameters are mapped onto the unit box so that
/// coefficients near 0.01 and market sizes near 10^4 share one damping scale;
/// trial steps are clipped to the box. Every call of `residual_f` counts
/// against `max_evaluations`, Jacobian columns included.
pub fn levenberg_marquardt(
    mut residual_f: impl FnMut(&[f64]) -> Vec<f64>,
    init: &[f64],
    lower: &[f64],
    upper: &[f64],
    config: &LeastSquaresConfig,
) -> Result<LeastSquaresOutcome, BassError> {
    let n = init.len();
    if lower.len() != n || upper.len() != n {
        return Err(fit_error("bounds do not match the parameter count", 0, None));
    }
    for i in 0..n {
        if !(lower[i].is_finite() && upper[i].is_finite() && lower[i] < upper[i]) {
            return Err(fit_error(
                &format!(
                    "infeasible bounds for parameter {i}: [{}, {}]",
                    lower[i], upper[i]
                ),
                0,
                None,
            ));
        }
        if !init[i].is_finite() {
            return Err(fit_error(&format!("initial value {i} is not finite"), 0, None));
        }
    }

    let width: Vec<f64> = (0..n).map(|i| upper[i] - lower[i]).collect();
    let to_params = |s: &DVector<f64>| -> Vec<f64> {
        (0..n).map(|i| lower[i] + s[i] * width[i]).collect()
    };

    let mut s = DVector::from_fn(n, |i, _| ((init[i] - lower[i]) / width[i]).clamp(0.0, 1.0));
    let mut residuals = residual_f(&to_params(&s));
    let mut evaluations = 1;
    let mut cost = sum_of_squares(&residuals);
    if !cost.is_finite() {
        return Err(fit_error(
            "residuals are not finite at the initial guess",
            evaluations,
            None,
        ));
    }

    let mut lambda = 1e-3;
    let mut iterations = 0;

    let termination = 'outer: loop {
        if evaluations >= config.max_evaluations {
            return Err(budget_exhausted(evaluations, cost));
        }
        iterations += 1;

        if cost == 0.0 {
            break Termination::ExactFit;
        }

        let jac = scaled_jacobian(&mut residual_f, &s, &residuals, &to_params);
        evaluations += n;
        let r = DVector::from_column_slice(&residuals);
        let gradient = jac.transpose() * &r;
        let normal = jac.transpose() * &jac;

        if projected_gradient_cosine(&s, &gradient, &normal, cost.sqrt()) <= config.gtol {
            break Termination::Gradient;
        }

        let rhs = -gradient;
        loop {
            let mut damped = normal.clone();
            for i in 0..n {
                damped[(i, i)] += lambda * normal[(i, i)].max(MIN_LAMBDA);
            }

            let Some(step) = damped.lu().solve(&rhs) else {
                lambda = (lambda * 10.0).min(MAX_LAMBDA);
                continue;
            };

            let trial = (&s + step).map(|v| v.clamp(0.0, 1.0));
            let step_norm = (&trial - &s).norm();
            let small_step = step_norm <= config.xtol * (config.xtol + s.norm());

            let trial_residuals = residual_f(&to_params(&trial));
            evaluations += 1;
            let trial_cost = sum_of_squares(&trial_residuals);

            if trial_cost.is_finite() && trial_cost < cost {
                let reduction = (cost - trial_cost) / cost;
                s = trial;
                residuals = trial_residuals;
                cost = trial_cost;
                lambda = (lambda / 10.0).max(MIN_LAMBDA);

                tracing::debug!(iterations, evaluations, cost, lambda, "accepted step");

                if reduction <= config.ftol {
                    break 'outer Termination::CostReduction;
                }
                if small_step {
                    break 'outer Termination::StepSize;
                }
                break;
            }

            lambda = (lambda * 10.0).min(MAX_LAMBDA);
            if small_step {
                break 'outer Termination::StepSize;
            }
            if evaluations >= config.max_evaluations {
                return Err(budget_exhausted(evaluations, cost));
            }
        }
    };

    let params = to_params(&s);
    let jacobian = parameter_jacobian(&mut residual_f, &params, &width, &residuals);

    tracing::debug!(iterations, evaluations, cost, %termination, "least squares converged");

    Ok(LeastSquaresOutcome {
        params,
        residuals,
        jacobian,
        cost,
        evaluations,
        iterations,
        termination,
    })
}

/// Jacobian in parameter units, used for covariance estimates. These calls
/// do not count against the budget.
fn parameter_jacobian(
    residual_f: &mut impl FnMut(&[f64]) -> Vec<f64>,
    params: &[f64],
    width: &[f64],
    residuals: &[f64],
) -> DMatrix<f64> {
    let n = params.len();
    let m = residuals.len();
    let mut jacobian = DMatrix::zeros(m, n);
    for j in 0..n {
        let h = f64::EPSILON.sqrt() * params[j].abs().max(width[j] * 1e-3);
        let mut shifted = params.to_vec();
        shifted[j] += h;
        let r = residual_f(&shifted);
        for k in 0..m {
            jacobian[(k, j)] = (r[k] - residuals[k]) / h;
        }
    }
    jacobian
}

/// Forward-difference Jacobian in unit-box coordinates, stepping inward at
/// the upper edge.
fn scaled_jacobian(
    residual_f: &mut impl FnMut(&[f64]) -> Vec<f64>,
    s: &DVector<f64>,
    residuals: &[f64],
    to_params: &impl Fn(&DVector<f64>) -> Vec<f64>,
) -> DMatrix<f64> {
    let n = s.len();
    let m = residuals.len();
    let mut jac = DMatrix::zeros(m, n);
    for j in 0..n {
        let mut h = f64::EPSILON.sqrt() * s[j].abs().max(1.0);
        if s[j] + h > 1.0 {
            h = -h;
        }
        let mut shifted = s.clone();
        shifted[j] += h;
        let r = residual_f(&to_params(&shifted));
        for k in 0..m {
            jac[(k, j)] = (r[k] - residuals[k]) / h;
        }
    }
    jac
}

/// Largest cosine between the residual vector and a Jacobian column, skipping
/// parameters pinned at a bound the gradient pushes against.
fn projected_gradient_cosine(
    s: &DVector<f64>,
    gradient: &DVector<f64>,
    normal: &DMatrix<f64>,
    residual_norm: f64,
) -> f64 {
    let mut worst = 0.0f64;
    for j in 0..s.len() {
        if (s[j] <= 0.0 && gradient[j] > 0.0) || (s[j] >= 1.0 && gradient[j] < 0.0) {
            continue;
        }
        let column_norm = normal[(j, j)].sqrt();
        if column_norm > 0.0 {
            worst = worst.max(gradient[j].abs() / (column_norm * residual_norm));
        }
    }
    worst
}

fn sum_of_squares(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

fn budget_exhausted(evaluations: usize, cost: f64) -> BassError {
    fit_error(
        "optimizer did not converge within the evaluation budget",
        evaluations,
        Some(cost),
    )
}

fn fit_error(reason: &str, evaluations: usize, residual: Option<f64>) -> BassError {
    BassError::FitError {
        reason: reason.to_string(),
        evaluations,
        residual,
    }
}
