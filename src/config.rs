use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BassError;
use crate::io::SheetLayout;

/// Seeds, bounds, and stopping rules for the Bass fit.
///
/// Market potential seed and bounds are multiples of the largest observed
/// sales value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitConfig {
    /// Initial coefficient of innovation
    pub p0: f64,
    /// Initial coefficient of imitation
    pub q0: f64,
    /// Initial market potential as a multiple of max sales
    pub m0_multiplier: f64,
    /// Inclusive bounds for p
    pub p_bounds: (f64, f64),
    /// Inclusive bounds for q
    pub q_bounds: (f64, f64),
    /// Lower bound of M as a multiple of max sales
    pub m_lower_multiplier: f64,
    /// Upper bound of M as a multiple of max sales
    pub m_upper_multiplier: f64,
    /// Residual-vector evaluations allowed, Jacobian columns included
    pub max_evaluations: usize,
    /// Relative cost reduction below which the fit has converged
    pub ftol: f64,
    /// Relative step size below which the fit has converged
    pub xtol: f64,
    /// Projected gradient norm below which the fit has converged
    pub gtol: f64,
    /// Confidence level for parameter intervals (e.g. 0.95)
    pub confidence: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            p0: 0.05,
            q0: 0.3,
            m0_multiplier: 3.0,
            p_bounds: (0.001, 1.0),
            q_bounds: (0.001, 1.0),
            m_lower_multiplier: 1.0,
            m_upper_multiplier: 10.0,
            max_evaluations: 10_000,
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 1e-10,
            confidence: 0.95,
        }
    }
}

/// Forecast horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Last year to forecast, inclusive
    pub end_year: i32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { end_year: 2026 }
    }
}

/// Top-level configuration, loadable from a TOML file.
///
/// ```toml
/// [fit]
/// p0 = 0.05
/// max_evaluations = 20000
///
/// [forecast]
/// end_year = 2030
///
/// [layout]
/// sheet = "Data"
/// header_row = 3
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub fit: FitConfig,
    pub forecast: ForecastConfig,
    pub layout: SheetLayout,
}

impl AppConfig {
    /// Parse configuration from a TOML string; missing keys take defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, BassError> {
        Ok(toml::from_str(s)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BassError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }
}
