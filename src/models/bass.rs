use serde::{Deserialize, Serialize};

/// Fitted Bass diffusion parameters.
///
/// Per-period sales at elapsed time `t`:
/// `S(t) = M * (p+q)^2 * e^(-(p+q)t) / (p * (1 + (q/p) * e^(-(p+q)t))^2)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BassParameters {
    /// Coefficient of innovation
    pub p: f64,
    /// Coefficient of imitation
    pub q: f64,
    /// Market potential
    pub m: f64,
}

/// Timing and height of the adoption peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdoptionPeak {
    /// Elapsed time of the peak; zero when adoption only declines.
    pub time: f64,
    /// Predicted sales rate at the peak.
    pub sales: f64,
}

impl BassParameters {
    pub fn new(p: f64, q: f64, m: f64) -> Self {
        Self { p, q, m }
    }

    /// Parameters as a `[p, q, M]` vector, the optimizer's ordering.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.p, self.q, self.m]
    }

    pub fn from_slice(values: &[f64]) -> Self {
        Self {
            p: values[0],
            q: values[1],
            m: values[2],
        }
    }

    /// Fraction of the market adopting per unit time at elapsed time `t`.
    pub fn adoption(&self, t: f64) -> f64 {
        adoption_rate(t, self.p, self.q)
    }

    /// Predicted sales at elapsed time `t`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bass_diffusion_forecaster::models::BassParameters;
    ///
    /// let params = BassParameters::new(0.03, 0.38, 1000.0);
    /// // At t = 0 the rate reduces to M * p.
    /// assert!((params.predicted_sales(0.0) - 30.0).abs() < 1e-9);
    /// ```
    pub fn predicted_sales(&self, t: f64) -> f64 {
        self.m * self.adoption(t)
    }

    /// When adoption peaks and how high.
    pub fn peak(&self) -> AdoptionPeak {
        let time = if self.q > self.p {
            (self.q / self.p).ln() / (self.p + self.q)
        } else {
            0.0
        };
        AdoptionPeak {
            time,
            sales: self.predicted_sales(time),
        }
    }
}

/// Bass density: `(p+q)^2 * e^(-(p+q)t) / (p * (1 + (q/p) * e^(-(p+q)t))^2)`.
pub fn adoption_rate(t: f64, p: f64, q: f64) -> f64 {
    let rate = p + q;
    let decay = (-rate * t).exp();
    let denom = 1.0 + (q / p) * decay;
    rate * rate * decay / (p * denom * denom)
}
