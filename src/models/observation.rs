use serde::{Deserialize, Serialize};

use crate::error::BassError;

/// Sales reported for a single year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub year: i32,
    pub sales: f64,
}

/// An ordered, validated series of yearly sales for one category.
///
/// Years are strictly increasing and every sales value is finite and
/// non-negative. The series is immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedSeries")]
pub struct ObservationSeries {
    category: String,
    observations: Vec<Observation>,
}

/// Wire form of a series; deserialization goes through
/// [`ObservationSeries::new`] so stored reports are validated too.
#[derive(Deserialize)]
struct UncheckedSeries {
    category: String,
    observations: Vec<Observation>,
}

impl TryFrom<UncheckedSeries> for ObservationSeries {
    type Error = BassError;

    fn try_from(raw: UncheckedSeries) -> Result<Self, Self::Error> {
        Self::new(raw.category, raw.observations)
    }
}

impl ObservationSeries {
    /// Build a series, rejecting empty input, non-increasing years, and
    /// negative or non-finite sales.
    ///
    /// # Examples
    ///
    /// ```
    /// use bass_diffusion_forecaster::models::{Observation, ObservationSeries};
    ///
    /// let series = ObservationSeries::new(
    ///     "Three-Wheeler",
    ///     vec![
    ///         Observation { year: 2019, sales: 10.0 },
    ///         Observation { year: 2020, sales: 25.0 },
    ///     ],
    /// )
    /// .unwrap();
    /// assert_eq!(series.base_year(), 2019);
    /// assert_eq!(series.max_sales(), 25.0);
    /// ```
    pub fn new(
        category: impl Into<String>,
        observations: Vec<Observation>,
    ) -> Result<Self, BassError> {
        let category = category.into();
        if observations.is_empty() {
            return Err(BassError::DataError(format!(
                "Category '{category}' has no observations"
            )));
        }

        for obs in &observations {
            if !obs.sales.is_finite() || obs.sales < 0.0 {
                return Err(BassError::DataError(format!(
                    "Year {}: sales must be a finite non-negative number, got {}",
                    obs.year, obs.sales
                )));
            }
        }

        for pair in observations.windows(2) {
            if pair[1].year <= pair[0].year {
                return Err(BassError::DataError(format!(
                    "Years must be strictly increasing, but {} follows {}",
                    pair[1].year, pair[0].year
                )));
            }
        }

        Ok(Self {
            category,
            observations,
        })
    }

    /// Build a series from parallel year and sales slices.
    pub fn from_pairs(
        category: impl Into<String>,
        years: &[i32],
        sales: &[f64],
    ) -> Result<Self, BassError> {
        if years.len() != sales.len() {
            return Err(BassError::DataError(format!(
                "Got {} years but {} sales values",
                years.len(),
                sales.len()
            )));
        }
        let observations = years
            .iter()
            .zip(sales)
            .map(|(&year, &sales)| Observation { year, sales })
            .collect();
        Self::new(category, observations)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn years(&self) -> Vec<i32> {
        self.observations.iter().map(|o| o.year).collect()
    }

    pub fn sales(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.sales).collect()
    }

    /// Earliest year in the series; the zero point for elapsed time.
    pub fn base_year(&self) -> i32 {
        // Non-empty and strictly increasing, so the first year is the minimum.
        self.observations[0].year
    }

    /// Last year in the series.
    pub fn last_year(&self) -> i32 {
        self.observations[self.observations.len() - 1].year
    }

    /// Largest observed sales value.
    pub fn max_sales(&self) -> f64 {
        self.observations
            .iter()
            .map(|o| o.sales)
            .fold(0.0f64, f64::max)
    }

    /// Elapsed years since the base year for each observation.
    pub fn elapsed(&self) -> Vec<f64> {
        let base = self.base_year();
        self.observations
            .iter()
            .map(|o| f64::from(o.year) - f64::from(base))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(year: i32, sales: f64) -> Observation {
        Observation { year, sales }
    }

    #[test]
    fn test_valid_series() {
        let series =
            ObservationSeries::new("EV", vec![obs(2019, 10.0), obs(2020, 25.0), obs(2021, 60.0)])
                .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.category(), "EV");
        assert_eq!(series.base_year(), 2019);
        assert_eq!(series.last_year(), 2021);
        assert_eq!(series.years(), vec![2019, 2020, 2021]);
        assert_eq!(series.sales(), vec![10.0, 25.0, 60.0]);
        assert_eq!(series.elapsed(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_max_sales() {
        let series =
            ObservationSeries::new("EV", vec![obs(2019, 10.0), obs(2020, 42.5), obs(2021, 30.0)])
                .unwrap();
        assert_eq!(series.max_sales(), 42.5);
    }

    #[test]
    fn test_empty_series_rejected() {
        let err = ObservationSeries::new("EV", vec![]).unwrap_err();
        assert!(matches!(err, BassError::DataError(_)));
    }

    #[test]
    fn test_duplicate_year_rejected() {
        let err =
            ObservationSeries::new("EV", vec![obs(2019, 1.0), obs(2019, 2.0)]).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn test_decreasing_year_rejected() {
        let err =
            ObservationSeries::new("EV", vec![obs(2020, 1.0), obs(2019, 2.0)]).unwrap_err();
        assert!(matches!(err, BassError::DataError(_)));
    }

    #[test]
    fn test_gap_in_years_allowed() {
        let series = ObservationSeries::new("EV", vec![obs(2019, 1.0), obs(2022, 2.0)]).unwrap();
        assert_eq!(series.elapsed(), vec![0.0, 3.0]);
    }

    #[test]
    fn test_negative_sales_rejected() {
        let err = ObservationSeries::new("EV", vec![obs(2019, -1.0)]).unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn test_nan_sales_rejected() {
        assert!(ObservationSeries::new("EV", vec![obs(2019, f64::NAN)]).is_err());
        assert!(ObservationSeries::new("EV", vec![obs(2019, f64::INFINITY)]).is_err());
    }

    #[test]
    fn test_from_pairs_length_mismatch() {
        let err = ObservationSeries::from_pairs("EV", &[2019, 2020], &[1.0]).unwrap_err();
        assert!(matches!(err, BassError::DataError(_)));
    }

    #[test]
    fn test_series_json_roundtrip() {
        let series = ObservationSeries::from_pairs("EV", &[2019, 2020], &[1.0, 2.5]).unwrap();
        let json = serde_json::to_string(&series).unwrap();
        let deserialized: ObservationSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, series);
    }

    #[test]
    fn test_json_with_unordered_negative_series_rejected() {
        let json = r#"{"category":"x","observations":[{"year":2020,"sales":-5.0},{"year":2019,"sales":1.0}]}"#;
        let err = serde_json::from_str::<ObservationSeries>(json).unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn test_json_with_empty_series_rejected() {
        let json = r#"{"category":"x","observations":[]}"#;
        let err = serde_json::from_str::<ObservationSeries>(json).unwrap_err();
        assert!(err.to_string().contains("no observations"));
    }

    #[test]
    fn test_elapsed_across_full_year_range() {
        let series =
            ObservationSeries::from_pairs("EV", &[-2_000_000_000, 2_000_000_000], &[10.0, 20.0])
                .unwrap();
        assert_eq!(series.elapsed(), vec![0.0, 4_000_000_000.0]);
    }
}
