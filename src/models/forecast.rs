use serde::{Deserialize, Serialize};

/// Predicted sales for a single year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub year: i32,
    pub predicted_sales: f64,
}

/// Longest forecast range, in years past the base year.
pub const MAX_FORECAST_SPAN: i64 = 1000;

/// Predicted sales for every year from the base year through the end year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub base_year: i32,
    pub end_year: i32,
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn years(&self) -> Vec<i32> {
        self.points.iter().map(|p| p.year).collect()
    }

    pub fn predicted_sales(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted_sales).collect()
    }

    /// Prediction for a given year, if it lies in the forecast range.
    pub fn at(&self, year: i32) -> Option<f64> {
        let offset = usize::try_from(i64::from(year) - i64::from(self.base_year)).ok()?;
        self.points.get(offset).map(|p| p.predicted_sales)
    }

    /// Sum of predicted sales over the whole range.
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.predicted_sales).sum()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The five aligned sequences a chart needs to compare observed, fitted,
/// and forecast sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSeries {
    pub observed_years: Vec<i32>,
    pub observed_sales: Vec<f64>,
    pub fitted_sales: Vec<f64>,
    pub forecast_years: Vec<i32>,
    pub forecast_sales: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ForecastSeries {
        ForecastSeries {
            base_year: 2019,
            end_year: 2021,
            points: vec![
                ForecastPoint {
                    year: 2019,
                    predicted_sales: 5.0,
                },
                ForecastPoint {
                    year: 2020,
                    predicted_sales: 7.5,
                },
                ForecastPoint {
                    year: 2021,
                    predicted_sales: 9.0,
                },
            ],
        }
    }

    #[test]
    fn test_accessors() {
        let fc = sample();
        assert_eq!(fc.len(), 3);
        assert!(!fc.is_empty());
        assert_eq!(fc.years(), vec![2019, 2020, 2021]);
        assert_eq!(fc.predicted_sales(), vec![5.0, 7.5, 9.0]);
        assert!((fc.total() - 21.5).abs() < 1e-12);
    }

    #[test]
    fn test_at_lookup() {
        let fc = sample();
        assert_eq!(fc.at(2020), Some(7.5));
        assert_eq!(fc.at(2018), None);
        assert_eq!(fc.at(2022), None);
    }

    #[test]
    fn test_at_lookup_far_from_base() {
        let fc = sample();
        assert_eq!(fc.at(i32::MIN), None);
        assert_eq!(fc.at(i32::MAX), None);
    }
}
