use crate::error::BassError;
use crate::models::{BassParameters, ForecastPoint, ForecastSeries, MAX_FORECAST_SPAN};

/// Predict sales for every year from `base_year` through `end_year`.
///
/// The range may cover at most [`MAX_FORECAST_SPAN`] years past the base year.
///
/// # Examples
///
/// ```
/// use bass_diffusion_forecaster::analysis::forecast;
/// use bass_diffusion_forecaster::models::BassParameters;
///
/// let params = BassParameters::new(0.05, 0.3, 1000.0);
/// let fc = forecast(&params, 2019, 2026).unwrap();
/// assert_eq!(fc.len(), 8);
/// assert_eq!(fc.points[0].year, 2019);
/// ```
pub fn forecast(
    params: &BassParameters,
    base_year: i32,
    end_year: i32,
) -> Result<ForecastSeries, BassError> {
    let span = i64::from(end_year) - i64::from(base_year);
    if !(0..=MAX_FORECAST_SPAN).contains(&span) {
        return Err(BassError::RangeError {
            base_year,
            end_year,
        });
    }

    let points = (base_year..=end_year)
        .map(|year| ForecastPoint {
            year,
            predicted_sales: params.predicted_sales(f64::from(year) - f64::from(base_year)),
        })
        .collect();

    Ok(ForecastSeries {
        base_year,
        end_year,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> BassParameters {
        BassParameters::new(0.03, 0.38, 1000.0)
    }

    #[test]
    fn test_single_year_is_initial_rate() {
        let fc = forecast(&params(), 2019, 2019).unwrap();
        assert_eq!(fc.len(), 1);
        assert_eq!(fc.points[0].year, 2019);
        assert_eq!(fc.points[0].predicted_sales, params().predicted_sales(0.0));
    }

    #[test]
    fn test_inclusive_range() {
        let fc = forecast(&params(), 2019, 2026).unwrap();
        assert_eq!(fc.len(), 8);
        assert_eq!(fc.years(), (2019..=2026).collect::<Vec<_>>());
        assert_eq!(fc.base_year, 2019);
        assert_eq!(fc.end_year, 2026);
    }

    #[test]
    fn test_end_before_base_is_range_error() {
        match forecast(&params(), 2019, 2018) {
            Err(BassError::RangeError {
                base_year,
                end_year,
            }) => {
                assert_eq!(base_year, 2019);
                assert_eq!(end_year, 2018);
            }
            other => panic!("expected RangeError, got {other:?}"),
        }
    }

    #[test]
    fn test_span_too_long_is_range_error() {
        let err = forecast(&params(), -2_000_000_000, 2_000_000_000).unwrap_err();
        assert!(matches!(err, BassError::RangeError { .. }));
        assert!(err.to_string().contains("more than 1000 years"));
    }

    #[test]
    fn test_longest_allowed_span() {
        let fc = forecast(&params(), 2000, 3000).unwrap();
        assert_eq!(fc.len(), 1001);
        assert!(forecast(&params(), 2000, 3001).is_err());
    }

    #[test]
    fn test_extreme_years_do_not_overflow() {
        let fc = forecast(&params(), i32::MAX - 1, i32::MAX).unwrap();
        assert_eq!(fc.years(), vec![i32::MAX - 1, i32::MAX]);
        let err = forecast(&params(), i32::MAX, i32::MIN).unwrap_err();
        assert!(err.to_string().contains("before base year"));
    }

    #[test]
    fn test_idempotent() {
        let a = forecast(&params(), 2010, 2040).unwrap();
        let b = forecast(&params(), 2010, 2040).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rises_then_falls() {
        let fc = forecast(&params(), 0, 30).unwrap();
        let peak_year = params().peak().time.round() as i32;
        let sales = fc.predicted_sales();
        assert!(sales[1] > sales[0]);
        assert!(sales[30] < sales[peak_year as usize]);
    }

    #[test]
    fn test_all_predictions_non_negative() {
        let fc = forecast(&params(), 1990, 2100).unwrap();
        assert!(fc.points.iter().all(|p| p.predicted_sales >= 0.0));
    }
}
