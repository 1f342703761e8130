mod observation;
mod bass;
mod forecast;

pub use observation::{Observation, ObservationSeries};
pub use bass::{adoption_rate, AdoptionPeak, BassParameters};
pub use forecast::{ComparisonSeries, ForecastPoint, ForecastSeries, MAX_FORECAST_SPAN};
