mod normalizer;
mod optimizer;
mod fitter;
mod statistics;
mod forecaster;
mod analyzer;

pub use normalizer::{coerce_sales, coerce_year, normalize};
pub use optimizer::{levenberg_marquardt, LeastSquaresConfig, LeastSquaresOutcome, Termination};
pub use fitter::{fit_bass, BassFit, FitSetup};
pub use statistics::{FitStatistics, ParameterEstimate, ParameterIntervals};
pub use forecaster::forecast;
pub use analyzer::{BassAnalyzer, BassReport};
