pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod visualization;

pub use analysis::{BassAnalyzer, BassFit, BassReport};
pub use config::{AppConfig, FitConfig, ForecastConfig};
pub use error::BassError;
pub use io::{RawCell, RawTable, ReportWriter, SheetLayout, TableReader};
pub use models::{BassParameters, ForecastSeries, Observation, ObservationSeries};
