mod tables;
mod charts;

pub use tables::{
    format_parameter_summary, print_parameter_summary,
    format_fit_statistics, print_fit_statistics,
    format_fit_table, print_fit_table,
    format_forecast_table, print_forecast_table,
};
pub use charts::{format_comparison_chart, print_comparison_chart};
