use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::analysis::{BassFit, ParameterEstimate};
use crate::models::{ComparisonSeries, ForecastSeries};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn interval_cells(est: Option<&ParameterEstimate>, precision: usize) -> [Cell; 3] {
    match est {
        Some(e) => [
            Cell::new(format!("{:.*}", precision, e.std_error)),
            Cell::new(format!("{:.*}", precision, e.lower)),
            Cell::new(format!("{:.*}", precision, e.upper)),
        ],
        None => [Cell::new("-"), Cell::new("-"), Cell::new("-")],
    }
}

/// Format the fitted parameters, with confidence intervals when available.
pub fn format_parameter_summary(fit: &BassFit) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Bass Model Parameters".bold().green()));
    let intervals = fit.statistics.parameter_intervals.as_ref();
    let subtitle = match intervals {
        Some(ci) => format!(
            "Base year: {} | Confidence Level: {:.0}%",
            fit.base_year,
            ci.confidence_level * 100.0
        ),
        None => format!("Base year: {} | Intervals unavailable", fit.base_year),
    };
    output.push_str(&format!("{}\n", subtitle.dimmed()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let mut table = new_table();
    table.set_header(vec!["Parameter", "Estimate", "Std Error", "Lower CI", "Upper CI"]);

    let rows = [
        ("p (innovation)", fit.params.p, intervals.map(|ci| &ci.p), 4),
        ("q (imitation)", fit.params.q, intervals.map(|ci| &ci.q), 4),
        ("M (market potential)", fit.params.m, intervals.map(|ci| &ci.m), 1),
    ];
    for (name, value, est, precision) in rows {
        let [se, lo, hi] = interval_cells(est, precision);
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{:.*}", precision, value)),
            se,
            lo,
            hi,
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the fitted parameter table.
pub fn print_parameter_summary(fit: &BassFit) {
    print!("{}", format_parameter_summary(fit));
}

/// Format goodness-of-fit statistics and optimizer diagnostics.
pub fn format_fit_statistics(fit: &BassFit) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Fit Statistics".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let stats = &fit.statistics;
    let peak = fit.params.peak();

    let mut table = new_table();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("SSE"), Cell::new(format!("{:.2}", stats.sse))]);
    table.add_row(vec![Cell::new("RMSE"), Cell::new(format!("{:.2}", stats.rmse))]);
    table.add_row(vec![
        Cell::new("R-squared"),
        Cell::new(
            stats
                .r_squared
                .map(|r| format!("{r:.4}"))
                .unwrap_or_else(|| "-".to_string()),
        ),
    ]);
    table.add_row(vec![
        Cell::new("MAPE"),
        Cell::new(
            stats
                .mape
                .map(|m| format!("{m:.1}%"))
                .unwrap_or_else(|| "-".to_string()),
        ),
    ]);
    table.add_row(vec![
        Cell::new("Peak Year"),
        Cell::new(format!("{:.1}", f64::from(fit.base_year) + peak.time)),
    ]);
    table.add_row(vec![
        Cell::new("Peak Sales"),
        Cell::new(format!("{:.1}", peak.sales)),
    ]);
    table.add_row(vec![
        Cell::new("Evaluations"),
        Cell::new(format!("{} ({} iterations)", fit.evaluations, fit.iterations)),
    ]);
    table.add_row(vec![
        Cell::new("Termination"),
        Cell::new(fit.termination.to_string()),
    ]);

    output.push_str(&format!("{table}"));
    output
}

/// Print goodness-of-fit statistics.
pub fn print_fit_statistics(fit: &BassFit) {
    print!("{}", format_fit_statistics(fit));
}

/// Format observed vs fitted sales for each observed year.
pub fn format_fit_table(cmp: &ComparisonSeries) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Observed vs Fitted".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let mut table = new_table();
    table.set_header(vec!["Year", "Observed", "Fitted", "Residual"]);

    for ((year, observed), fitted) in cmp
        .observed_years
        .iter()
        .zip(&cmp.observed_sales)
        .zip(&cmp.fitted_sales)
    {
        table.add_row(vec![
            Cell::new(format!("{year}")),
            Cell::new(format!("{observed:.1}")),
            Cell::new(format!("{fitted:.1}")),
            Cell::new(format!("{:+.1}", observed - fitted)),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print observed vs fitted sales.
pub fn print_fit_table(cmp: &ComparisonSeries) {
    print!("{}", format_fit_table(cmp));
}

/// Format the forecast, marking years beyond the observed range.
pub fn format_forecast_table(forecast: &ForecastSeries, last_observed_year: Option<i32>) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Sales Forecast".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let mut table = new_table();
    table.set_header(vec!["Year", "Predicted Sales", ""]);

    for point in &forecast.points {
        let marker = match last_observed_year {
            Some(last) if point.year > last => "projected",
            Some(_) => "fitted",
            None => "",
        };
        table.add_row(vec![
            Cell::new(format!("{}", point.year)),
            Cell::new(format!("{:.1}", point.predicted_sales)),
            Cell::new(marker),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the forecast table.
pub fn print_forecast_table(forecast: &ForecastSeries, last_observed_year: Option<i32>) {
    print!("{}", format_forecast_table(forecast, last_observed_year));
}
