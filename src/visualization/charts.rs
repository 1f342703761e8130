use colored::Colorize;

use crate::models::ComparisonSeries;

const BAR_WIDTH: usize = 40;

fn bar(value: f64, max: f64) -> String {
    let len = if max > 0.0 {
        ((value / max) * BAR_WIDTH as f64).round().max(0.0) as usize
    } else {
        0
    };
    "\u{2588}".repeat(len)
}

/// Format a text chart of observed, fitted, and forecast sales per year.
pub fn format_comparison_chart(cmp: &ComparisonSeries) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Actual vs Bass Model".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    if cmp.forecast_years.is_empty() && cmp.observed_years.is_empty() {
        output.push_str("  No data available.\n");
        return output;
    }

    let max = cmp
        .observed_sales
        .iter()
        .chain(&cmp.fitted_sales)
        .chain(&cmp.forecast_sales)
        .copied()
        .fold(0.0f64, f64::max);

    output.push_str(&format!(
        "  {}  {}  {}\n",
        "actual".blue(),
        "fitted".green(),
        "predicted".red()
    ));
    output.push_str(&format!("  {}\n", "-".repeat(70)));

    let mut years: Vec<i32> = cmp
        .observed_years
        .iter()
        .chain(&cmp.forecast_years)
        .copied()
        .collect();
    years.sort_unstable();
    years.dedup();

    for year in years {
        let observed_idx = cmp.observed_years.iter().position(|&y| y == year);
        let actual = observed_idx.and_then(|i| cmp.observed_sales.get(i).copied());
        let fitted = observed_idx.and_then(|i| cmp.fitted_sales.get(i).copied());
        let predicted = cmp
            .forecast_years
            .iter()
            .position(|&y| y == year)
            .and_then(|i| cmp.forecast_sales.get(i).copied());

        if let Some(actual) = actual {
            output.push_str(&format!(
                "  {:>4}  {:>10.1}  {}\n",
                year,
                actual,
                bar(actual, max).blue()
            ));
            if let Some(fitted) = fitted {
                output.push_str(&format!(
                    "  {:>4}  {:>10.1}  {}\n",
                    "",
                    fitted,
                    bar(fitted, max).green()
                ));
            }
        } else if let Some(predicted) = predicted {
            output.push_str(&format!(
                "  {:>4}  {:>10.1}  {}\n",
                year,
                predicted,
                bar(predicted, max).red()
            ));
        }
    }

    output.push('\n');
    output
}

/// Print a text chart of observed, fitted, and forecast sales.
pub fn print_comparison_chart(cmp: &ComparisonSeries) {
    print!("{}", format_comparison_chart(cmp));
}
