use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use bass_diffusion_forecaster::{
    analysis::{forecast, BassAnalyzer},
    io::{self, RawTable},
    models::BassParameters,
    visualization::{
        print_comparison_chart, print_fit_statistics, print_fit_table, print_forecast_table,
        print_parameter_summary,
    },
    AppConfig,
};

#[derive(Parser)]
#[command(
    name = "bass-forecast",
    about = "Bass Diffusion Forecaster - Fit adoption curves to annual sales and project them forward",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the Bass model to one category and show the forecast
    Fit {
        /// Path to input file (CSV or Excel)
        #[arg(short, long)]
        input: PathBuf,

        /// Category column to model
        #[arg(short, long)]
        category: String,

        /// Last year to forecast (inclusive)
        #[arg(short, long)]
        end_year: Option<i32>,

        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Worksheet name for Excel input
        #[arg(long)]
        sheet: Option<String>,

        /// CSV field delimiter; sniffed from the header when omitted
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Skip the text chart
        #[arg(long)]
        no_chart: bool,
    },

    /// Forecast from known parameters without fitting
    Forecast {
        /// Coefficient of innovation
        #[arg(short, long)]
        p: f64,

        /// Coefficient of imitation
        #[arg(short, long)]
        q: f64,

        /// Market potential
        #[arg(short, long)]
        m: f64,

        /// Year corresponding to t = 0
        #[arg(short, long)]
        base_year: i32,

        /// Last year to forecast (inclusive)
        #[arg(short, long, default_value = "2026")]
        end_year: i32,
    },

    /// List the category columns of a table
    Categories {
        /// Path to input file
        #[arg(short, long)]
        input: PathBuf,

        /// Worksheet name for Excel input
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Run the pipeline and write the report to a file
    Export {
        /// Path to input file (CSV or Excel)
        #[arg(short, long)]
        input: PathBuf,

        /// Category column to model
        #[arg(short, long)]
        category: String,

        /// Output file path (.json, .csv, or .xlsx)
        #[arg(short, long)]
        output: PathBuf,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Last year to forecast (inclusive)
        #[arg(short, long)]
        end_year: Option<i32>,

        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(p) => AppConfig::load(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(AppConfig::default()),
    }
}

fn load_table(
    path: &Path,
    config: &AppConfig,
    sheet: Option<String>,
    delimiter: Option<char>,
) -> Result<RawTable> {
    let mut layout = config.layout.clone();
    if let Some(sheet) = sheet {
        layout.sheet = sheet;
    }
    let delimiter = match delimiter {
        Some(c) if c.is_ascii() => Some(c as u8),
        Some(c) => anyhow::bail!("Delimiter must be a single ASCII character, got '{c}'"),
        None => None,
    };
    let reader = io::reader_for_path(path, &layout, delimiter)?;
    let table = reader
        .read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    tracing::info!(rows = table.num_rows(), "loaded table from {}", path.display());
    Ok(table)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Fit {
            input,
            category,
            end_year,
            config,
            sheet,
            delimiter,
            no_chart,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(end) = end_year {
                config.forecast.end_year = end;
            }
            let table = load_table(&input, &config, sheet, delimiter)?;

            println!(
                "\n{}",
                format!("Bass Diffusion Fit: {category} ({})", input.display())
                    .bold()
                    .cyan()
            );

            let report = BassAnalyzer::from_config(&config).run(&table, &category)?;
            println!(
                "  Loaded {} observations ({}-{})",
                report.series.len(),
                report.series.base_year(),
                report.series.last_year()
            );

            print_parameter_summary(&report.fit);
            print_fit_statistics(&report.fit);
            print_fit_table(&report.comparison);
            print_forecast_table(&report.forecast, Some(report.series.last_year()));

            if !no_chart {
                print_comparison_chart(&report.comparison);
            }
        }

        Commands::Forecast {
            p,
            q,
            m,
            base_year,
            end_year,
        } => {
            if !(p > 0.0 && q > 0.0 && m > 0.0) {
                anyhow::bail!("Parameters p, q, and m must all be positive");
            }
            let params = BassParameters::new(p, q, m);

            println!(
                "\n{}",
                format!("Bass Forecast: p={p}, q={q}, M={m}").bold().cyan()
            );

            let series = forecast(&params, base_year, end_year)?;
            print_forecast_table(&series, None);

            let peak = params.peak();
            println!(
                "  Peak: {:.1} in {:.1}",
                peak.sales,
                f64::from(base_year) + peak.time
            );
        }

        Commands::Categories { input, sheet } => {
            let config = AppConfig::default();
            let table = load_table(&input, &config, sheet, None)?;

            println!("\n{}", "Categories".bold().cyan());
            println!("{}", "=".repeat(40));
            let categories = table.categories();
            if categories.is_empty() {
                println!("  (none)");
            }
            for name in categories {
                println!("  {name}");
            }
        }

        Commands::Export {
            input,
            category,
            output,
            pretty,
            end_year,
            config,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(end) = end_year {
                config.forecast.end_year = end;
            }
            let table = load_table(&input, &config, None, None)?;
            let report = BassAnalyzer::from_config(&config).run(&table, &category)?;

            let writer = io::writer_for_path(&output, pretty)?;
            writer.write(&report, &output)?;

            println!(
                "{} Exported {category} -> {}",
                "Success:".green().bold(),
                output.display()
            );
        }
    }

    Ok(())
}
