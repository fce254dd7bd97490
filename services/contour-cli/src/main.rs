//! Confidence contour CLI.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use confidence_contour::Histogram1dOptions;
use contour_cli::{ContourReport, HistogramReport, RunConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "contour-cli")]
#[command(about = "Confidence contours and histograms for sample ensembles", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute confidence contours from a run configuration
    Contours {
        /// Path to run YAML file
        #[arg(short, long)]
        config: PathBuf,

        /// Override percentages, e.g. 68,95
        #[arg(short, long, value_delimiter = ',')]
        percentages: Option<Vec<f64>>,

        /// Override bins per axis
        #[arg(short, long)]
        bins: Option<usize>,

        /// Output format: table (default), json, csv
        #[arg(short, long, default_value = "table")]
        output: String,
    },

    /// Bin one column of a sample file
    Histogram {
        /// Delimited sample file
        #[arg(short, long)]
        input: PathBuf,

        /// Zero-based column index
        #[arg(short, long, default_value = "0")]
        column: usize,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Number of bins (default: ceil(sqrt(n)))
        #[arg(short, long)]
        bins: Option<usize>,

        /// Bin width
        #[arg(long)]
        bin_size: Option<f64>,

        /// Lower bound
        #[arg(long, allow_hyphen_values = true)]
        min: Option<f64>,

        /// Upper bound
        #[arg(long, allow_hyphen_values = true)]
        max: Option<f64>,

        /// Output format: table (default), csv
        #[arg(short, long, default_value = "table")]
        output: String,
    },
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs)?;

    match cli.command {
        Commands::Contours {
            config,
            percentages,
            bins,
            output,
        } => {
            info!(config = %config.display(), "Loading run configuration");

            let mut run_config = RunConfig::from_file(&config)?;
            run_config.apply_overrides(percentages, bins);

            let run = contour_cli::run_contours(&run_config)
                .with_context(|| format!("contour run failed for {}", run_config.input.display()))?;

            match output.as_str() {
                "json" => {
                    println!("{}", ContourReport::format_json(&run)?);
                }
                "csv" => {
                    println!("{}", ContourReport::csv_header());
                    println!("{}", ContourReport::format_csv(&run));
                }
                _ => {
                    println!("{}", ContourReport::format_table(&run));
                }
            }

            Ok(())
        }
        Commands::Histogram {
            input,
            column,
            delimiter,
            bins,
            bin_size,
            min,
            max,
            output,
        } => {
            let options = Histogram1dOptions {
                bins,
                bin_size,
                min,
                max,
            };
            let histogram = contour_cli::run_histogram(&input, delimiter, column, &options)?;

            match output.as_str() {
                "csv" => {
                    println!("{}", HistogramReport::csv_header());
                    println!("{}", HistogramReport::format_csv(&histogram));
                }
                _ => {
                    println!("{}", HistogramReport::format_table(&histogram));
                }
            }

            Ok(())
        }
    }
}
