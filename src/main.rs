//! CLI entry point for the trail report tool.
//!
//! Provides subcommands for generating per-vehicle usage reports over a
//! time window and for extracting a raw trail archive.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use trail_report::filter::TimeWindow;
use trail_report::metrics::MissingTripPolicy;
use trail_report::output;
use trail_report::pipeline::{self, ReportConfig, ReportOutcome};
use trail_report::storage;

#[derive(Parser)]
#[command(name = "trail_report")]
#[command(about = "A tool to report per-vehicle usage from GPS trails", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a usage report for a time window
    Report {
        /// CSV file with trip metadata (vehicle number, date, transporter)
        #[arg(long, default_value = "Trip-Info.csv")]
        trip_info: PathBuf,

        /// Directory containing one trail CSV per vehicle
        #[arg(long, default_value = "extracted")]
        trails: PathBuf,

        /// Window start as epoch seconds, inclusive
        #[arg(long)]
        start_time: i64,

        /// Window end as epoch seconds, inclusive
        #[arg(long)]
        end_time: i64,

        /// File to write the report to
        #[arg(short, long, default_value = "report.csv")]
        output: PathBuf,

        /// Report file format
        #[arg(long, value_enum, default_value_t = ReportFormat::Csv)]
        format: ReportFormat,

        /// Skip vehicles with no matching trip metadata instead of failing
        #[arg(long, default_value_t = false)]
        skip_unmatched: bool,
    },
    /// Extract a zip archive of trail CSVs into a directory
    Extract {
        /// Path to the zip archive
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,

        /// Directory to extract into
        #[arg(short, long, default_value = "extracted")]
        dest: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    Csv,
    Json,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/trail_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("trail_report.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            trip_info,
            trails,
            start_time,
            end_time,
            output: output_path,
            format,
            skip_unmatched,
        } => {
            let window = TimeWindow::from_epoch(start_time, end_time)?;
            let config = ReportConfig {
                trip_info,
                trail_dir: trails,
                missing_trip_policy: if skip_unmatched {
                    MissingTripPolicy::Skip
                } else {
                    MissingTripPolicy::Fail
                },
            };

            match pipeline::generate_report(&config, window)? {
                ReportOutcome::Report(rows) => {
                    output::print_pretty(&rows);
                    match format {
                        ReportFormat::Csv => output::write_report_file(&output_path, &rows)?,
                        ReportFormat::Json => output::write_json_file(&output_path, &rows)?,
                    }
                    info!(rows = rows.len(), path = %output_path.display(), "Report written");
                }
                ReportOutcome::NoData => {
                    // A window with no data is a valid answer, not a failure.
                    warn!("No data available for the specified time window");
                }
            }
        }
        Commands::Extract { archive, dest } => {
            storage::extract_archive(&archive, &dest)?;
        }
    }

    Ok(())
}
