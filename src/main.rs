//! CLI entry point for the traffic density analyzer.
//!
//! Provides subcommands for inspecting per-cell averages, summary
//! statistics and ranked cells, emitting the full dashboard view as JSON,
//! and exporting the filtered table to CSV or S3.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use traffic_density::{
    analyzers::{
        bottom_n_excluding_idle, compute_cell_averages, filter_by_cell, filter_by_date_range,
        summary_statistics, top_n, types::SortOrder, types::TrafficRecord,
    },
    config::DashboardConfig,
    dashboard::build_view,
    fetch::{fetch_source, is_remote},
    output::{export_bytes, print_json, print_pretty, write_export},
    parser::{load_path, parse_records},
    request::DashboardRequest,
    upload::{upload_export, upload_target},
};

#[derive(Parser)]
#[command(name = "traffic_density")]
#[command(about = "Aggregate and explore traffic density readings per geohash cell", long_about = None)]
struct Cli {
    /// Path or URL of the traffic CSV (defaults to config, then TRAFFIC_DATA_SOURCE)
    #[arg(short, long, global = true, value_name = "FILE_OR_URL")]
    source: Option<String>,

    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DateRange {
    /// First date to include (YYYY-MM-DD); defaults to the earliest reading
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD); defaults to the latest reading
    #[arg(long)]
    end: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show per-cell averages over all readings
    Cells {
        /// Only show this cell
        #[arg(long)]
        cell: Option<String>,
    },
    /// Show summary statistics for one cell
    Summary {
        /// Cell to summarize; defaults to the first cell id
        #[arg(long)]
        cell: Option<String>,
    },
    /// List the busiest and quietest cells in a date range
    Rank {
        #[command(flatten)]
        range: DateRange,

        /// Number of cells per list
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Print the whole dashboard view as JSON on stdout
    Dashboard {
        #[command(flatten)]
        range: DateRange,

        /// Selected cell; defaults to the first cell id
        #[arg(long)]
        cell: Option<String>,

        /// Number of cells per ranked list
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Export per-cell averages for a date range to CSV
    Export {
        #[command(flatten)]
        range: DateRange,

        /// CSV file to write
        #[arg(short, long)]
        output: Option<String>,

        /// Optional: S3 bucket name to upload the export to (e.g., "my-bucket")
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Optional: Gzip compress the export before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/traffic_density.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("traffic_density.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = DashboardConfig::from_env();
    if let Some(path) = &cli.config {
        config = config.overlay(DashboardConfig::load(path)?);
    }
    if let Some(source) = cli.source {
        config.data_source = Some(source);
    }

    let source = config
        .data_source
        .clone()
        .context("No data source: pass --source, set data_source in the config or TRAFFIC_DATA_SOURCE")?;
    let records = load_records(&source, config.source_token.as_deref()).await?;
    info!(rows = records.len(), source = %source, "Traffic data loaded");

    match cli.command {
        Commands::Cells { cell } => {
            let averages = compute_cell_averages(&records);

            match cell {
                Some(id) => match averages.get(&id) {
                    Some(avg) => info!(
                        cell_id = %avg.cell_id,
                        latitude = avg.latitude,
                        longitude = avg.longitude,
                        min_speed = avg.min_speed,
                        max_speed = avg.max_speed,
                        avg_speed = avg.avg_speed,
                        vehicle_count = avg.vehicle_count,
                        "Cell"
                    ),
                    None => warn!(cell_id = %id, "No data available for cell"),
                },
                None => {
                    for avg in averages.values() {
                        info!(
                            cell_id = %avg.cell_id,
                            latitude = avg.latitude,
                            longitude = avg.longitude,
                            min_speed = avg.min_speed,
                            max_speed = avg.max_speed,
                            avg_speed = avg.avg_speed,
                            vehicle_count = avg.vehicle_count,
                            "Cell"
                        );
                    }
                    info!(cells = averages.len(), "Cell averages summary");
                }
            }
        }
        Commands::Summary { cell } => {
            let request = DashboardRequest::for_records(&records);
            let Some(cell_id) = cell.or(request.cell_id) else {
                warn!("No data available");
                return Ok(());
            };

            match summary_statistics(&filter_by_cell(&records, &cell_id)) {
                Some(stats) => {
                    print_pretty(&stats);
                    print_json(&stats)?;
                    info!(
                        cell_id = %cell_id,
                        "Average Number of Vehicles: {:.2}, Average Speed: {:.2} km/h, Minimum Speed: {:.2} km/h, Maximum Speed: {:.2} km/h",
                        stats.avg_vehicles,
                        stats.avg_speed,
                        stats.min_speed,
                        stats.max_speed
                    );
                }
                None => warn!(cell_id = %cell_id, "No data available for cell"),
            }
        }
        Commands::Rank { range, limit } => {
            let request = DashboardRequest::for_records(&records)
                .with_optional_dates(range.start, range.end)
                .with_list_len(limit.unwrap_or(config.list_len()));
            let in_range = filter_by_date_range(&records, request.start_date, request.end_date);
            let averages = compute_cell_averages(&in_range);

            for (rank, row) in top_n(&averages, request.list_len, SortOrder::Descending)
                .iter()
                .enumerate()
            {
                info!(
                    rank = rank + 1,
                    cell_id = %row.cell_id,
                    vehicle_count = row.vehicle_count,
                    "Top traffic region"
                );
            }
            for (rank, row) in bottom_n_excluding_idle(&averages, request.list_len)
                .iter()
                .enumerate()
            {
                info!(
                    rank = rank + 1,
                    cell_id = %row.cell_id,
                    vehicle_count = row.vehicle_count,
                    "Bottom traffic region"
                );
            }
            if averages.is_empty() {
                warn!(
                    start = %request.start_date,
                    end = %request.end_date,
                    "No data available in date range"
                );
            }
        }
        Commands::Dashboard { range, cell, limit } => {
            let mut request = DashboardRequest::for_records(&records)
                .with_optional_dates(range.start, range.end)
                .with_list_len(limit.unwrap_or(config.list_len()));
            if let Some(cell) = cell {
                request = request.with_cell(cell);
            }

            let view = build_view(&records, &request)?;
            for panel in view.no_data_panels() {
                warn!(?panel, cell_id = ?request.cell_id, "No data available");
            }

            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &view)?;
            writeln!(stdout)?;
        }
        Commands::Export {
            range,
            output,
            s3_bucket,
            gzip,
        } => {
            let request = DashboardRequest::for_records(&records)
                .with_optional_dates(range.start, range.end);
            let in_range = filter_by_date_range(&records, request.start_date, request.end_date);
            let table: Vec<_> = compute_cell_averages(&in_range).into_values().collect();
            if table.is_empty() {
                warn!(
                    start = %request.start_date,
                    end = %request.end_date,
                    "No data available in date range, exporting header only"
                );
            }

            let path = output.unwrap_or_else(|| config.export_path().to_string());
            write_export(&path, &table)?;
            info!(path = %path, cells = table.len(), "Export written");

            if let Some(bucket) = upload_target(s3_bucket.or(config.s3_bucket.clone()), gzip) {
                let aws = aws_config::load_from_env().await;
                let s3 = aws_sdk_s3::Client::new(&aws);
                let file_name = Path::new(&path)
                    .file_name()
                    .and_then(OsStr::to_str)
                    .unwrap_or(traffic_density::output::DEFAULT_EXPORT_FILE);
                upload_export(&s3, &bucket, file_name, export_bytes(&table)?, gzip).await?;
            }
        }
    }

    Ok(())
}

/// Loads traffic records from a local file path or fetches them over HTTP.
#[tracing::instrument(skip_all, fields(source = %source))]
async fn load_records(source: &str, token: Option<&str>) -> Result<Vec<TrafficRecord>> {
    let records = if is_remote(source) {
        let bytes = fetch_source(source, token).await?;
        parse_records(&bytes)?
    } else {
        load_path(Path::new(source))?
    };
    Ok(records)
}
