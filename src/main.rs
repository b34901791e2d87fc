//! CLI entry point for the GTFS-RT validator.
//!
//! Validates a trip update feed against a static GTFS schedule, either once
//! or repeatedly at a fixed sample rate.

use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use gtfs_rt_validator::fetch::auth::{ApiKey, UrlParam};
use gtfs_rt_validator::fetch::{BasicClient, HttpClient, load_source};
use gtfs_rt_validator::gtfs_rt::FeedMessage;
use gtfs_rt_validator::{
    output::{append_record, print_json, print_pretty},
    parser::{parse_feed, trip_update_count},
    schedule::ScheduleIndex,
    stats::ValidationStats,
    validation::{FeedValidator, StopTimeUpdateValidator},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gtfs_rt_validator")]
#[command(about = "Checks GTFS-RT trip updates against a static GTFS schedule", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a GTFS-RT feed from a file or URL once
    Validate {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// GTFS stop_times.txt of the matching static schedule
        #[arg(short, long)]
        stop_times: String,

        /// Optional: CSV file to append a summary row to
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Validate a GTFS-RT feed repeatedly at a fixed sample rate
    Monitor {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// GTFS stop_times.txt of the matching static schedule
        #[arg(short, long)]
        stop_times: String,

        /// CSV file to append one summary row per sample to
        #[arg(short, long, default_value = "validation.csv")]
        output: String,

        /// Sample rate: validate the feed every X seconds
        #[arg(short = 'r', long, default_value_t = 60)]
        sample_rate: u64,

        /// Number of samples to collect (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 1)]
        num_samples: usize,

        #[command(flatten)]
        auth: AuthArgs,
    },
}

#[derive(Args)]
struct AuthArgs {
    /// Optional: API key for the feed (sent as `Authorization: Bearer <key>` by default)
    #[arg(long)]
    api_key: Option<String>,

    /// Send the API key in this header instead
    #[arg(long, requires = "api_key", conflicts_with = "api_key_param")]
    api_key_header: Option<String>,

    /// Append the API key as this URL query parameter instead
    #[arg(long, requires = "api_key")]
    api_key_param: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/gtfs_rt_validator.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("gtfs_rt_validator.log"));

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

    match cli.command {
        Commands::Validate {
            source,
            stop_times,
            output,
            auth,
        } => {
            let client = build_client(&auth)?;
            let schedule = ScheduleIndex::load_stop_times(&stop_times)?;

            let bytes = load_source(&client, &source).await?;
            let feed = parse_feed(&bytes)?;
            let stats = report(&feed, &schedule)?.with_feed_info(&source);

            if let Some(output) = output {
                append_record(&output, &stats)?;
            }
        }
        Commands::Monitor {
            source,
            stop_times,
            output,
            sample_rate,
            num_samples,
            auth,
        } => {
            let client = build_client(&auth)?;
            let schedule = ScheduleIndex::load_stop_times(&stop_times)?;

            monitor(&client, &source, &schedule, &output, sample_rate, num_samples).await?;
        }
    }

    Ok(())
}

/// Picks the feed client from the API key options.
fn build_client(auth: &AuthArgs) -> Result<Box<dyn HttpClient>> {
    let base = BasicClient::new();
    let Some(key) = auth.api_key.as_deref() else {
        return Ok(Box::new(base));
    };

    let client: Box<dyn HttpClient> = match (&auth.api_key_header, &auth.api_key_param) {
        (_, Some(param)) => Box::new(UrlParam::new(base, param.as_str(), key)),
        (Some(header), None) => Box::new(ApiKey::new(base, header, key)?),
        (None, None) => Box::new(ApiKey::bearer(base, key)?),
    };
    Ok(client)
}

/// Validates one decoded feed, logs the report and returns its summary row.
fn report(feed: &FeedMessage, schedule: &ScheduleIndex) -> Result<ValidationStats> {
    debug!(
        entity_count = feed.entity.len(),
        trip_updates = trip_update_count(feed),
        "Validating feed"
    );

    let groups = StopTimeUpdateValidator.validate(Utc::now(), schedule, feed);
    print_pretty(&groups);
    print_json(&groups)?;

    Ok(ValidationStats::from_report(feed, &groups))
}

/// Fetches and validates one sample. Failures become error rows.
#[tracing::instrument(skip(client, schedule))]
async fn sample<C: HttpClient>(client: &C, source: &str, schedule: &ScheduleIndex) -> ValidationStats {
    let stats = match load_source(client, source).await {
        Err(e) => {
            error!(error = %e, "Feed fetch failed");
            ValidationStats::from_error("fetch_error", &e.to_string())
        }
        Ok(bytes) => match parse_feed(&bytes) {
            Err(e) => {
                error!(error = %e, "Feed parse failed");
                ValidationStats::from_error("parse_error", &e.to_string())
            }
            Ok(feed) => report(&feed, schedule).unwrap_or_else(|e| {
                error!(error = %e, "Report failed");
                ValidationStats::from_error("report_error", &e.to_string())
            }),
        },
    };
    stats.with_feed_info(source)
}

/// Validates `source` every `sample_rate` seconds, appending one summary row
/// per sample to `output`.
#[tracing::instrument(skip(client, schedule))]
async fn monitor<C: HttpClient>(
    client: &C,
    source: &str,
    schedule: &ScheduleIndex,
    output: &str,
    sample_rate: u64,
    num_samples: usize,
) -> Result<()> {
    if num_samples == 0 {
        info!(sample_rate, "Sampling infinitely. Press Ctrl+C to stop.");
    } else {
        info!(num_samples, sample_rate, "Starting sample collection");
    }

    let mut sample_count = 0;

    loop {
        // Check if we've reached the sample limit (0 = infinite)
        if num_samples > 0 && sample_count >= num_samples {
            break;
        }

        sample_count += 1;
        info!(sample = sample_count, "Starting sample");

        let stats = sample(client, source, schedule).await;
        if let Err(e) = append_record(output, &stats) {
            error!(error = %e, "Failed to write stats for sample");
        } else {
            info!(
                occurrences = stats.total_occurrences,
                clean = stats.is_clean(),
                "Sample processed"
            );
        }

        // If not the last sample, wait before next iteration
        if num_samples == 0 || sample_count < num_samples {
            info!(sample_rate, "Waiting before next sample");
            tokio::time::sleep(tokio::time::Duration::from_secs(sample_rate)).await;
        }
    }

    info!(output, samples = sample_count, "Finished monitoring feed");
    Ok(())
}
