//! CLI entry point for the Bluebikes explorer.
//!
//! Provides one subcommand per page of the explorer (home, map, charts,
//! feedback) plus a listing of the district selector's choices.

use anyhow::Result;
use bluebikes_explorer::datasets::Datasets;
use bluebikes_explorer::feedback::{FeedbackEntry, Rating, append_feedback, load_feedback};
use bluebikes_explorer::output::{
    render_charts, render_districts, render_feedback, render_home, render_map, write_json,
};
use bluebikes_explorer::views::{
    charts_view, district_options, district_selector, home_view, map_view,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bluebikes_explorer")]
#[command(about = "Explore Boston Bluebikes stations and deployments", long_about = None)]
struct Cli {
    #[command(flatten)]
    sources: Sources,

    /// Output format
    #[arg(long, value_enum, global = true, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

/// Where the datasets and the feedback log live. Paths may also be URLs.
#[derive(Args)]
struct Sources {
    /// Station CSV (path or URL)
    #[arg(
        long,
        global = true,
        env = "BLUEBIKES_STATIONS",
        default_value = "current_bluebikes_stations.csv"
    )]
    stations: String,

    /// Deployment spreadsheet (path or URL)
    #[arg(
        long,
        global = true,
        env = "BLUEBIKES_DEPLOYMENTS",
        default_value = "boston_data.xlsx"
    )]
    deployments: String,

    /// Feedback log CSV
    #[arg(
        long,
        global = true,
        env = "BLUEBIKES_FEEDBACK",
        default_value = "feedback.csv"
    )]
    feedback_file: String,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Landing page with a summary of the loaded data
    Home,
    /// Station map data, optionally limited to one district
    Map {
        /// District to show, or "All"
        #[arg(short, long, default_value = "All")]
        district: String,
    },
    /// Deployment-year and per-district chart data
    Charts,
    /// Choices for the district selector
    Districts,
    /// Submit or list feedback
    #[command(subcommand)]
    Feedback(FeedbackCommand),
}

#[derive(Subcommand)]
enum FeedbackCommand {
    /// Append one piece of feedback to the log
    Submit {
        /// Feedback or suggestions (may be empty)
        #[arg(short, long, default_value = "")]
        text: String,

        /// Rating: 1 = not useful, 5 = very useful
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
    },
    /// Print every submitted entry
    List,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/bluebikes_explorer.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bluebikes_explorer.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG_JSON").unwrap_or_else(|_| EnvFilter::new("debug")),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!(error = %format!("{e:#}"), "Command failed");
        return Err(e);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        sources,
        format,
        command,
    } = cli;
    let mut stdout = std::io::stdout().lock();

    match command {
        Commands::Home => {
            let data = load(&sources)?;
            let home = home_view(&data);
            emit(&mut stdout, format, &home, || render_home(&home))?;
        }
        Commands::Map { district } => {
            let data = load(&sources)?;
            let selector = district_selector(&data.stations, &district)?;
            let map = map_view(&data, &selector)?;
            info!(district = %selector, points = map.points.len(), "Map data ready");
            emit(&mut stdout, format, &map, || render_map(&map))?;
        }
        Commands::Charts => {
            let data = load(&sources)?;
            let charts = charts_view(&data)?;
            emit(&mut stdout, format, &charts, || render_charts(&charts))?;
        }
        Commands::Districts => {
            let data = load(&sources)?;
            let options = district_options(&data.stations);
            emit(&mut stdout, format, &options, || render_districts(&options))?;
        }
        Commands::Feedback(FeedbackCommand::Submit { text, rating }) => {
            let entry = FeedbackEntry::new(text, Rating::new(rating)?);
            append_feedback(&sources.feedback_file, &entry)?;
            if format == Format::Json {
                write_json(&mut stdout, &entry)?;
            } else {
                writeln!(stdout, "Thank you for your feedback!")?;
            }
        }
        Commands::Feedback(FeedbackCommand::List) => {
            let entries = load_feedback(&sources.feedback_file)?;
            emit(&mut stdout, format, &entries, || render_feedback(&entries))?;
        }
    }

    Ok(())
}

fn load(sources: &Sources) -> Result<Datasets> {
    Datasets::load(&sources.stations, &sources.deployments)
}

fn emit<T: Serialize>(
    out: &mut impl Write,
    format: Format,
    value: &T,
    render: impl FnOnce() -> String,
) -> Result<()> {
    match format {
        Format::Json => write_json(out, value),
        Format::Text => Ok(out.write_all(render().as_bytes())?),
    }
}
