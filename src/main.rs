//! CLI entry point for the eGauge daily report.
//!
//! `report` fetches yesterday's readings, renders them and hands the result to
//! stdout, a file or email. `window` shows which feed rows today's report
//! would request.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use egauge_report::{
    config::ReportConfig,
    deliver::{Target, deliver_or_save, select_sink},
    fetch::{BasicClient, FeedSource, feed_url},
    output::OutputFormat,
    report::generate_report,
    window::ReportWindow,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "egauge_report")]
#[command(about = "Daily energy usage and generation report from an eGauge meter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the report for yesterday and deliver it
    Report {
        /// eGauge `egauge-show` URL, or a saved CSV export
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Document format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,

        /// Write the document to this file instead of stdout
        #[arg(short, long, conflicts_with = "email")]
        output: Option<String>,

        /// Send the document by email (needs SMTP_* and MAIL_* settings)
        #[arg(long, default_value_t = false)]
        email: bool,

        /// JSON config file; environment variables are used when absent
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Show the request window for today's report
    Window {
        /// Optional eGauge URL to print the full request for
        #[arg(value_name = "URL")]
        source: Option<String>,

        /// JSON config file; environment variables are used when absent
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/egauge_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("egauge_report.log"));

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
        Commands::Report {
            source,
            format,
            output,
            email,
            config,
        } => {
            let cfg = load_config(config.as_deref())?;
            let zone = cfg.report_zone()?;

            let target = if email {
                Target::Email
            } else if let Some(path) = output {
                Target::File(path)
            } else {
                Target::Console
            };
            let sink = select_sink(target, cfg.mail.as_ref())
                .context("delivery settings are invalid")?;

            let client = BasicClient::new()?;
            let report = generate_report(
                &client,
                &FeedSource::parse(&source),
                &cfg,
                &zone,
                Utc::now(),
                format,
            )
            .await
            .context("could not build the report")?;

            let undelivered_dir =
                std::env::var("UNDELIVERED_DIR").unwrap_or_else(|_| "undelivered".to_string());
            if let Err(e) = deliver_or_save(sink.as_ref(), &report, &undelivered_dir).await {
                if e.saved_to.is_none() {
                    eprintln!("{}", e.document);
                }
                return Err(anyhow::Error::new(e).context("report was built but could not be delivered"));
            }
        }
        Commands::Window { source, config } => {
            let cfg = load_config(config.as_deref())?;
            let zone = cfg.report_zone()?;
            let window = ReportWindow::ending_at_midnight(Utc::now(), &zone);

            info!(
                zone = %zone.name(),
                report_day = %window.report_day,
                first = window.first_row(),
                first_utc = %window.first,
                hours = cfg.hours,
                "Report window"
            );

            if let Some(base) = source {
                let url = feed_url(&base, window.first_row(), cfg.hours)?;
                info!(%url, "Feed request");
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<ReportConfig> {
    match path {
        Some(path) => ReportConfig::load(path),
        None => ReportConfig::from_env(),
    }
}
