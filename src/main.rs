//! Visitor Watch - building-access visitor notifications
//!
//! Replays a visit script through the publisher and prints the notices and
//! end-of-period reports each subscriber produces.
//!
//! Module structure:
//! - `domain/` - Core business types (VisitorRecord, Employee, ids)
//! - `io/` - Presentation (notices, reports, console output)
//! - `services/` - Business logic (Publisher, subscribers, Session)
//! - `infra/` - Infrastructure (Config, Metrics)

use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;
use visitor_watch::infra::{Config, Metrics};
use visitor_watch::io::{ConsolePresenter, OutputFormat};
use visitor_watch::services::Session;

/// Visitor Watch - notify points of contact and security about visitors
#[derive(Parser, Debug)]
#[command(name = "visitor-watch", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "CONFIG_FILE", default_value = "config/dev.toml")]
    config: String,

    /// Output format for notices and reports (overrides [report] format)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only notices and reports.
    // Default: INFO, use RUST_LOG=debug for per-subscriber detail
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("visitor-watch starting");

    let args = Args::parse();

    let mut config = Config::load_from_path(&args.config);
    if let Some(format) = args.format {
        config = config.with_report_format(format);
    }

    info!(
        config_file = %config.config_file(),
        site_id = %config.site_id(),
        report_format = %config.report_format().as_str(),
        employees = %config.employees().len(),
        security_enabled = %config.security_enabled(),
        script_steps = %config.script().len(),
        "config_loaded"
    );

    let presenter = Arc::new(ConsolePresenter::stdout(config.report_format()));
    let metrics = Arc::new(Metrics::new());
    let session = Session::new(&config, presenter, metrics);

    let applied = session.replay(config.script())?;
    info!(steps = %applied, "script_replayed");

    let summary = session.finish()?;
    summary.log();

    info!("visitor-watch stopped");
    Ok(())
}
