//! Santa Tracker - Entry Point
//!
//! Boots all six simulators, drains their telemetry in the background and
//! logs a status summary until Ctrl-C or `--run-for` expires.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::time;

use santa_tracker::core::config::TrackerConfig;
use santa_tracker::core::error::Result;
use santa_tracker::core::types::Mode;
use santa_tracker::simulation::{SantaTracker, TrackerSummary};
use santa_tracker::telemetry::{spawn_exporter, ChannelSink, Telemetry};

/// Time-compressed Christmas Eve simulation
#[derive(Parser, Debug)]
#[command(name = "santa-tracker")]
#[command(about = "Run the sleigh, reindeer, workshop, delivery, weather and incident simulators")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Run the route-planning scenario instead of Christmas Eve
    #[arg(long)]
    planning: bool,

    /// Stop after this many seconds (runs until Ctrl-C when absent)
    #[arg(long)]
    run_for: Option<u64>,

    /// Seconds between status summaries
    #[arg(long, default_value_t = 10)]
    report_every: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.planning {
        config.mode = Mode::Planning;
    }
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!(mode = config.mode.label(), seed = ?config.seed, "Santa Tracker starting");

    let (sink, rx) = ChannelSink::new(config.telemetry_buffer);
    let exporter = spawn_exporter(rx);
    let tracker = SantaTracker::new(&config, Telemetry::new(Arc::new(sink)));
    tracker.start_all()?;

    let mut report = time::interval(Duration::from_secs(args.report_every.max(1)));
    report.tick().await;

    let deadline = async {
        match args.run_for {
            Some(secs) => time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut deadline => {
                tracing::info!("run time elapsed");
                break;
            }
            result = &mut shutdown => {
                if let Err(err) = result {
                    tracing::error!(error = %err, "failed to listen for Ctrl-C");
                }
                tracing::info!("shutdown requested");
                break;
            }
            _ = report.tick() => log_summary(&tracker.summary()),
        }
    }

    tracker.stop_all();
    log_summary(&tracker.summary());
    drop(tracker);

    // Aborted tick tasks release their senders asynchronously
    match time::timeout(Duration::from_secs(2), exporter).await {
        Ok(Ok(stats)) => tracing::info!(events = stats.events, metrics = stats.metrics, "telemetry drained"),
        Ok(Err(err)) => tracing::warn!(error = %err, "telemetry exporter failed"),
        Err(_) => tracing::warn!("telemetry exporter did not finish in time"),
    }

    Ok(())
}

fn log_summary(summary: &TrackerSummary) {
    tracing::info!(
        next_stop = %summary.sleigh.next_stop,
        fuel = %format!("{:.1}", summary.sleigh.magic_fuel_level),
        speed = %format!("{:.2}", summary.sleigh.speed),
        "sleigh"
    );
    tracing::info!(
        energy = %format!("{:.1}", summary.reindeer.average_energy),
        morale = %format!("{:.1}", summary.reindeer.average_morale),
        "reindeer"
    );
    tracing::info!(
        shift = ?summary.workshop.current_shift,
        rate = summary.workshop.production_rate,
        toys = summary.workshop.inventory.toys.round(),
        "workshop"
    );
    tracing::info!(
        delivered = summary.delivery.total_gifts_delivered,
        region = %summary.delivery.current_region,
        countries = summary.delivery.countries_visited,
        "delivery"
    );
    tracing::info!(
        location = %summary.weather.location,
        severity = ?summary.weather.severity,
        "weather"
    );
    tracing::info!(
        active = summary.incidents.active,
        total = summary.incidents.total,
        "incidents"
    );
}
