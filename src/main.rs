//! rustscore - headless crypto scoring service
//!
//! Polls the configured venue, scores every symbol of the watchlist, writes
//! the report table to the sheet sink and pushes signal changes to the
//! notifier. Runs once at start, then every `POLL_INTERVAL_SECS`.
//!
//! # Usage
//! ```sh
//! VENUE=coinbase SYMBOLS=BTC-USD,ETH-USD cargo run
//! cargo run -- --once --scoring-config scoring.toml
//! ```

use anyhow::Result;
use clap::Parser;
use rustscore::application::system::Application;
use rustscore::config::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::watch;
use tracing::{Level, error, info};
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "rustscore", version, about = "Technical-analysis scoring for crypto watchlists")]
struct Cli {
    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// TOML file with scoring weights, thresholds and indicator periods
    #[arg(long, value_name = "PATH")]
    scoring_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    info!("rustscore {} starting...", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(path) = &cli.scoring_config {
        config = config.with_scoring_file(path)?;
    }
    config.validate()?;
    info!(
        "Configuration loaded: venue={}, symbols={:?}, sink={}, notifier={}",
        config.exchange.venue,
        config.exchange.symbols,
        config.sink.kind(),
        config.notifier.kind()
    );

    let app = Application::build(config).await?;

    if cli.once {
        let report = app.runner.run_cycle().await;
        info!(
            "Single cycle finished: {} rows, {} skipped, sheet written: {}",
            report.reports.len(),
            report.skipped.len(),
            report.sheet_written
        );
        return Ok(());
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    let scheduler = app.scheduler(stop_rx);
    let handle = tokio::spawn(scheduler.run());

    info!("Scheduler running. Press Ctrl+C to shutdown.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, finishing the current cycle...");
    let _ = stop_tx.send(true);

    let cycles = handle.await?;
    info!("Stopped after {} cycles. Exiting...", cycles);
    Ok(())
}
