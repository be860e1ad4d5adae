mod config;
mod constants;
mod error;
mod helper;
mod scanner;
mod store;
mod tasks;
mod tracker;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use crate::{
    config::CONFIG,
    scanner::{WiFiScanner, strategy::Strategy},
    tasks::{scan::ScannerMessage, track::TrackerMessage},
    tracker::{DeviceTracker, SyntheticSource},
};

/// Command line interface parser.
#[derive(Debug, Parser)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

/// Subcommands of the cli parser
#[derive(Debug, Subcommand)]
enum Command {
    /// Run the periodic network scanner and device tracker
    Serve,
    /// Run one scan cycle and print the visible networks
    Scan,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(path) = cli.config {
        config::set_path(path);
    }
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&CONFIG.app.log_level));

    match cli.command {
        Command::Serve => serve().await?,
        Command::Scan => scan_once().await?,
    };

    Ok(())
}

async fn serve() -> Result<()> {
    let strategy = Strategy::detect(Duration::from_secs(CONFIG.scanner.command_timeout));
    let scanner = WiFiScanner::new(
        strategy,
        CONFIG.scanner.laa_filter,
        CONFIG.scanner.store_path.clone(),
    );
    let (tx_scan, rx_scan) = flume::unbounded::<ScannerMessage>();
    let scan_handle = tasks::scan::scan_task(scanner, rx_scan, CONFIG.scanner.scan_frequency);

    let tracker = DeviceTracker::new(
        CONFIG.tracker.tx_power,
        CONFIG.tracker.path_loss_exponent,
        CONFIG.tracker.store_path.clone(),
    );
    let (tx_track, rx_track) = flume::unbounded::<TrackerMessage>();
    let track_handle = tasks::track::track_task(
        tracker,
        Box::new(SyntheticSource),
        rx_track,
        tx_scan.clone(),
    );
    let refresh_handle =
        tasks::track::refresh_task(tx_track.clone(), CONFIG.tracker.refresh_frequency);

    info!(
        "hometrack started: scanning every {}s, refreshing devices every {}s",
        CONFIG.scanner.scan_frequency, CONFIG.tracker.refresh_frequency
    );

    wait_for_shutdown().await;

    refresh_handle.abort();
    track_handle.abort();
    scan_handle.abort();
    info!("hometrack stopped");

    Ok(())
}

async fn scan_once() -> Result<()> {
    let strategy = Strategy::detect(Duration::from_secs(CONFIG.scanner.command_timeout));
    let mut scanner = WiFiScanner::new(
        strategy,
        CONFIG.scanner.laa_filter,
        CONFIG.scanner.store_path.clone(),
    );
    scanner.initialize().await;

    let networks = scanner.scan_networks().await;
    println!("{}", serde_json::to_string_pretty(&networks)?);

    Ok(())
}

async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigquit = signal(SignalKind::quit()).unwrap();
        let mut sigterm = signal(SignalKind::terminate()).unwrap();
        let mut sigint = signal(SignalKind::interrupt()).unwrap();

        tokio::select! {
            _ = sigquit.recv() => info!("SIGQUIT received"),
            _ = sigterm.recv() => info!("SIGTERM received"),
            _ = sigint.recv() => info!("SIGINT received"),
        }
    }

    #[cfg(not(unix))]
    {
        use tokio::signal::windows::*;

        let mut sigbreak = ctrl_break().unwrap();
        let mut sigint = ctrl_c().unwrap();
        let mut sigquit = ctrl_close().unwrap();
        let mut sigterm = ctrl_shutdown().unwrap();

        tokio::select! {
            _ = sigbreak.recv() => info!("ctrl-break received"),
            _ = sigquit.recv() => info!("ctrl-c received"),
            _ = sigterm.recv() => info!("ctrl-close received"),
            _ = sigint.recv() => info!("ctrl-shutdown received"),
        }
    }
}
