//! Models and functionality to work with the config file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use once_cell::sync::{Lazy, OnceCell};
use serde::Deserialize;

use crate::constants::{DEFAULT_PATH_LOSS_EXPONENT, DEFAULT_TX_POWER};

static CONFIG_PATH: OnceCell<PathBuf> = OnceCell::new();

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    let path = CONFIG_PATH
        .get()
        .map(PathBuf::as_path)
        .unwrap_or(Path::new("config.toml"));
    let config = load_config(path);
    match config {
        Ok(c) => c,
        Err(err) => panic!("{:?}", err),
    }
});

/// Override the config file location. Must be called before the first
/// access to [`CONFIG`]; later calls are ignored.
pub fn set_path(path: PathBuf) {
    let _ = CONFIG_PATH.set(path);
}

/// Rust representation of the configuration
#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    /// Application-wide settings
    pub app: App,
    /// WiFi scanner settings
    pub scanner: Scanner,
    /// Device tracker settings
    pub tracker: Tracker,
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    /// application logging level
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Scanner {
    /// seconds between scan cycles
    pub scan_frequency: u32,
    /// upper bound in seconds for a single scan tool invocation
    pub command_timeout: u64,
    /// exclude Locally Administered Addresses from anchor selection
    pub laa_filter: bool,
    /// access point position store
    pub store_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Tracker {
    /// seconds between device sample refreshes
    pub refresh_frequency: u32,
    /// reference power of the path loss model, dBm at 1m
    #[serde(default = "default_tx_power")]
    pub tx_power: f64,
    /// environment-dependent path loss exponent
    #[serde(default = "default_path_loss_exponent")]
    pub path_loss_exponent: f64,
    /// device tag and position store
    pub store_path: PathBuf,
}

fn default_tx_power() -> f64 {
    DEFAULT_TX_POWER
}

fn default_path_loss_exponent() -> f64 {
    DEFAULT_PATH_LOSS_EXPONENT
}

pub fn load_config(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path).context("Failed to read config")?;
    let config = toml::from_str(&data).context("Failed to parse config")?;
    Ok(config)
}
