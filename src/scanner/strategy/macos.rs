use std::time::Duration;

use log::info;

use super::exec::run_command;
use crate::{error::ScanError, scanner::model::Network};

const AIRPORT: &str =
    "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport";

// the legacy tools do not report frequency / always-on RSSI, so fill in
// plausible 2.4 GHz defaults
const DEFAULT_FREQUENCY: u32 = 2437;
const DEFAULT_RSSI: i32 = -50;

/// Scans through the legacy wireless diagnostic tools, trying several
/// methods since none of them is reliable across OS releases.
pub struct MacStrategy {
    timeout: Duration,
}

impl MacStrategy {
    pub fn new(timeout: Duration) -> Self {
        MacStrategy { timeout }
    }

    /// Method order: `airport -s` scan, then the current-network query
    /// merged in (the scan can omit the joined network), then a
    /// `system_profiler` dump when everything else came back empty.
    /// Produces an empty list, not an error, when all methods fail.
    pub async fn scan(&self) -> Result<Vec<Network>, ScanError> {
        let mut networks = Vec::new();

        match run_command(AIRPORT, &["-s"], self.timeout).await {
            Ok(output) => networks = parse_airport_scan(&output),
            Err(e) => info!("airport scan failed, trying alternatives: {e}"),
        }

        match run_command(AIRPORT, &["-I"], self.timeout).await {
            Ok(output) => {
                if let Some(current) = parse_current_network(&output) {
                    merge_current_network(&mut networks, current);
                }
            }
            Err(e) => info!("current network query failed: {e}"),
        }

        if networks.is_empty() {
            match run_command("system_profiler", &["SPAirPortDataType"], self.timeout).await
            {
                Ok(output) => networks = parse_system_profiler(&output),
                Err(e) => info!("system_profiler failed: {e}"),
            }
        }

        Ok(networks)
    }
}

/// `airport -s` prints a header line followed by whitespace-separated
/// columns `SSID BSSID RSSI ...`. An SSID of `--` means hidden.
pub(crate) fn parse_airport_scan(output: &str) -> Vec<Network> {
    let mut networks = Vec::new();

    for line in output.lines().skip(1) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            continue;
        }

        let ssid = parts[0];
        let bssid = parts[1];
        let Ok(rssi) = parts[2].parse::<i32>() else {
            continue;
        };
        if ssid.is_empty() || bssid.is_empty() {
            continue;
        }

        networks.push(Network {
            ssid: (ssid != "--").then(|| ssid.to_string()),
            bssid: bssid.to_string(),
            signal_level: rssi,
            frequency: DEFAULT_FREQUENCY,
            current: false,
        });
    }

    networks
}

/// `airport -I` describes the joined network as indented `label: value`
/// lines. Returns `None` when no network is joined.
pub(crate) fn parse_current_network(output: &str) -> Option<Network> {
    let mut ssid = None;
    let mut bssid = None;
    let mut rssi = None;

    for line in output.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("BSSID:") {
            bssid = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("SSID:") {
            ssid = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("agrCtlRSSI:") {
            rssi = value.trim().parse::<i32>().ok();
        }
    }

    Some(Network {
        ssid: Some(ssid?),
        bssid: bssid?,
        signal_level: rssi.unwrap_or(DEFAULT_RSSI),
        frequency: DEFAULT_FREQUENCY,
        current: true,
    })
}

/// The joined network replaces its scanned duplicate and goes first, so it
/// is represented even when the scan omits it.
pub(crate) fn merge_current_network(networks: &mut Vec<Network>, current: Network) {
    networks.retain(|n| n.bssid != current.bssid);
    networks.insert(0, current);
}

/// `system_profiler SPAirPortDataType` lists networks as blocks of
/// `label: value` lines; consecutive `Network Name:` / `MAC Address:`
/// pairs are grouped into one record. Blocks without a MAC are dropped,
/// a network without an identity key is unusable downstream.
pub(crate) fn parse_system_profiler(output: &str) -> Vec<Network> {
    fn flush(
        name: &mut Option<String>,
        mac: &mut Option<String>,
        networks: &mut Vec<Network>,
    ) {
        if let (Some(ssid), Some(bssid)) = (name.take(), mac.take()) {
            networks.push(Network {
                ssid: Some(ssid),
                bssid,
                signal_level: DEFAULT_RSSI,
                frequency: DEFAULT_FREQUENCY,
                current: false,
            });
        }
    }

    let mut networks = Vec::new();
    let mut name: Option<String> = None;
    let mut mac: Option<String> = None;

    for line in output.lines() {
        if let Some((_, value)) = line.split_once("Network Name:") {
            flush(&mut name, &mut mac, &mut networks);
            name = Some(value.trim().to_string());
        } else if let Some((_, value)) = line.split_once("MAC Address:") {
            mac = Some(value.trim().to_string());
        }
    }
    flush(&mut name, &mut mac, &mut networks);

    networks
}
