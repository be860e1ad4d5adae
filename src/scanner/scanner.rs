//! Scan orchestration: runs the platform strategy, degrades to mock data,
//! classifies likely anchors and keeps their configured positions.

use std::collections::HashMap;
use std::path::PathBuf;

use log::{error, warn};

use crate::{
    constants::{ANCHOR_SSID_HINTS, MAX_ACCESS_POINTS, STRONG_DBM, STRONG_QUALITY_PERCENT},
    error::ScanError,
    helper::macaddr::MacAddr,
    scanner::{
        model::{AccessPoint, Network, Position},
        strategy::{Strategy, mock_networks},
    },
    store,
};

pub struct WiFiScanner {
    strategy: Strategy,
    networks: Vec<Network>,
    access_points: Vec<AccessPoint>,
    /// persisted anchor positions, keyed by BSSID
    positions: HashMap<String, Position>,
    laa_filter: bool,
    store_path: PathBuf,
}

impl WiFiScanner {
    pub fn new(strategy: Strategy, laa_filter: bool, store_path: PathBuf) -> Self {
        WiFiScanner {
            strategy,
            networks: Vec::new(),
            access_points: Vec::new(),
            positions: HashMap::new(),
            laa_filter,
            store_path,
        }
    }

    /// Load persisted anchor positions. A missing or unreadable store
    /// starts the scanner with an empty map.
    pub async fn initialize(&mut self) {
        self.positions = store::access_points::load(&self.store_path).await;
    }

    /// Run one scan cycle: invoke the platform strategy, fall back to the
    /// mock set, replace the working set and reclassify anchors.
    pub async fn scan_networks(&mut self) -> Vec<Network> {
        let result = self.strategy.scan().await;
        self.networks = resolve_scan(result);
        self.identify_access_points();
        self.networks.clone()
    }

    /// Networks from the most recent scan cycle.
    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    /// Anchors classified in the most recent scan cycle.
    pub fn access_points(&self) -> &[AccessPoint] {
        &self.access_points
    }

    /// Replace the persisted anchor position map and refresh the current
    /// anchor set from it. Returns false when the store write fails.
    pub async fn save_access_point_positions(
        &mut self,
        positions: HashMap<String, Position>,
    ) -> bool {
        if let Err(err) = store::access_points::save(&self.store_path, &positions).await {
            error!(
                "save access point store {}: {:#}",
                self.store_path.display(),
                err
            );
            return false;
        }

        self.positions = positions;
        for ap in &mut self.access_points {
            ap.position = self
                .positions
                .get(&ap.network.bssid)
                .copied()
                .unwrap_or_default();
        }
        true
    }

    /// Pick the networks that can serve as trilateration anchors: strong
    /// signal or a router-ish SSID, scan order preserved, at most
    /// [`MAX_ACCESS_POINTS`]. Deliberately permissive, the position
    /// editor lets a human curate the final set.
    fn identify_access_points(&mut self) {
        self.access_points = self
            .networks
            .iter()
            .filter(|n| self.is_anchor_candidate(n))
            .take(MAX_ACCESS_POINTS)
            .map(|n| AccessPoint {
                network: n.clone(),
                position: self
                    .positions
                    .get(&n.bssid)
                    .copied()
                    .unwrap_or_default(),
            })
            .collect();
    }

    fn is_anchor_candidate(&self, network: &Network) -> bool {
        if self.laa_filter && is_locally_administered(&network.bssid) {
            return false;
        }
        is_strong(network.signal_level) || has_anchor_ssid(network.ssid.as_deref())
    }
}

/// The single fallback rule: a failed scan and an empty scan degrade the
/// same way, to the mock set. The mock set itself cannot fail, so there
/// is never a second fallback step.
pub(crate) fn resolve_scan(result: Result<Vec<Network>, ScanError>) -> Vec<Network> {
    match result {
        Ok(networks) if !networks.is_empty() => networks,
        Ok(_) => {
            warn!("platform scan produced no networks, falling back to mock data");
            mock_networks()
        }
        Err(err) => {
            warn!("platform scan failed, falling back to mock data: {err}");
            mock_networks()
        }
    }
}

/// Strong means above 50 when the value is a quality percent (> 0) and
/// above -65 dBm otherwise, strictly in both cases.
fn is_strong(signal_level: i32) -> bool {
    if signal_level > 0 {
        signal_level > STRONG_QUALITY_PERCENT
    } else {
        signal_level > STRONG_DBM
    }
}

fn has_anchor_ssid(ssid: Option<&str>) -> bool {
    let Some(ssid) = ssid else {
        return false;
    };
    let ssid = ssid.to_lowercase();
    ANCHOR_SSID_HINTS.iter().any(|hint| ssid.contains(hint))
}

fn is_locally_administered(bssid: &str) -> bool {
    bssid
        .parse::<MacAddr>()
        .map(|mac| mac.is_local())
        .unwrap_or(false)
}
