use serde::{Deserialize, Serialize};

use crate::constants::HIDDEN_SSID;

/// A WiFi network seen in one scan cycle. The BSSID is the identity key;
/// two records with the same BSSID within a cycle describe the same radio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Network {
    /// `None` for networks that do not broadcast an SSID
    pub ssid: Option<String>,
    pub bssid: String,
    /// dBm (<= 0) or a 0-100 quality percent (> 0), depending on the source
    pub signal_level: i32,
    /// MHz
    pub frequency: u32,
    /// the network the host is currently joined to
    #[serde(default)]
    pub current: bool,
}

impl Network {
    /// Human-readable SSID, with a placeholder for hidden networks.
    pub fn display_name(&self) -> &str {
        self.ssid.as_deref().unwrap_or(HIDDEN_SSID)
    }
}

/// A 2D pixel position on a floor plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub floor: i32,
}

impl Default for Position {
    fn default() -> Self {
        Position {
            x: 0.0,
            y: 0.0,
            floor: 1,
        }
    }
}

/// A network classified as a likely fixed anchor, with its configured
/// position. Recomputed every scan cycle; the position survives cycles
/// through the persisted store.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccessPoint {
    #[serde(flatten)]
    pub network: Network,
    pub position: Position,
}
