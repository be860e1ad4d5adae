use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};

// RSSI at 1m from the transmitter, reference power of the path loss model
pub const DEFAULT_TX_POWER: f64 = -59.0;
// 2 for free space, higher indoors
pub const DEFAULT_PATH_LOSS_EXPONENT: f64 = 2.0;

// signal strength above which a network counts as a likely anchor,
// strict '>' in both unit systems
pub const STRONG_QUALITY_PERCENT: i32 = 50;
pub const STRONG_DBM: i32 = -65;

// SSID fragments that mark a network as a likely fixed access point
pub const ANCHOR_SSID_HINTS: &'static [&'static str] = &["xfinity", "home", "wifi", "pod"];

// anchors kept per scan cycle
pub const MAX_ACCESS_POINTS: usize = 5;

pub const HIDDEN_SSID: &str = "Hidden Network";
pub const DEFAULT_DEVICE_TAG: &str = "Unknown Device";

// trilateration denominators below this magnitude are degenerate
pub const DEGENERACY_EPSILON: f64 = 1e-9;

/// Host platform as reported by `std::env::consts::OS`.
#[derive(Debug, Clone, Copy, PartialEq, Display, EnumString, IntoStaticStr, AsRefStr)]
pub enum Platform {
    #[strum(serialize = "linux")]
    Linux,
    #[strum(serialize = "macos")]
    MacOs,
    #[strum(serialize = "other")]
    Other,
}
