use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scanner::Position;

/// A tracked device and its most recent per-anchor RSSI samples.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Device {
    pub mac: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_seen: DateTime<Utc>,
    /// one reading per anchor access point, in anchor order
    pub rssi: Vec<i32>,
}

/// A device's estimated position joined with its user-assigned tag.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DevicePosition {
    pub mac: String,
    pub position: Position,
    pub tag: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_seen: DateTime<Utc>,
}

/// A distance measurement against a positioned anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub position: Position,
    /// estimated distance to the device, in the floor plan's units
    pub distance: f64,
}
