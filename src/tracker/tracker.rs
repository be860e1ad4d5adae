//! Device position estimation: RSSI to distance through the log-distance
//! path loss model, 2D position from three anchor distances by
//! trilateration.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use log::{error, warn};

use crate::{
    constants::{DEFAULT_DEVICE_TAG, DEGENERACY_EPSILON},
    error::TrackError,
    scanner::{AccessPoint, Position},
    store::{self, devices::DeviceStore},
    tracker::{
        model::{Anchor, Device, DevicePosition},
        source::DeviceSample,
    },
};

pub struct DeviceTracker {
    devices: HashMap<String, Device>,
    /// last successful estimate per device MAC
    positions: HashMap<String, Position>,
    /// user-assigned labels per device MAC
    tags: HashMap<String, String>,
    tx_power: f64,
    path_loss_exponent: f64,
    store_path: PathBuf,
}

impl DeviceTracker {
    pub fn new(tx_power: f64, path_loss_exponent: f64, store_path: PathBuf) -> Self {
        DeviceTracker {
            devices: HashMap::new(),
            positions: HashMap::new(),
            tags: HashMap::new(),
            tx_power,
            path_loss_exponent,
            store_path,
        }
    }

    /// Load persisted tags and positions; missing or unreadable stores
    /// start the tracker empty.
    pub async fn initialize(&mut self) {
        let store = store::devices::load(&self.store_path).await;
        self.tags = store.tags;
        self.positions = store.positions;
    }

    /// Record a fresh sample for a device and re-estimate its position
    /// against the given anchors.
    pub fn observe(&mut self, sample: DeviceSample, access_points: &[AccessPoint]) {
        self.devices.insert(
            sample.mac.clone(),
            Device {
                mac: sample.mac.clone(),
                last_seen: Utc::now(),
                rssi: sample.rssi.clone(),
            },
        );
        self.update_device_position(&sample.mac, access_points, &sample.rssi);
    }

    /// Convert the per-anchor RSSI vector into distances (zipped with the
    /// anchors by index), solve, and overwrite the stored estimate on
    /// success. Too few anchors keep the previous estimate; degenerate
    /// anchor geometry is reported and skipped rather than producing NaN.
    pub fn update_device_position(
        &mut self,
        mac: &str,
        access_points: &[AccessPoint],
        rssi_values: &[i32],
    ) {
        let anchors: Vec<Anchor> = access_points
            .iter()
            .zip(rssi_values)
            .map(|(ap, &rssi)| Anchor {
                position: ap.position,
                distance: self.calculate_distance(rssi),
            })
            .collect();

        match trilaterate(&anchors) {
            Ok(Some(position)) => {
                self.positions.insert(mac.to_string(), position);
            }
            Ok(None) => {}
            Err(TrackError::DegenerateGeometry) => {
                warn!("degenerate anchor geometry for {mac}, keeping previous estimate");
            }
        }
    }

    /// Distance for one RSSI reading under this tracker's model settings.
    pub fn calculate_distance(&self, rssi: i32) -> f64 {
        calculate_distance(rssi, self.tx_power, self.path_loss_exponent)
    }

    /// Devices seen in recent detection cycles.
    pub fn devices(&self) -> Vec<Device> {
        self.devices.values().cloned().collect()
    }

    /// One record per estimated position, joined with the device tag and
    /// last-seen time. Devices never observed in this run report "now".
    pub fn device_positions(&self) -> Vec<DevicePosition> {
        self.positions
            .iter()
            .map(|(mac, &position)| DevicePosition {
                mac: mac.clone(),
                position,
                tag: self
                    .tags
                    .get(mac)
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_DEVICE_TAG.to_string()),
                last_seen: self
                    .devices
                    .get(mac)
                    .map(|device| device.last_seen)
                    .unwrap_or_else(Utc::now),
            })
            .collect()
    }

    /// Replace the tag map and persist tags and positions together.
    /// Returns false when the store write fails.
    pub async fn save_device_tags(&mut self, tags: HashMap<String, String>) -> bool {
        self.tags = tags;
        let store = DeviceStore {
            tags: self.tags.clone(),
            positions: self.positions.clone(),
        };
        match store::devices::save(&self.store_path, &store).await {
            Ok(()) => true,
            Err(err) => {
                error!("save device store {}: {:#}", self.store_path.display(), err);
                false
            }
        }
    }
}

/// Log-distance path loss model:
/// `distance = 10^((tx_power - rssi) / (10 * path_loss_exponent))`.
///
/// Pathological inputs (an RSSI far above the reference power) overflow
/// towards infinity; callers feed measured dBm values where that cannot
/// happen.
pub fn calculate_distance(rssi: i32, tx_power: f64, path_loss_exponent: f64) -> f64 {
    10f64.powf((tx_power - rssi as f64) / (10.0 * path_loss_exponent))
}

/// Solve the two-equation linear reduction of the three-circle system:
/// subtracting circle 1 from circle 2 and circle 2 from circle 3 cancels
/// the quadratic terms, leaving a 2x2 linear system in x and y.
///
/// Uses the first three anchors, ignoring any excess. Fewer than three
/// anchors yield `Ok(None)`; collinear or duplicated anchor positions
/// make the determinant vanish and are reported as degenerate instead of
/// letting NaN escape. The result inherits the first anchor's floor.
pub fn trilaterate(anchors: &[Anchor]) -> Result<Option<Position>, TrackError> {
    let [first, second, third] = match anchors {
        [first, second, third, ..] => [first, second, third],
        _ => return Ok(None),
    };

    let (x1, y1, r1) = (first.position.x, first.position.y, first.distance);
    let (x2, y2, r2) = (second.position.x, second.position.y, second.distance);
    let (x3, y3, r3) = (third.position.x, third.position.y, third.distance);

    let a = 2.0 * (x2 - x1);
    let b = 2.0 * (y2 - y1);
    let c = r1 * r1 - r2 * r2 - x1 * x1 + x2 * x2 - y1 * y1 + y2 * y2;
    let d = 2.0 * (x3 - x2);
    let e = 2.0 * (y3 - y2);
    let f = r2 * r2 - r3 * r3 - x2 * x2 + x3 * x3 - y2 * y2 + y3 * y3;

    let denominator = e * a - b * d;
    if denominator.abs() < DEGENERACY_EPSILON {
        return Err(TrackError::DegenerateGeometry);
    }

    let x = (c * e - f * b) / denominator;
    let y = (a * f - d * c) / denominator;

    Ok(Some(Position {
        x,
        y,
        floor: first.position.floor,
    }))
}
