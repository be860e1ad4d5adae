//! Tracker actor: owns the [`DeviceTracker`] and the acquisition source,
//! refreshes device samples on a schedule and answers UI requests.

use std::collections::HashMap;

use log::{error, info};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_schedule::Job;

use crate::{
    tasks::scan::{self, ScannerMessage},
    tracker::{Device, DevicePosition, DeviceTracker, RssiSource},
};

#[derive(Debug)]
pub enum TrackerMessage {
    /// Pull a sample batch from the acquisition source and re-estimate
    /// positions against the current anchors.
    Refresh,
    /// Devices seen in recent detection cycles.
    GetDevices {
        tx: oneshot::Sender<Vec<Device>>,
    },
    /// Estimated positions joined with tags.
    GetDevicePositions {
        tx: oneshot::Sender<Vec<DevicePosition>>,
    },
    /// Replace and persist the device tag map.
    SaveTags {
        tags: HashMap<String, String>,
        tx: oneshot::Sender<bool>,
    },
}

/// Spawn the tracker actor. Anchors are requested from the scanner task
/// on every refresh so both working sets stay single-writer.
pub fn track_task(
    mut tracker: DeviceTracker,
    mut source: Box<dyn RssiSource>,
    rx: flume::Receiver<TrackerMessage>,
    tx_scanner: flume::Sender<ScannerMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracker.initialize().await;

        while let Ok(message) = rx.recv_async().await {
            match message {
                TrackerMessage::Refresh => {
                    let access_points = match scan::get_access_points(&tx_scanner).await {
                        Ok(access_points) => access_points,
                        Err(err) => {
                            error!("fetch anchors for device refresh: {}", err);
                            continue;
                        }
                    };
                    for sample in source.sample() {
                        tracker.observe(sample, &access_points);
                    }
                }
                TrackerMessage::GetDevices { tx } => {
                    let _ = tx.send(tracker.devices());
                }
                TrackerMessage::GetDevicePositions { tx } => {
                    let _ = tx.send(tracker.device_positions());
                }
                TrackerMessage::SaveTags { tags, tx } => {
                    let saved = tracker.save_device_tags(tags).await;
                    let _ = tx.send(saved);
                }
            }
        }
        info!("tracker channel closed, stopping track task");
    })
}

/// Periodically request a device refresh.
pub fn refresh_task(
    tx: flume::Sender<TrackerMessage>,
    refresh_frequency: u32,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio_schedule::every(refresh_frequency)
            .seconds()
            .perform(|| async {
                if let Err(err) = tx.send_async(TrackerMessage::Refresh).await {
                    error!("schedule device refresh: {}", err);
                }
            })
            .await;
    })
}

/// Devices seen in recent detection cycles.
pub async fn get_devices(
    tx: &flume::Sender<TrackerMessage>,
) -> Result<Vec<Device>, anyhow::Error> {
    request(tx, |reply| TrackerMessage::GetDevices { tx: reply }).await
}

/// Estimated positions joined with tags and last-seen times.
pub async fn get_device_positions(
    tx: &flume::Sender<TrackerMessage>,
) -> Result<Vec<DevicePosition>, anyhow::Error> {
    request(tx, |reply| TrackerMessage::GetDevicePositions { tx: reply }).await
}

/// Replace the persisted device tag map; false means the write failed.
pub async fn save_device_tags(
    tx: &flume::Sender<TrackerMessage>,
    tags: HashMap<String, String>,
) -> Result<bool, anyhow::Error> {
    request(tx, |reply| TrackerMessage::SaveTags { tags, tx: reply }).await
}

async fn request<T>(
    tx: &flume::Sender<TrackerMessage>,
    message: impl FnOnce(oneshot::Sender<T>) -> TrackerMessage,
) -> Result<T, anyhow::Error> {
    let (reply_tx, reply_rx) = oneshot::channel();
    tx.send_async(message(reply_tx))
        .await
        .map_err(|err| anyhow::anyhow!("send to track task: {}", err))?;
    reply_rx
        .await
        .map_err(|err| anyhow::anyhow!("receive from track task: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::{DEFAULT_PATH_LOSS_EXPONENT, DEFAULT_TX_POWER},
        scanner::{
            WiFiScanner,
            strategy::{MockStrategy, Strategy},
        },
        tasks::scan::scan_task,
        tracker::SyntheticSource,
    };

    async fn spawn_pair(
        dir: &tempfile::TempDir,
    ) -> (flume::Sender<ScannerMessage>, flume::Sender<TrackerMessage>) {
        let scanner = WiFiScanner::new(
            Strategy::Mock(MockStrategy),
            false,
            dir.path().join("access-points.json"),
        );
        let (tx_scan, rx_scan) = flume::unbounded();
        scan_task(scanner, rx_scan, 3600);
        // make sure a cycle ran so anchors exist
        scan::scan_networks(&tx_scan).await.unwrap();

        let tracker = DeviceTracker::new(
            DEFAULT_TX_POWER,
            DEFAULT_PATH_LOSS_EXPONENT,
            dir.path().join("devices.json"),
        );
        let (tx_track, rx_track) = flume::unbounded();
        track_task(tracker, Box::new(SyntheticSource), rx_track, tx_scan.clone());

        (tx_scan, tx_track)
    }

    #[tokio::test]
    async fn refresh_populates_devices_and_positions() {
        let dir = tempfile::tempdir().unwrap();
        let (_tx_scan, tx_track) = spawn_pair(&dir).await;

        tx_track.send_async(TrackerMessage::Refresh).await.unwrap();
        let devices = get_devices(&tx_track).await.unwrap();
        assert_eq!(devices.len(), 3);

        let positions = get_device_positions(&tx_track).await.unwrap();
        // mock anchors share the default position, the solve is degenerate
        // until a human assigns distinct anchor positions
        assert!(positions.is_empty());
    }

    #[tokio::test]
    async fn refresh_solves_once_anchors_are_placed() {
        let dir = tempfile::tempdir().unwrap();
        let (tx_scan, tx_track) = spawn_pair(&dir).await;

        let anchors = scan::get_access_points(&tx_scan).await.unwrap();
        let mut positions = HashMap::new();
        let spots = [(0.0, 0.0), (100.0, 0.0), (50.0, 86.6), (0.0, 100.0), (100.0, 100.0)];
        for (ap, &(x, y)) in anchors.iter().zip(spots.iter()) {
            positions.insert(
                ap.network.bssid.clone(),
                crate::scanner::Position { x, y, floor: 1 },
            );
        }
        assert!(
            scan::save_access_point_positions(&tx_scan, positions)
                .await
                .unwrap()
        );

        tx_track.send_async(TrackerMessage::Refresh).await.unwrap();
        let device_positions = get_device_positions(&tx_track).await.unwrap();
        assert_eq!(device_positions.len(), 3);
        assert!(
            device_positions
                .iter()
                .all(|p| p.position.x.is_finite() && p.position.y.is_finite())
        );
    }

    #[tokio::test]
    async fn tags_apply_to_positions() {
        let dir = tempfile::tempdir().unwrap();
        let (tx_scan, tx_track) = spawn_pair(&dir).await;

        let anchors = scan::get_access_points(&tx_scan).await.unwrap();
        let mut positions = HashMap::new();
        let spots = [(0.0, 0.0), (100.0, 0.0), (50.0, 86.6), (0.0, 100.0), (100.0, 100.0)];
        for (ap, &(x, y)) in anchors.iter().zip(spots.iter()) {
            positions.insert(
                ap.network.bssid.clone(),
                crate::scanner::Position { x, y, floor: 1 },
            );
        }
        scan::save_access_point_positions(&tx_scan, positions)
            .await
            .unwrap();
        tx_track.send_async(TrackerMessage::Refresh).await.unwrap();

        let mut tags = HashMap::new();
        tags.insert("00:11:22:33:44:55".to_string(), "Phone".to_string());
        assert!(save_device_tags(&tx_track, tags).await.unwrap());

        let device_positions = get_device_positions(&tx_track).await.unwrap();
        let phone = device_positions
            .iter()
            .find(|p| p.mac == "00:11:22:33:44:55")
            .unwrap();
        assert_eq!(phone.tag, "Phone");
        assert!(
            device_positions
                .iter()
                .filter(|p| p.mac != "00:11:22:33:44:55")
                .all(|p| p.tag == "Unknown Device")
        );
    }
}
