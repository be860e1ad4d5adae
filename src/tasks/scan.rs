//! Scanner actor: owns the [`WiFiScanner`] working sets, drives periodic
//! scan cycles and answers requests from other tasks and the UI layer.

use std::collections::HashMap;
use std::time::Duration;

use log::info;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::scanner::{AccessPoint, Network, Position, WiFiScanner};

#[derive(Debug)]
pub enum ScannerMessage {
    /// Run a scan cycle immediately and reply with the fresh network list.
    ScanNow {
        tx: oneshot::Sender<Vec<Network>>,
    },
    /// Networks from the most recent cycle.
    GetNetworks {
        tx: oneshot::Sender<Vec<Network>>,
    },
    /// Anchors classified in the most recent cycle.
    GetAccessPoints {
        tx: oneshot::Sender<Vec<AccessPoint>>,
    },
    /// Replace and persist the anchor position map.
    SavePositions {
        positions: HashMap<String, Position>,
        tx: oneshot::Sender<bool>,
    },
}

/// Spawn the scanner actor. The scanner state has exactly one writer (this
/// task), and scan cycles run inside the message loop, so two scans can
/// never overlap; a timer tick that lands while a scan is still running is
/// skipped rather than queued.
pub fn scan_task(
    mut scanner: WiFiScanner,
    rx: flume::Receiver<ScannerMessage>,
    scan_frequency: u32,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        scanner.initialize().await;

        let mut interval = interval(Duration::from_secs(scan_frequency as u64));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    scanner.scan_networks().await;
                }
                message = rx.recv_async() => {
                    match message {
                        Err(_) => {
                            // every handle dropped, nothing left to serve
                            info!("scanner channel closed, stopping scan task");
                            break;
                        }
                        Ok(ScannerMessage::ScanNow { tx }) => {
                            let networks = scanner.scan_networks().await;
                            let _ = tx.send(networks);
                        }
                        Ok(ScannerMessage::GetNetworks { tx }) => {
                            let _ = tx.send(scanner.networks().to_vec());
                        }
                        Ok(ScannerMessage::GetAccessPoints { tx }) => {
                            let _ = tx.send(scanner.access_points().to_vec());
                        }
                        Ok(ScannerMessage::SavePositions { positions, tx }) => {
                            let saved = scanner.save_access_point_positions(positions).await;
                            let _ = tx.send(saved);
                        }
                    }
                }
            }
        }
    })
}

/// Trigger a scan cycle and wait for its result.
pub async fn scan_networks(
    tx: &flume::Sender<ScannerMessage>,
) -> Result<Vec<Network>, anyhow::Error> {
    request(tx, |reply| ScannerMessage::ScanNow { tx: reply }).await
}

/// Networks from the most recent scan cycle.
pub async fn get_networks(
    tx: &flume::Sender<ScannerMessage>,
) -> Result<Vec<Network>, anyhow::Error> {
    request(tx, |reply| ScannerMessage::GetNetworks { tx: reply }).await
}

/// Anchors classified in the most recent scan cycle.
pub async fn get_access_points(
    tx: &flume::Sender<ScannerMessage>,
) -> Result<Vec<AccessPoint>, anyhow::Error> {
    request(tx, |reply| ScannerMessage::GetAccessPoints { tx: reply }).await
}

/// Replace the persisted anchor position map; false means the write failed.
pub async fn save_access_point_positions(
    tx: &flume::Sender<ScannerMessage>,
    positions: HashMap<String, Position>,
) -> Result<bool, anyhow::Error> {
    request(tx, |reply| ScannerMessage::SavePositions {
        positions,
        tx: reply,
    })
    .await
}

async fn request<T>(
    tx: &flume::Sender<ScannerMessage>,
    message: impl FnOnce(oneshot::Sender<T>) -> ScannerMessage,
) -> Result<T, anyhow::Error> {
    let (reply_tx, reply_rx) = oneshot::channel();
    tx.send_async(message(reply_tx))
        .await
        .map_err(|err| anyhow::anyhow!("send to scan task: {}", err))?;
    reply_rx
        .await
        .map_err(|err| anyhow::anyhow!("receive from scan task: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::strategy::{MockStrategy, Strategy, mock_networks};

    fn spawn_scanner(dir: &tempfile::TempDir) -> flume::Sender<ScannerMessage> {
        let scanner = WiFiScanner::new(
            Strategy::Mock(MockStrategy),
            false,
            dir.path().join("access-points.json"),
        );
        let (tx, rx) = flume::unbounded();
        // long period, cycles in these tests are driven by ScanNow
        scan_task(scanner, rx, 3600);
        tx
    }

    #[tokio::test]
    async fn scan_now_replies_with_networks() {
        let dir = tempfile::tempdir().unwrap();
        let tx = spawn_scanner(&dir);

        let networks = scan_networks(&tx).await.unwrap();
        assert_eq!(networks, mock_networks());
        assert_eq!(get_networks(&tx).await.unwrap(), mock_networks());
    }

    #[tokio::test]
    async fn access_points_follow_saved_positions() {
        let dir = tempfile::tempdir().unwrap();
        let tx = spawn_scanner(&dir);
        scan_networks(&tx).await.unwrap();

        let target = Position {
            x: 10.0,
            y: 20.0,
            floor: 1,
        };
        let mut positions = HashMap::new();
        positions.insert("00:11:22:33:44:55".to_string(), target);
        assert!(save_access_point_positions(&tx, positions).await.unwrap());

        let access_points = get_access_points(&tx).await.unwrap();
        let ap = access_points
            .iter()
            .find(|ap| ap.network.bssid == "00:11:22:33:44:55")
            .unwrap();
        assert_eq!(ap.position, target);
    }

    #[tokio::test]
    async fn dropping_handles_stops_task() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = WiFiScanner::new(
            Strategy::Mock(MockStrategy),
            false,
            dir.path().join("access-points.json"),
        );
        let (tx, rx) = flume::unbounded();
        let handle = scan_task(scanner, rx, 3600);
        drop(tx);
        handle.await.unwrap();
    }
}
