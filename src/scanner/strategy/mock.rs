use log::debug;

use crate::scanner::model::Network;

/// Deterministic networks for platforms without a usable scan tool, and
/// the universal fallback when the platform strategy fails or comes back
/// empty.
pub struct MockStrategy;

impl MockStrategy {
    pub fn scan(&self) -> Vec<Network> {
        debug!("using mock WiFi data");
        mock_networks()
    }
}

/// The fixed mock scan result.
pub fn mock_networks() -> Vec<Network> {
    fn network(
        ssid: &str,
        bssid: &str,
        signal_level: i32,
        frequency: u32,
        current: bool,
    ) -> Network {
        Network {
            ssid: Some(ssid.to_string()),
            bssid: bssid.to_string(),
            signal_level,
            frequency,
            current,
        }
    }

    vec![
        network("Your_Current_Network", "00:11:22:33:44:55", -45, 2437, true),
        network("Xfinity_5G", "66:77:88:99:AA:BB", -52, 5180, false),
        network("Neighbor_WiFi", "CC:DD:EE:FF:00:11", -68, 2462, false),
        network("Living_Room_Pod", "11:22:33:44:55:66", -55, 2412, false),
        network("Office_Repeater", "AA:BB:CC:DD:EE:FF", -60, 5200, false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_scan_is_deterministic_and_non_empty() {
        let first = MockStrategy.scan();
        let second = MockStrategy.scan();
        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
    }

    #[test]
    fn mock_bssids_are_unique() {
        let networks = mock_networks();
        for (i, a) in networks.iter().enumerate() {
            for b in &networks[i + 1..] {
                assert_ne!(a.bssid, b.bssid);
            }
        }
    }
}
