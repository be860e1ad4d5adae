/// Per-device RSSI readings produced by an acquisition backend.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSample {
    pub mac: String,
    /// one reading per anchor access point, in anchor order
    pub rssi: Vec<i32>,
}

/// Acquisition backend feeding the tracker with RSSI vectors.
///
/// Implementations must order each sample's `rssi` consistently with the
/// anchor list the tracker resolves positions against; readings are zipped
/// with anchors by index.
pub trait RssiSource: Send {
    fn sample(&mut self) -> Vec<DeviceSample>;
}

/// Stand-in source replaying a fixed set of devices. Real deployments
/// plug a sensing backend (router client table, packet capture, BLE)
/// behind the same trait.
pub struct SyntheticSource;

impl RssiSource for SyntheticSource {
    fn sample(&mut self) -> Vec<DeviceSample> {
        fn sample(mac: &str, rssi: [i32; 3]) -> DeviceSample {
            DeviceSample {
                mac: mac.to_string(),
                rssi: rssi.to_vec(),
            }
        }

        vec![
            sample("00:11:22:33:44:55", [-45, -52, -48]),
            sample("66:77:88:99:AA:BB", [-38, -65, -55]),
            sample("CC:DD:EE:FF:00:11", [-60, -42, -58]),
        ]
    }
}
