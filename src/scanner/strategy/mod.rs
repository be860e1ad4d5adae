mod exec;
mod linux;
mod macos;
mod mock;

use std::str::FromStr;
use std::time::Duration;

use log::info;

pub use linux::LinuxStrategy;
pub use macos::MacStrategy;
pub use mock::{MockStrategy, mock_networks};

use crate::{constants::Platform, error::ScanError, scanner::model::Network};

/// Platform-specific acquisition of visible networks.
///
/// A strategy performs exactly one scan attempt; retries and degradation
/// to mock data are the orchestrator's responsibility.
pub enum Strategy {
    Linux(LinuxStrategy),
    Mac(MacStrategy),
    Mock(MockStrategy),
}

impl Strategy {
    /// Select the scan strategy for a host platform.
    pub fn for_platform(platform: Platform, command_timeout: Duration) -> Strategy {
        match platform {
            Platform::Linux => Strategy::Linux(LinuxStrategy::new(command_timeout)),
            Platform::MacOs => Strategy::Mac(MacStrategy::new(command_timeout)),
            Platform::Other => {
                info!("unsupported platform, using mock scan data");
                Strategy::Mock(MockStrategy)
            }
        }
    }

    /// Select the scan strategy for the platform this binary runs on.
    pub fn detect(command_timeout: Duration) -> Strategy {
        let platform =
            Platform::from_str(std::env::consts::OS).unwrap_or(Platform::Other);
        Self::for_platform(platform, command_timeout)
    }

    pub async fn scan(&self) -> Result<Vec<Network>, ScanError> {
        match self {
            Strategy::Linux(s) => s.scan().await,
            Strategy::Mac(s) => s.scan().await,
            Strategy::Mock(s) => Ok(s.scan()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_from_os_string() {
        assert_eq!("linux".parse(), Ok(Platform::Linux));
        assert_eq!("macos".parse(), Ok(Platform::MacOs));
        assert!("windows".parse::<Platform>().is_err());
    }

    #[test]
    fn unsupported_platform_gets_mock() {
        let strategy = Strategy::for_platform(Platform::Other, Duration::from_secs(1));
        assert!(matches!(strategy, Strategy::Mock(_)));
    }
}
