use std::time::Duration;

use super::exec::run_command;
use crate::{error::ScanError, scanner::model::Network};

// stands in for "\:" while splitting; nmcli never emits NUL in terse output
const COLON_SENTINEL: char = '\u{0}';

/// Scans through the NetworkManager CLI.
pub struct LinuxStrategy {
    timeout: Duration,
}

impl LinuxStrategy {
    pub fn new(timeout: Duration) -> Self {
        LinuxStrategy { timeout }
    }

    pub async fn scan(&self) -> Result<Vec<Network>, ScanError> {
        let output = run_command(
            "nmcli",
            &["-t", "-f", "SSID,BSSID,SIGNAL,FREQ", "device", "wifi", "list"],
            self.timeout,
        )
        .await?;
        Ok(parse_terse_output(&output))
    }
}

/// Parse the terse colon-delimited listing, one network per line as
/// `SSID:BSSID:SIGNAL:FREQ`.
///
/// Colons inside field values (the whole BSSID, SSIDs containing ':') are
/// backslash-escaped by nmcli and must not act as separators. The trailing
/// three fields have a known shape, so they are taken from the right and
/// whatever remains is the SSID. Malformed lines are skipped.
pub(crate) fn parse_terse_output(output: &str) -> Vec<Network> {
    output.lines().filter_map(parse_terse_line).collect()
}

fn parse_terse_line(line: &str) -> Option<Network> {
    if line.trim().is_empty() {
        return None;
    }

    let safe = line.replace("\\:", &COLON_SENTINEL.to_string());
    let mut parts: Vec<&str> = safe.split(':').collect();
    if parts.len() < 4 {
        return None;
    }

    let frequency: u32 = parts.pop()?.parse().ok()?;
    let signal: i32 = parts.pop()?.parse().ok()?;
    let bssid = parts.pop()?.replace(COLON_SENTINEL, ":");
    let ssid = parts.join(":").replace(COLON_SENTINEL, ":");

    if bssid.is_empty() {
        return None;
    }

    Some(Network {
        ssid: (!ssid.is_empty()).then_some(ssid),
        bssid,
        signal_level: quality_to_dbm(signal),
        frequency,
        current: false,
    })
}

/// nmcli reports SIGNAL as a 0-100 quality percent while the rest of the
/// system works in dBm. 100% maps to -50 dBm, 0% to -100 dBm. Values that
/// are already non-positive pass through untouched.
pub(crate) fn quality_to_dbm(signal: i32) -> i32 {
    if signal > 0 { signal / 2 - 100 } else { signal }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaped_colons_survive_in_ssid_and_bssid() {
        let line = r"MyNet\:Home:aa\:bb\:cc\:dd\:ee\:ff:72:2437";
        let networks = parse_terse_output(line);
        assert_eq!(networks.len(), 1);

        let n = &networks[0];
        assert_eq!(n.ssid.as_deref(), Some("MyNet:Home"));
        assert_eq!(n.bssid, "aa:bb:cc:dd:ee:ff");
        // quality 72 -> 72/2 - 100
        assert_eq!(n.signal_level, -64);
        assert_eq!(n.frequency, 2437);
    }

    #[test]
    fn empty_ssid_is_hidden() {
        let line = r":aa\:bb\:cc\:dd\:ee\:ff:80:5180";
        let networks = parse_terse_output(line);
        assert_eq!(networks[0].ssid, None);
        assert_eq!(networks[0].display_name(), "Hidden Network");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let output = "\n\
            garbage\n\
            OnlyTwo:fields\n\
            Net:aa\\:bb\\:cc\\:dd\\:ee\\:ff:abc:2437\n\
            Good:aa\\:bb\\:cc\\:dd\\:ee\\:ff:60:2412\n";
        let networks = parse_terse_output(output);
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].ssid.as_deref(), Some("Good"));
        assert_eq!(networks[0].signal_level, -70);
    }

    #[test]
    fn missing_bssid_is_skipped() {
        let networks = parse_terse_output("Net::55:2437");
        assert!(networks.is_empty());
    }

    #[test]
    fn quality_mapping_is_monotonic() {
        let mut last = i32::MIN;
        for quality in 1..=100 {
            let dbm = quality_to_dbm(quality);
            assert!(dbm >= last, "quality {quality} mapped below its predecessor");
            assert!(dbm <= 0);
            last = dbm;
        }
    }

    #[test]
    fn dbm_input_passes_through() {
        assert_eq!(quality_to_dbm(-70), -70);
        assert_eq!(quality_to_dbm(0), 0);
    }
}
