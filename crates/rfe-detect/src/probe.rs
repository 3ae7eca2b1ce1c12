//! Device family probing
//!
//! Sends a config request to a port and classifies the attached unit
//! by which setup-info prefix answers: `#C2-M:` for a spectrum
//! analyzer, `#C3-M:` for a signal generator. A port that stays silent
//! or errors yields `None`; probing never aborts a scan.

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use rfe_protocol::{Command, DeviceKind, EncodeCommand};
use tracing::{debug, trace, warn};

/// Configuration for probing
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Total time to wait for an identifiable response
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(500),
        }
    }
}

/// Probe a specific port at a given baud rate
///
/// Returns the device family if an RF Explorer answers.
pub fn probe_port(port_name: &str, baud_rate: u32) -> Option<DeviceKind> {
    probe_port_with_config(port_name, baud_rate, &ProbeConfig::default())
}

/// Probe a specific port with a custom configuration
pub fn probe_port_with_config(
    port_name: &str,
    baud_rate: u32,
    config: &ProbeConfig,
) -> Option<DeviceKind> {
    debug!("probing {port_name} at {baud_rate} baud");

    let mut port = match serialport::new(port_name, baud_rate)
        .timeout(Duration::from_millis(100))
        .open()
    {
        Ok(port) => port,
        Err(err) => {
            warn!("failed to open {port_name}: {err}");
            return None;
        }
    };

    if let Err(err) = port.write_all(&Command::RequestConfig.encode()) {
        warn!("failed to write probe to {port_name}: {err}");
        return None;
    }

    let deadline = Instant::now() + config.timeout;
    let mut response = Vec::new();
    let mut buf = [0u8; 256];

    while Instant::now() < deadline {
        match port.read(&mut buf) {
            Ok(n) if n > 0 => {
                response.extend_from_slice(&buf[..n]);
                if let Some(kind) = classify_response(&response) {
                    debug!("identified {} on {port_name}", kind.name());
                    return Some(kind);
                }
            }
            Ok(_) => {}
            Err(err) if err.kind() == std::io::ErrorKind::TimedOut => {}
            Err(err) => {
                trace!("probe read error on {port_name}: {err}");
                return None;
            }
        }
    }

    trace!("no identifiable response from {port_name}");
    None
}

fn classify_response(response: &[u8]) -> Option<DeviceKind> {
    const ANALYZER_SETUP: &[u8] = b"#C2-M:";
    const GENERATOR_SETUP: &[u8] = b"#C3-M:";

    if contains(response, ANALYZER_SETUP) {
        Some(DeviceKind::SpectrumAnalyzer)
    } else if contains(response, GENERATOR_SETUP) {
        Some(DeviceKind::SignalGenerator)
    } else {
        None
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_analyzer() {
        let response = b"noise#C2-M:005,255,01.12B26\r\n";
        assert_eq!(
            classify_response(response),
            Some(DeviceKind::SpectrumAnalyzer)
        );
    }

    #[test]
    fn test_classify_generator() {
        let response = b"#C3-M:060,255,01.31\r\n";
        assert_eq!(
            classify_response(response),
            Some(DeviceKind::SignalGenerator)
        );
    }

    #[test]
    fn test_classify_partial_prefix_is_inconclusive() {
        assert_eq!(classify_response(b"#C2-"), None);
        assert_eq!(classify_response(b""), None);
        assert_eq!(classify_response(b"FA00014250000;"), None);
    }
}
