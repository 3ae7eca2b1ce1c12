//! Serial port scanner
//!
//! Every RF Explorer ships with a Silicon Labs CP210x USB-to-UART
//! bridge, so candidate ports are found by USB VID/PID rather than by
//! probing everything with a serial device node.

use serialport::{available_ports, SerialPortType};
use tracing::info;

use crate::error::DetectError;

/// Silicon Labs vendor ID
const SILABS_VID: u16 = 0x10C4;

/// CP210x USB-to-UART bridge product ID
const CP210X_PID: u16 = 0xEA60;

/// Information about a serial port
#[derive(Debug, Clone)]
pub struct PortInfo {
    /// Port name (e.g., /dev/ttyUSB0, COM3)
    pub port: String,
    /// USB Vendor ID (if USB)
    pub vid: Option<u16>,
    /// USB Product ID (if USB)
    pub pid: Option<u16>,
    /// USB serial number (if available)
    pub serial_number: Option<String>,
    /// USB manufacturer string
    pub manufacturer: Option<String>,
    /// USB product string
    pub product: Option<String>,
}

impl PortInfo {
    fn from_serialport(name: String, port_type: &SerialPortType) -> Self {
        match port_type {
            SerialPortType::UsbPort(usb) => Self {
                port: name,
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                serial_number: usb.serial_number.clone(),
                manufacturer: usb.manufacturer.clone(),
                product: usb.product.clone(),
            },
            _ => Self {
                port: name,
                vid: None,
                pid: None,
                serial_number: None,
                manufacturer: None,
                product: None,
            },
        }
    }

    /// Whether this port's USB bridge matches the RF Explorer's
    pub fn is_cp210x(&self) -> bool {
        self.vid == Some(SILABS_VID) && self.pid == Some(CP210X_PID)
    }
}

/// Serial port scanner configuration
#[derive(Debug, Clone, Default)]
pub struct ScannerConfig {
    /// Skip ports matching these patterns
    pub skip_patterns: Vec<String>,
}

/// Serial port scanner
pub struct PortScanner {
    config: ScannerConfig,
}

impl PortScanner {
    /// Create a new scanner with default configuration
    pub fn new() -> Self {
        Self {
            config: ScannerConfig {
                skip_patterns: vec![
                    // Bluetooth ports on macOS
                    "Bluetooth".to_string(),
                    // Debug/logging ports
                    "debug".to_string(),
                ],
            },
        }
    }

    /// Create a scanner with custom configuration
    pub fn with_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Enumerate all available serial ports
    pub fn enumerate_ports(&self) -> Result<Vec<PortInfo>, DetectError> {
        let ports = available_ports().map_err(|e| DetectError::EnumerationFailed(e.to_string()))?;

        let result: Vec<_> = ports
            .into_iter()
            .map(|p| PortInfo::from_serialport(p.port_name, &p.port_type))
            .filter(|p| !self.should_skip_port(p))
            .collect();

        info!("found {} serial port(s)", result.len());
        Ok(result)
    }

    fn should_skip_port(&self, port: &PortInfo) -> bool {
        self.config
            .skip_patterns
            .iter()
            .any(|pattern| port.port.contains(pattern))
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Enumerate the serial ports whose USB bridge matches an RF Explorer
pub fn explorer_ports() -> Result<Vec<PortInfo>, DetectError> {
    let ports: Vec<_> = PortScanner::new()
        .enumerate_ports()?
        .into_iter()
        .filter(PortInfo::is_cp210x)
        .collect();

    if ports.is_empty() {
        info!("no RF Explorer candidate ports found");
    } else {
        for port in &ports {
            info!(
                "  {} - {}",
                port.port,
                port.product.as_deref().unwrap_or("Unknown")
            );
        }
    }

    Ok(ports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    fn usb_port(name: &str, vid: u16, pid: u16) -> PortInfo {
        PortInfo::from_serialport(
            name.to_string(),
            &SerialPortType::UsbPort(UsbPortInfo {
                vid,
                pid,
                serial_number: Some("12345".to_string()),
                manufacturer: Some("Silicon Labs".to_string()),
                product: Some("CP2102 USB to UART Bridge Controller".to_string()),
            }),
        )
    }

    #[test]
    fn test_port_info_from_usb() {
        let info = usb_port("/dev/ttyUSB0", 0x10C4, 0xEA60);
        assert_eq!(info.vid, Some(0x10C4));
        assert_eq!(info.pid, Some(0xEA60));
        assert!(info.is_cp210x());
    }

    #[test]
    fn test_non_cp210x_is_rejected() {
        // FTDI bridge: not an RF Explorer
        let info = usb_port("/dev/ttyUSB1", 0x0403, 0x6001);
        assert!(!info.is_cp210x());
    }

    #[test]
    fn test_non_usb_port_has_no_ids() {
        let info =
            PortInfo::from_serialport("/dev/ttyS0".to_string(), &SerialPortType::Unknown);
        assert_eq!(info.vid, None);
        assert!(!info.is_cp210x());
    }

    #[test]
    fn test_skip_patterns() {
        let scanner = PortScanner::new();
        let bluetooth = PortInfo::from_serialport(
            "/dev/tty.Bluetooth-Incoming-Port".to_string(),
            &SerialPortType::Unknown,
        );
        assert!(scanner.should_skip_port(&bluetooth));

        let usb = usb_port("/dev/ttyUSB0", 0x10C4, 0xEA60);
        assert!(!scanner.should_skip_port(&usb));
    }
}
