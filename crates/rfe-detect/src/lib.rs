//! RF Explorer device detection
//!
//! Finds serial ports that could have an RF Explorer on the other end
//! (by the CP210x USB bridge every unit ships with) and optionally
//! probes a port to classify the attached device family without
//! committing to a full connection.

pub mod error;
pub mod probe;
pub mod scanner;

pub use error::DetectError;
pub use probe::{probe_port, probe_port_with_config, ProbeConfig};
pub use scanner::{explorer_ports, PortInfo, PortScanner, ScannerConfig};
