//! Error types for the driver

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors returned by operations on a connected device handle
#[derive(Debug, Error)]
pub enum Error {
    /// The device firmware speaks a protocol revision this engine
    /// cannot parse. Fatal for the handle.
    #[error("incompatible firmware: {0}")]
    IncompatibleFirmware(String),

    /// A caller-supplied parameter is outside the device's capability
    /// range. Nothing was sent to the hardware.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested action is not valid in the device's current mode
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Transport failure. Terminal for the handle.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The connection is gone: the transport disconnected or the handle
    /// was shut down while the call was outstanding. Terminal for the
    /// handle, and distinct from a timeout.
    #[error("device disconnected")]
    Disconnected,

    /// The awaited event did not happen within the timeout
    #[error("operation did not complete within {} ms", .0.as_millis())]
    TimedOut(Duration),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while establishing a connection
#[derive(Debug, Error)]
pub enum ConnectError {
    /// No serial port with the requested name exists
    #[error("serial port '{0}' not found")]
    PortNotFound(String),

    /// The serial port could not be opened
    #[error(transparent)]
    PortOpenFailed(#[from] serialport::Error),

    /// A port was opened but the device never reported its setup and
    /// configuration within the handshake timeout
    #[error("device info was not received")]
    NoDeviceInfo,

    /// The device answered the handshake with a firmware revision this
    /// engine cannot parse
    #[error("incompatible firmware: {0}")]
    IncompatibleFirmware(String),

    /// The handshake command could not be sent
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type ConnectResult<T> = std::result::Result<T, ConnectError>;
