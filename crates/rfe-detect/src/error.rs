//! Error types for device detection

use thiserror::Error;

/// Errors that can occur while scanning for devices
#[derive(Debug, Error)]
pub enum DetectError {
    /// Serial port enumeration failed
    #[error("port enumeration failed: {0}")]
    EnumerationFailed(String),
}
