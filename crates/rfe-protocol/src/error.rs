//! Error types for RF Explorer protocol parsing

use thiserror::Error;

/// Errors that can occur while parsing protocol data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid frame structure
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// A numeric field failed to parse
    #[error("invalid number: {0}")]
    InvalidNumber(String),

    /// A frequency field failed to parse
    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),

    /// An enum field carried an out-of-range code
    #[error("invalid value 0x{0:02X} for {1}")]
    InvalidValue(u8, &'static str),

    /// Binary payload length did not match the frame header
    #[error("bad payload length: expected {expected} bytes, got {actual}")]
    BadPayloadLength { expected: usize, actual: usize },
}
