//! RF Explorer Protocol Library
//!
//! This crate provides parsing and encoding for the RF Explorer serial
//! protocol, covering both device families:
//!
//! - **Spectrum analyzer**: configuration reports, sweep data, screen
//!   dumps, DSP/input-stage/tracking status
//! - **Signal generator**: per-mode configuration reports (CW,
//!   amplitude sweep, frequency sweep, plus expansion-module variants),
//!   temperature reports
//!
//! # Architecture
//!
//! Each family module provides:
//! - A streaming codec that handles partial data and resynchronizes
//!   past malformed frames
//! - A `Message` enum for everything the device sends
//! - A `Command` enum encoding to protocol-specific bytes
//!
//! The wire mixes `\r\n`-terminated ASCII lines with binary frames
//! whose payload length is declared in the header; a sweep payload may
//! legally contain line-ending bytes, so framing is length-driven for
//! binary frames and line-driven everywhere else.
//!
//! # Example
//!
//! ```rust
//! use rfe_protocol::spectrum::{Message, SpectrumCodec};
//! use rfe_protocol::ProtocolCodec;
//!
//! let mut codec = SpectrumCodec::new();
//! codec.push_bytes(b"#C2-M:005,255,01.12B26\r\n");
//!
//! match codec.next_message() {
//!     Some(Message::SetupInfo(setup)) => {
//!         assert_eq!(setup.firmware_version, "01.12B26");
//!     }
//!     other => panic!("unexpected message: {other:?}"),
//! }
//! ```

pub mod command;
pub mod error;
mod frame;
pub mod frequency;
pub mod generator;
pub mod screen;
pub mod serial_number;
pub mod setup;
pub mod spectrum;
pub mod sweep;

pub use command::{BaudRate, Command, EncodeCommand};
pub use error::ParseError;
pub use frequency::Frequency;
pub use screen::ScreenData;
pub use serial_number::SerialNumber;
pub use setup::{RadioModule, SetupInfo};
pub use sweep::Sweep;

/// Identifies which RF Explorer device family a unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceKind {
    SpectrumAnalyzer,
    SignalGenerator,
}

impl DeviceKind {
    /// Returns a human-readable name for the device family
    pub fn name(&self) -> &'static str {
        match self {
            DeviceKind::SpectrumAnalyzer => "Spectrum Analyzer",
            DeviceKind::SignalGenerator => "Signal Generator",
        }
    }
}

/// Trait for streaming protocol codecs that parse incoming byte runs
pub trait ProtocolCodec {
    /// The message type produced by this codec
    type Message;

    /// Push raw bytes into the codec's buffer
    fn push_bytes(&mut self, data: &[u8]);

    /// Try to extract the next complete message from the buffer
    fn next_message(&mut self) -> Option<Self::Message>;

    /// Clear the internal buffer
    fn clear(&mut self);
}
