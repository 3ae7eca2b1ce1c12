//! RF Explorer Driver Core
//!
//! This crate owns the connection lifecycle and the concurrent
//! delivery pipeline for RF Explorer hardware: a background reader
//! thread per connected device pulls bytes off the serial transport,
//! decodes them with the protocol codec, applies every message to a
//! shared state cache in wire-arrival order, and fans results out to
//! blocking waiters and registered callbacks.
//!
//! # Architecture
//!
//! - [`Transport`] abstracts the byte stream; [`SerialTransport`] is
//!   the hardware implementation, and anything else (a simulator, a
//!   test double) plugs in through `connect_transport`.
//! - One reader thread per device handle. Blocking calls like
//!   [`SpectrumAnalyzer::wait_for_next_sweep`] suspend only the
//!   calling thread.
//! - Waits use next-after-entry semantics: a call entered between two
//!   sweeps receives the following sweep exactly once, in arrival
//!   order.
//! - Disconnection wakes every outstanding wait with
//!   [`Error::Disconnected`] and permanently invalidates the handle;
//!   there is no implicit reconnection.
//!
//! # Example
//!
//! ```rust,no_run
//! use rfe_driver::SpectrumAnalyzer;
//!
//! let rfe = SpectrumAnalyzer::connect().expect("no RF Explorer found");
//! println!("connected on {}", rfe.port_name());
//!
//! let sweep = rfe.wait_for_next_sweep()?;
//! println!("{} points", sweep.len());
//! # Ok::<(), rfe_driver::Error>(())
//! ```

mod device;
mod error;
mod generator;
mod spectrum;
mod sync;
mod transport;

pub use error::{ConnectError, ConnectResult, Error, Result};
pub use generator::SignalGenerator;
pub use spectrum::{ModuleSelection, SpectrumAnalyzer};
pub use transport::{
    SerialTransport, Transport, FAST_BAUD_RATE, POLL_INTERVAL, SLOW_BAUD_RATE,
};

// The protocol vocabulary is part of this crate's API surface
pub use rfe_protocol::{
    Frequency, RadioModule, ScreenData, SerialNumber, SetupInfo, Sweep,
};
