//! Byte-stream transport abstraction
//!
//! The reader loop and the command issuers talk to the device through
//! the [`Transport`] trait rather than a concrete serial port, so
//! simulated devices (and tests) share the exact same code path as real
//! hardware. [`SerialTransport`] is the hardware implementation.

use std::io::{self, Read, Write};
use std::sync::Mutex;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, StopBits};

/// RF Explorer's fast default baud rate (500 kbps)
pub const FAST_BAUD_RATE: u32 = 500_000;

/// RF Explorer's slow default baud rate (2.4 kbps)
pub const SLOW_BAUD_RATE: u32 = 2_400;

/// How long a `read_available` call may block before reporting "no
/// data". Bounds the reader loop's reaction time to a stop request.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A bidirectional byte stream to one device
///
/// - `read_available` blocks for at most roughly [`POLL_INTERVAL`] and
///   returns `Ok(0)` when no bytes arrived; a hard error means the
///   transport is gone.
/// - `write_all` is atomic with respect to other writers on the same
///   transport: implementations serialize internally so command bytes
///   from different threads never interleave.
pub trait Transport: Send + Sync {
    /// Read whatever bytes are currently available
    fn read_available(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write an entire buffer, serialized against concurrent writers
    fn write_all(&self, bytes: &[u8]) -> io::Result<()>;

    /// Name of the underlying port or link
    fn name(&self) -> &str;

    /// Current baud rate of the link
    fn baud_rate(&self) -> io::Result<u32>;

    /// Reconfigure the link's baud rate
    fn set_baud_rate(&self, baud_rate: u32) -> io::Result<()>;
}

/// [`Transport`] over a real serial port
///
/// The port handle is cloned so the reader loop can block in `read`
/// while command writes proceed on the second handle; writes serialize
/// behind their own lock.
pub struct SerialTransport {
    reader: Mutex<Box<dyn serialport::SerialPort>>,
    writer: Mutex<Box<dyn serialport::SerialPort>>,
    port_name: String,
}

impl SerialTransport {
    /// Opens a serial port with the RF Explorer's line settings
    /// (8 data bits, no parity, one stop bit, no flow control).
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, serialport::Error> {
        let reader = serialport::new(port_name, baud_rate)
            .data_bits(DataBits::Eight)
            .flow_control(FlowControl::None)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(POLL_INTERVAL)
            .open()?;
        let writer = reader.try_clone()?;

        Ok(SerialTransport {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            port_name: port_name.to_string(),
        })
    }
}

impl Transport for SerialTransport {
    fn read_available(&self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reader.lock().unwrap().read(buf) {
            Ok(n) => Ok(n),
            // The port timeout is our poll interval, not a failure
            Err(err) if err.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(err) => Err(err),
        }
    }

    fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap();
        writer.write_all(bytes)?;
        writer.flush()
    }

    fn name(&self) -> &str {
        &self.port_name
    }

    fn baud_rate(&self) -> io::Result<u32> {
        self.reader
            .lock()
            .unwrap()
            .baud_rate()
            .map_err(io::Error::other)
    }

    fn set_baud_rate(&self, baud_rate: u32) -> io::Result<()> {
        self.reader
            .lock()
            .unwrap()
            .set_baud_rate(baud_rate)
            .map_err(io::Error::other)?;
        self.writer
            .lock()
            .unwrap()
            .set_baud_rate(baud_rate)
            .map_err(io::Error::other)
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port_name", &self.port_name)
            .finish()
    }
}
