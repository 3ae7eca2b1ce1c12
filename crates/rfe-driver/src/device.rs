//! Generic device core
//!
//! `Device<M>` bundles what both device families share: exclusive
//! ownership of a [`Transport`], the background reader thread feeding a
//! streaming codec, the handshake performed at connect time, and the
//! stop/join lifecycle. The family-specific part is the message sink
//! `M`, which applies decoded messages to its state container.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rfe_protocol::{Command, EncodeCommand, ProtocolCodec};
use tracing::{debug, warn};

use crate::error::{ConnectError, ConnectResult, Error, Result};
use crate::transport::Transport;

/// How long a freshly opened port may take to answer the handshake
/// with its setup info and configuration
pub(crate) const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(2);

/// How long a command the device confirms with a response frame may
/// take to be confirmed
pub(crate) const COMMAND_RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Applies decoded messages to a family's state container
pub(crate) trait MessageSink: Default + Send + Sync + 'static {
    type Codec: ProtocolCodec + Send + Default;

    /// Apply one decoded message: update cached state, wake waiters,
    /// invoke the matching subscriber callback.
    fn receive(&self, message: <Self::Codec as ProtocolCodec>::Message);

    /// Block until the handshake data (setup info and configuration)
    /// has arrived, or the timeout elapses.
    fn wait_for_device_info(&self, timeout: Duration) -> bool;

    /// Firmware version from the setup report, once received
    fn firmware_version(&self) -> Option<String>;

    /// Close every wait slot so no caller stays blocked
    fn close(&self);
}

pub(crate) struct Device<M: MessageSink> {
    transport: Arc<dyn Transport>,
    sink: Arc<M>,
    is_reading: Arc<AtomicBool>,
    is_connected: Arc<AtomicBool>,
    read_thread_handle: Option<JoinHandle<()>>,
    /// Serializes command issuance per handle: the protocol has no
    /// request IDs, so responses correlate to commands by order and
    /// only one confirmable command may be in flight at a time
    command_lock: Mutex<()>,
}

impl<M: MessageSink> Device<M> {
    /// Connects over an already-open transport: spawn the reader, send
    /// the handshake request, wait for device info.
    pub fn connect(transport: impl Transport + 'static) -> ConnectResult<Self> {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        let sink = Arc::new(M::default());
        let is_reading = Arc::new(AtomicBool::new(true));
        let is_connected = Arc::new(AtomicBool::new(true));

        let read_thread_handle = {
            let transport = Arc::clone(&transport);
            let sink = Arc::clone(&sink);
            let is_reading = Arc::clone(&is_reading);
            let is_connected = Arc::clone(&is_connected);
            thread::spawn(move || read_messages(transport, sink, is_reading, is_connected))
        };

        let mut device = Device {
            transport,
            sink,
            is_reading,
            is_connected,
            read_thread_handle: Some(read_thread_handle),
            command_lock: Mutex::new(()),
        };

        // The device answers the config request with its setup info
        // and current configuration; that exchange is the handshake
        if let Err(err) = device.transport.write_all(&Command::RequestConfig.encode()) {
            device.stop_reading();
            return Err(ConnectError::Io(err));
        }

        if !device.sink.wait_for_device_info(HANDSHAKE_TIMEOUT) {
            device.stop_reading();
            return Err(ConnectError::NoDeviceInfo);
        }

        Ok(device)
    }

    pub fn sink(&self) -> &M {
        &self.sink
    }

    pub fn port_name(&self) -> &str {
        self.transport.name()
    }

    pub fn baud_rate(&self) -> io::Result<u32> {
        self.transport.baud_rate()
    }

    pub fn set_transport_baud_rate(&self, baud_rate: u32) -> io::Result<()> {
        self.transport.set_baud_rate(baud_rate)
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::Relaxed)
    }

    /// Sends raw bytes to the device. Fails fast once disconnected.
    pub fn send_bytes(&self, bytes: impl AsRef<[u8]>) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::Disconnected);
        }
        self.transport.write_all(bytes.as_ref()).map_err(Error::Io)
    }

    /// Encodes and sends one command
    pub fn send_command(&self, command: impl EncodeCommand + std::fmt::Debug) -> Result<()> {
        tracing::trace!("sending command {command:?}");
        self.send_bytes(command.encode())
    }

    /// Takes the per-handle command lock. Held across send plus
    /// confirmation wait for commands the device answers.
    pub fn command_guard(&self) -> MutexGuard<'_, ()> {
        self.command_lock.lock().unwrap()
    }

    fn stop_reading(&mut self) {
        self.is_reading.store(false, Ordering::Relaxed);
        if let Some(handle) = self.read_thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl<M: MessageSink> Drop for Device<M> {
    /// A handle never outlives its reader thread
    fn drop(&mut self) {
        self.stop_reading();
    }
}

impl<M: MessageSink> std::fmt::Debug for Device<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("port_name", &self.port_name())
            .field("is_connected", &self.is_connected())
            .finish()
    }
}

/// The reader loop: one background thread per connected device.
///
/// Pulls bytes from the transport, feeds the codec, and applies every
/// decoded message to the sink in wire-arrival order. Exits on a stop
/// request or a hard transport error; either way it closes all wait
/// slots on the way out so no caller stays blocked.
fn read_messages<M: MessageSink>(
    transport: Arc<dyn Transport>,
    sink: Arc<M>,
    is_reading: Arc<AtomicBool>,
    is_connected: Arc<AtomicBool>,
) {
    debug!("started reading messages from {}", transport.name());
    let mut codec = M::Codec::default();
    let mut buf = [0u8; 4096];

    while is_reading.load(Ordering::Relaxed) {
        let n = match transport.read_available(&mut buf) {
            Ok(0) => continue,
            Ok(n) => n,
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::TimedOut
                        | io::ErrorKind::WouldBlock
                        | io::ErrorKind::Interrupted
                ) =>
            {
                continue
            }
            Err(err) => {
                warn!("transport error on {}: {err}", transport.name());
                break;
            }
        };

        codec.push_bytes(&buf[..n]);
        while let Some(message) = codec.next_message() {
            sink.receive(message);
        }
    }

    is_connected.store(false, Ordering::Relaxed);
    sink.close();
    debug!("stopped reading messages from {}", transport.name());
}

/// Minimum firmware revision whose protocol this engine speaks
const MIN_FIRMWARE: (u32, u32) = (1, 12);

/// Checks a `NN.NN`-prefixed firmware version string against
/// [`MIN_FIRMWARE`]. Suffixes like `B26` are release tags and ignored.
pub(crate) fn check_firmware(version: &str) -> ConnectResult<()> {
    let unsupported = || ConnectError::IncompatibleFirmware(version.to_string());

    let (major, rest) = version.split_once('.').ok_or_else(unsupported)?;
    let major: u32 = major.parse().map_err(|_| unsupported())?;
    let minor: u32 = rest
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .map_err(|_| unsupported())?;

    if (major, minor) < MIN_FIRMWARE {
        return Err(unsupported());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firmware_versions() {
        assert!(check_firmware("01.12B26").is_ok());
        assert!(check_firmware("01.31").is_ok());
        assert!(check_firmware("03.28").is_ok());
        assert!(check_firmware("01.11").is_err());
        assert!(check_firmware("00.99").is_err());
        assert!(check_firmware("garbage").is_err());
        assert!(check_firmware("").is_err());
    }
}
