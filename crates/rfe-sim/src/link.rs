//! In-memory transport link
//!
//! A [`virtual_link`] is a byte-pipe pair standing in for a serial
//! cable: the driver side implements [`Transport`] and plugs straight
//! into `connect_transport`, the device side is driven by a virtual
//! device. `disconnect` kills the link the way pulling the cable
//! would: every further read or write fails with `BrokenPipe`.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use rfe_driver::{Transport, POLL_INTERVAL};

#[derive(Debug, Default)]
struct PipeState {
    data: VecDeque<u8>,
    closed: bool,
}

/// One direction of the link
#[derive(Debug, Default)]
struct Pipe {
    state: Mutex<PipeState>,
    cond: Condvar,
}

impl Pipe {
    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        state.data.extend(bytes);
        self.cond.notify_all();
        Ok(())
    }

    /// Blocks up to `timeout` for data. `Ok(0)` means the wait timed
    /// out with the pipe still healthy.
    fn read(&self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        if state.data.is_empty() && !state.closed {
            state = self.cond.wait_timeout(state, timeout).unwrap().0;
        }
        if state.closed {
            return Err(io::ErrorKind::BrokenPipe.into());
        }

        let n = state.data.len().min(buf.len());
        for slot in buf.iter_mut().take(n) {
            *slot = state.data.pop_front().unwrap();
        }
        Ok(n)
    }

    fn close(&self) {
        self.state.lock().unwrap().closed = true;
        self.cond.notify_all();
    }

    fn drain(&self) -> Vec<u8> {
        self.state.lock().unwrap().data.drain(..).collect()
    }
}

/// Record of everything the driver has written to a [`VirtualPort`].
/// Cheap to clone; lets tests assert that a rejected command put
/// nothing on the wire even while a simulator is servicing the link.
#[derive(Debug, Clone, Default)]
pub struct WriteLog(Arc<Mutex<Vec<u8>>>);

impl WriteLog {
    /// Total bytes written so far
    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of everything written so far
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

/// Driver-side end of a virtual link. Implements [`Transport`].
pub struct VirtualPort {
    name: String,
    to_device: Arc<Pipe>,
    from_device: Arc<Pipe>,
    baud_rate: Mutex<u32>,
    log: WriteLog,
}

impl VirtualPort {
    /// Handle on the log of bytes written through this port. Grab it
    /// before handing the port to `connect_transport`.
    pub fn write_log(&self) -> WriteLog {
        self.log.clone()
    }
}

impl Transport for VirtualPort {
    fn read_available(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.from_device.read(buf, POLL_INTERVAL)
    }

    fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        self.log.0.lock().unwrap().extend_from_slice(bytes);
        self.to_device.write(bytes)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn baud_rate(&self) -> io::Result<u32> {
        Ok(*self.baud_rate.lock().unwrap())
    }

    fn set_baud_rate(&self, baud_rate: u32) -> io::Result<()> {
        *self.baud_rate.lock().unwrap() = baud_rate;
        Ok(())
    }
}

impl std::fmt::Debug for VirtualPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualPort").field("name", &self.name).finish()
    }
}

/// Device-side end of a virtual link. Clones share the same pipes, so
/// a test can keep one handle for `disconnect` while a simulator
/// services another.
#[derive(Debug, Clone)]
pub struct DeviceEndpoint {
    from_host: Arc<Pipe>,
    to_host: Arc<Pipe>,
}

impl DeviceEndpoint {
    /// Read bytes sent by the driver, blocking up to `timeout`
    pub fn read(&self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        self.from_host.read(buf, timeout)
    }

    /// Take everything the driver has written so far without blocking.
    /// Lets tests assert that invalid commands put nothing on the wire.
    pub fn take_received(&self) -> Vec<u8> {
        self.from_host.drain()
    }

    /// Send device bytes to the driver
    pub fn write(&self, bytes: &[u8]) -> io::Result<()> {
        self.to_host.write(bytes)
    }

    /// Kill the link in both directions, as a pulled cable would
    pub fn disconnect(&self) {
        self.from_host.close();
        self.to_host.close();
    }
}

/// Creates a connected (driver side, device side) pair
pub fn virtual_link(name: impl Into<String>) -> (VirtualPort, DeviceEndpoint) {
    let to_device = Arc::new(Pipe::default());
    let from_device = Arc::new(Pipe::default());

    let port = VirtualPort {
        name: name.into(),
        to_device: Arc::clone(&to_device),
        from_device: Arc::clone(&from_device),
        baud_rate: Mutex::new(rfe_driver::FAST_BAUD_RATE),
        log: WriteLog::default(),
    };
    let endpoint = DeviceEndpoint {
        from_host: to_device,
        to_host: from_device,
    };
    (port, endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_flow_both_ways() {
        let (port, endpoint) = virtual_link("SIM");

        port.write_all(b"ping").unwrap();
        let mut buf = [0u8; 16];
        let n = endpoint.read(&mut buf, Duration::from_millis(100)).unwrap();
        assert_eq!(&buf[..n], b"ping");

        endpoint.write(b"pong").unwrap();
        let n = port.read_available(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"pong");
    }

    #[test]
    fn test_read_times_out_empty() {
        let (port, _endpoint) = virtual_link("SIM");
        let mut buf = [0u8; 16];
        assert_eq!(port.read_available(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_disconnect_fails_reads_and_writes() {
        let (port, endpoint) = virtual_link("SIM");
        endpoint.disconnect();

        let mut buf = [0u8; 16];
        assert_eq!(
            port.read_available(&mut buf).unwrap_err().kind(),
            io::ErrorKind::BrokenPipe
        );
        assert_eq!(
            port.write_all(b"x").unwrap_err().kind(),
            io::ErrorKind::BrokenPipe
        );
    }

    #[test]
    fn test_take_received_records_writes() {
        let (port, endpoint) = virtual_link("SIM");
        port.write_all(b"abc").unwrap();
        port.write_all(b"def").unwrap();
        assert_eq!(endpoint.take_received(), b"abcdef");
        assert_eq!(endpoint.take_received(), b"");
    }
}
