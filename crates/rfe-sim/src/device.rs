//! Virtual device plumbing
//!
//! [`VirtualDevice`] is the input/output contract a simulated unit
//! implements; [`SimRunner`] services one device against the device
//! side of a virtual link on a background thread, the same way real
//! firmware sits behind a serial cable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;

use crate::link::DeviceEndpoint;

/// A simulated unit: consumes driver commands, produces device frames
pub trait VirtualDevice: Send + 'static {
    /// Feed bytes the driver wrote to the link
    fn handle_input(&mut self, bytes: &[u8]);

    /// Take the next pending output frame
    fn take_output(&mut self) -> Option<Vec<u8>>;
}

/// Services one virtual device against a link endpoint
pub struct SimRunner<D: VirtualDevice> {
    device: Arc<Mutex<D>>,
    endpoint: DeviceEndpoint,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl<D: VirtualDevice> SimRunner<D> {
    /// Spawns the service thread: read driver bytes, apply them to the
    /// device, flush the device's pending output back to the link.
    pub fn spawn(device: D, endpoint: DeviceEndpoint) -> Self {
        let device = Arc::new(Mutex::new(device));
        let stop = Arc::new(AtomicBool::new(false));

        let thread = {
            let device = Arc::clone(&device);
            let endpoint = endpoint.clone();
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                let mut buf = [0u8; 1024];
                while !stop.load(Ordering::Relaxed) {
                    match endpoint.read(&mut buf, Duration::from_millis(5)) {
                        Ok(0) => {}
                        Ok(n) => device.lock().unwrap().handle_input(&buf[..n]),
                        Err(err) => {
                            debug!("sim link closed: {err}");
                            break;
                        }
                    }

                    let frames: Vec<Vec<u8>> = {
                        let mut device = device.lock().unwrap();
                        std::iter::from_fn(|| device.take_output()).collect()
                    };
                    for frame in frames {
                        if endpoint.write(&frame).is_err() {
                            return;
                        }
                    }
                }
            })
        };

        SimRunner {
            device,
            endpoint,
            stop,
            thread: Some(thread),
        }
    }

    /// Shared handle on the simulated device, e.g. to emit sweeps or
    /// inspect state mid-test
    pub fn device(&self) -> Arc<Mutex<D>> {
        Arc::clone(&self.device)
    }

    /// Kill the link as a pulled cable would
    pub fn disconnect(&self) {
        self.endpoint.disconnect();
    }
}

impl<D: VirtualDevice> Drop for SimRunner<D> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.endpoint.disconnect();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
