//! RF Explorer simulation layer
//!
//! Protocol-accurate virtual devices plus an in-memory transport link,
//! so the driver stack can be exercised end-to-end without hardware:
//!
//! ```rust
//! use rfe_driver::SpectrumAnalyzer;
//! use rfe_protocol::spectrum::Model;
//! use rfe_sim::{virtual_link, SimRunner, VirtualAnalyzer};
//!
//! let (port, endpoint) = virtual_link("SIM0");
//! let sim = SimRunner::spawn(VirtualAnalyzer::new(Model::RfeWSub1G), endpoint);
//! let rfe = SpectrumAnalyzer::connect_transport(port).unwrap();
//!
//! let device = sim.device();
//! std::thread::spawn(move || {
//!     std::thread::sleep(std::time::Duration::from_millis(50));
//!     device.lock().unwrap().emit_sweep(&[-80.0; 112]);
//! });
//! let sweep = rfe.wait_for_next_sweep().unwrap();
//! assert_eq!(sweep.len(), 112);
//! ```

pub mod analyzer;
pub mod device;
pub mod generator;
pub mod link;

pub use analyzer::{VirtualAnalyzer, VirtualAnalyzerConfig};
pub use device::{SimRunner, VirtualDevice};
pub use generator::{VirtualGenerator, VirtualGeneratorConfig};
pub use link::{virtual_link, DeviceEndpoint, VirtualPort, WriteLog};
