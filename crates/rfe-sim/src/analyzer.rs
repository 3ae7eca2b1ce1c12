//! Virtual spectrum analyzer
//!
//! A protocol-accurate simulation of one analyzer unit: it answers the
//! handshake with setup info and a configuration report, echoes
//! configuration changes the way real firmware does (snapping
//! frequencies to the step grid implied by the sweep point count), and
//! emits sweep and screen frames on demand.

use std::collections::VecDeque;

use rfe_protocol::spectrum::{Model, TrackingStatus};
use rfe_protocol::Frequency;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::device::VirtualDevice;

/// Configuration for creating a virtual analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualAnalyzerConfig {
    /// Main radio module model
    pub model: Model,
    /// Expansion module model, if the unit carries one
    pub expansion_model: Option<Model>,
    /// Firmware version string reported in setup info
    pub firmware_version: String,
    /// 16-character serial number
    pub serial_number: String,
    /// Initial sweep start frequency
    pub start_hz: u64,
    /// Initial sweep stop frequency
    pub stop_hz: u64,
    /// Initial sweep point count
    pub sweep_points: u16,
    /// A silent unit never answers; used to simulate a port with no
    /// RF Explorer behind it
    pub silent: bool,
}

impl Default for VirtualAnalyzerConfig {
    fn default() -> Self {
        Self {
            model: Model::RfeWSub1G,
            expansion_model: None,
            firmware_version: "01.12B26".to_string(),
            serial_number: "B3AK7AL7CACAA74M".to_string(),
            start_hz: 240_000_000,
            stop_hz: 250_000_000,
            sweep_points: 112,
            silent: false,
        }
    }
}

/// A simulated RF Explorer spectrum analyzer
#[derive(Debug)]
pub struct VirtualAnalyzer {
    config: VirtualAnalyzerConfig,
    start: Frequency,
    stop: Frequency,
    sweep_points: u16,
    min_amp_dbm: i16,
    max_amp_dbm: i16,
    calc_mode: u8,
    expansion_active: bool,
    dump_screen: bool,
    input: Vec<u8>,
    pending_output: VecDeque<Vec<u8>>,
}

impl VirtualAnalyzer {
    pub fn new(model: Model) -> Self {
        Self::from_config(VirtualAnalyzerConfig {
            model,
            ..VirtualAnalyzerConfig::default()
        })
    }

    pub fn from_config(config: VirtualAnalyzerConfig) -> Self {
        let start = Frequency::from_hz(config.start_hz);
        let stop = Frequency::from_hz(config.stop_hz);
        let sweep_points = config.sweep_points;
        Self {
            config,
            start,
            stop,
            sweep_points,
            min_amp_dbm: -120,
            max_amp_dbm: -10,
            calc_mode: 0,
            expansion_active: false,
            dump_screen: false,
            input: Vec::new(),
            pending_output: VecDeque::new(),
        }
    }

    fn active_model(&self) -> Model {
        if self.expansion_active {
            self.config.expansion_model.unwrap_or(self.config.model)
        } else {
            self.config.model
        }
    }

    /// Whether dump-screen mode is currently on
    pub fn is_dump_screen_enabled(&self) -> bool {
        self.dump_screen
    }

    /// Current sweep window as (start, stop)
    pub fn sweep_range(&self) -> (Frequency, Frequency) {
        (self.start, self.stop)
    }

    /// Queues one sweep frame. Amplitudes encode one byte per point as
    /// `-2 * dBm`; counts above 255 use the large frame format.
    pub fn emit_sweep(&mut self, amplitudes_dbm: &[f32]) {
        let payload: Vec<u8> = amplitudes_dbm
            .iter()
            .map(|&dbm| (dbm * -2.0).clamp(0.0, 255.0) as u8)
            .collect();

        let mut frame = if payload.len() <= 255 {
            let mut f = vec![b'$', b'S', payload.len() as u8];
            f.extend(&payload);
            f
        } else {
            let len = (payload.len() as u16).to_be_bytes();
            let mut f = vec![b'$', b'z', len[0], len[1]];
            f.extend(&payload);
            f
        };
        frame.extend(b"\r\n");
        self.pending_output.push_back(frame);
    }

    /// Queues one screen frame from a raw 8x128 page bitmap
    pub fn emit_screen(&mut self, bitmap: &[u8; 1024]) {
        let mut frame = vec![b'$', b'D'];
        frame.extend_from_slice(bitmap);
        frame.extend(b"\r\n");
        self.pending_output.push_back(frame);
    }

    fn step_hz(&self) -> u64 {
        let span = self.stop - self.start;
        span.as_hz() / u64::from(self.sweep_points.max(2) - 1)
    }

    fn setup_line(&self) -> Vec<u8> {
        let expansion = self
            .config
            .expansion_model
            .map(|m| m.code())
            .unwrap_or(255);
        format!(
            "#C2-M:{:03},{:03},{}\r\n",
            self.config.model.code(),
            expansion,
            self.config.firmware_version
        )
        .into_bytes()
    }

    fn config_line(&self) -> Vec<u8> {
        let model = self.active_model();
        let points = if self.sweep_points > 9999 {
            format!("{:05}", self.sweep_points)
        } else {
            format!("{:04}", self.sweep_points)
        };
        format!(
            "#C2-F:{:07},{:07},{:04},{:04},{},{},000,{:07},{:07},{:07},00110,0000,{:03}\r\n",
            self.start.as_khz(),
            self.step_hz(),
            self.max_amp_dbm,
            self.min_amp_dbm,
            points,
            u8::from(self.expansion_active),
            model.min_freq().as_khz(),
            model.max_freq().as_khz(),
            model.max_span().as_khz(),
            self.calc_mode,
        )
        .into_bytes()
    }

    fn handle_frame(&mut self, frame: &[u8]) {
        if self.config.silent {
            return;
        }

        let payload = &frame[2..];
        match payload {
            b"C0" => {
                let setup = self.setup_line();
                let config = self.config_line();
                self.pending_output.push_back(setup);
                self.pending_output.push_back(config);
            }
            b"Cn" => {
                let line = format!("#Sn{}\r\n", self.config.serial_number).into_bytes();
                self.pending_output.push_back(line);
            }
            b"D1" => self.dump_screen = true,
            b"D0" => self.dump_screen = false,
            [b'C', b'M', module] => {
                if self.config.expansion_model.is_some() {
                    self.expansion_active = *module == 1;
                    let config = self.config_line();
                    self.pending_output.push_back(config);
                }
            }
            [b'C', b'+', calc_mode] => {
                self.calc_mode = *calc_mode;
                let config = self.config_line();
                self.pending_output.push_back(config);
            }
            [b'C', b'p', dsp_mode] => {
                let line = format!("DSP:{dsp_mode}\r\n").into_bytes();
                self.pending_output.push_back(line);
            }
            [b'a', stage] => {
                self.pending_output.push_back(vec![b'#', b'a', *stage, b'\r', b'\n']);
            }
            [b'C', b'J', n] => {
                self.set_sweep_points((u16::from(*n) + 1) * 16);
            }
            [b'C', b'j', hi, lo] => {
                self.set_sweep_points(u16::from_be_bytes([*hi, *lo]));
            }
            _ if payload.starts_with(b"C2-F:") => {
                self.apply_set_config(&payload[5..]);
            }
            _ if payload.starts_with(b"C3-K:") => {
                self.pending_output
                    .push_back(vec![b'#', b'K', TrackingStatus::Enabled as u8, b'\r', b'\n']);
            }
            _ => {
                debug!("virtual analyzer ignoring command {:?}", String::from_utf8_lossy(payload));
            }
        }
    }

    fn set_sweep_points(&mut self, requested: u16) {
        self.sweep_points = if requested < 112 {
            112
        } else {
            (requested / 16) * 16
        };
        let config = self.config_line();
        self.pending_output.push_back(config);
    }

    /// `C2-F:<start_khz>,<stop_khz>,<max_amp>,<min_amp>`
    fn apply_set_config(&mut self, body: &[u8]) {
        let Ok(body) = std::str::from_utf8(body) else {
            return;
        };
        let fields: Vec<&str> = body.split(',').collect();
        if fields.len() != 4 {
            return;
        }
        let (Ok(start_khz), Ok(stop_khz), Ok(max_amp), Ok(min_amp)) = (
            fields[0].parse::<u64>(),
            fields[1].parse::<u64>(),
            fields[2].parse::<i16>(),
            fields[3].parse::<i16>(),
        ) else {
            return;
        };

        self.start = Frequency::from_khz(start_khz);
        self.stop = Frequency::from_khz(stop_khz);
        self.max_amp_dbm = max_amp;
        self.min_amp_dbm = min_amp;
        let config = self.config_line();
        self.pending_output.push_back(config);
    }
}

impl VirtualDevice for VirtualAnalyzer {
    fn handle_input(&mut self, bytes: &[u8]) {
        self.input.extend_from_slice(bytes);

        loop {
            // Commands are framed as `#<len><payload>` with len
            // covering the whole frame
            match self.input.first() {
                None => break,
                Some(&b'#') => {}
                Some(_) => {
                    self.input.remove(0);
                    continue;
                }
            }
            let Some(&len) = self.input.get(1) else {
                break;
            };
            let len = usize::from(len);
            if len < 3 {
                self.input.drain(..2);
                continue;
            }
            if self.input.len() < len {
                break;
            }
            let frame: Vec<u8> = self.input.drain(..len).collect();
            self.handle_frame(&frame);
        }
    }

    fn take_output(&mut self) -> Option<Vec<u8>> {
        self.pending_output.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(device: &mut VirtualAnalyzer) -> Vec<u8> {
        let mut all = Vec::new();
        while let Some(frame) = device.take_output() {
            all.extend(frame);
        }
        all
    }

    #[test]
    fn test_handshake_reports_setup_and_config() {
        let mut device = VirtualAnalyzer::new(Model::RfeWSub1G);
        device.handle_input(&[b'#', 4, b'C', b'0']);

        let output = String::from_utf8(drain(&mut device)).unwrap();
        assert!(output.starts_with("#C2-M:003,255,01.12B26\r\n"));
        assert!(output.contains("#C2-F:"));
    }

    #[test]
    fn test_silent_device_never_answers() {
        let mut device = VirtualAnalyzer::from_config(VirtualAnalyzerConfig {
            silent: true,
            ..VirtualAnalyzerConfig::default()
        });
        device.handle_input(&[b'#', 4, b'C', b'0']);
        assert!(device.take_output().is_none());
    }

    #[test]
    fn test_set_config_echoes_new_window() {
        let mut device = VirtualAnalyzer::new(Model::RfeWSub1G);
        device.handle_input(&[b'#', 4, b'C', b'0']);
        let _ = drain(&mut device);

        let mut frame = vec![b'#', 32];
        frame.extend(b"C2-F:0300000,0310000,-020,-110");
        device.handle_input(&frame);

        let output = String::from_utf8(drain(&mut device)).unwrap();
        assert!(output.starts_with("#C2-F:0300000,"));
        assert!(output.contains(",-020,-110,"));
        let (start, stop) = device.sweep_range();
        assert_eq!(start.as_khz(), 300_000);
        assert_eq!(stop.as_khz(), 310_000);
    }

    #[test]
    fn test_command_split_across_inputs() {
        let mut device = VirtualAnalyzer::new(Model::RfeWSub1G);
        device.handle_input(&[b'#', 4]);
        assert!(device.take_output().is_none());
        device.handle_input(&[b'C', b'0']);
        assert!(device.take_output().is_some());
    }

    #[test]
    fn test_sweep_emission_encodes_amplitudes() {
        let mut device = VirtualAnalyzer::new(Model::RfeWSub1G);
        device.emit_sweep(&[-114.0, -50.0]);

        let frame = device.take_output().unwrap();
        assert_eq!(&frame[..3], &[b'$', b'S', 2]);
        assert_eq!(&frame[3..5], &[228, 100]);
    }

    #[test]
    fn test_large_sweep_uses_z_frame() {
        let mut device = VirtualAnalyzer::new(Model::RfeWSub1GPlus);
        device.emit_sweep(&vec![-100.0; 512]);

        let frame = device.take_output().unwrap();
        assert_eq!(&frame[..2], &[b'$', b'z']);
        assert_eq!(u16::from_be_bytes([frame[2], frame[3]]), 512);
    }

    #[test]
    fn test_dump_screen_toggle() {
        let mut device = VirtualAnalyzer::new(Model::RfeWSub1G);
        device.handle_input(&[b'#', 4, b'D', b'1']);
        assert!(device.is_dump_screen_enabled());
        device.handle_input(&[b'#', 4, b'D', b'0']);
        assert!(!device.is_dump_screen_enabled());
    }
}
