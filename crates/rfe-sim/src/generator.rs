//! Virtual signal generator
//!
//! A simulated generator unit: answers the handshake with setup info
//! and a combined configuration report, and echoes the matching
//! per-mode configuration line when a mode-start command arrives, the
//! way real firmware confirms those commands.

use std::collections::VecDeque;

use rfe_protocol::generator::Model;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::device::VirtualDevice;

/// Configuration for creating a virtual generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualGeneratorConfig {
    /// Main radio module model
    pub model: Model,
    /// Expansion module model, if the unit carries one
    pub expansion_model: Option<Model>,
    /// Firmware version string reported in setup info
    pub firmware_version: String,
    /// 16-character serial number
    pub serial_number: String,
}

impl Default for VirtualGeneratorConfig {
    fn default() -> Self {
        Self {
            model: Model::RfGen,
            expansion_model: None,
            firmware_version: "01.31".to_string(),
            serial_number: "GEN7AL7CACAA74M0".to_string(),
        }
    }
}

/// A simulated RF Explorer signal generator
#[derive(Debug)]
pub struct VirtualGenerator {
    config: VirtualGeneratorConfig,
    rf_power_on: bool,
    input: Vec<u8>,
    pending_output: VecDeque<Vec<u8>>,
}

impl VirtualGenerator {
    pub fn new() -> Self {
        Self::from_config(VirtualGeneratorConfig::default())
    }

    pub fn from_config(config: VirtualGeneratorConfig) -> Self {
        Self {
            config,
            rf_power_on: false,
            input: Vec::new(),
            pending_output: VecDeque::new(),
        }
    }

    /// Whether the RF output stage is currently powered
    pub fn is_rf_power_on(&self) -> bool {
        self.rf_power_on
    }

    fn rf_power_code(&self) -> u8 {
        u8::from(!self.rf_power_on)
    }

    fn setup_line(&self) -> Vec<u8> {
        let expansion = self
            .config
            .expansion_model
            .map(|m| m.code())
            .unwrap_or(255);
        format!(
            "#C3-M:{:03},{:03},{}\r\n",
            self.config.model.code(),
            expansion,
            self.config.firmware_version
        )
        .into_bytes()
    }

    fn combined_config_line(&self) -> Vec<u8> {
        format!(
            "#C3-*:0186525,0186525,0005,0001000,0,3,0004,0,0,1,3,{},00100\r\n",
            self.rf_power_code()
        )
        .into_bytes()
    }

    fn handle_frame(&mut self, frame: &[u8]) {
        let payload = &frame[2..];
        match payload {
            b"C0" => {
                let setup = self.setup_line();
                let config = self.combined_config_line();
                self.pending_output.push_back(setup);
                self.pending_output.push_back(config);
            }
            b"Cn" => {
                let line = format!("#Sn{}\r\n", self.config.serial_number).into_bytes();
                self.pending_output.push_back(line);
            }
            b"CP1" => {
                self.rf_power_on = true;
                let config = self.combined_config_line();
                self.pending_output.push_back(config);
            }
            b"CP0" => {
                self.rf_power_on = false;
                let config = self.combined_config_line();
                self.pending_output.push_back(config);
            }
            _ if payload.starts_with(b"C3-F:") => self.echo_c3f(&payload[5..]),
            _ if payload.starts_with(b"C3-A:") => self.echo_amp_sweep(&payload[5..]),
            _ if payload.starts_with(b"C5-F:") => self.echo_c5f(&payload[5..]),
            _ if payload.starts_with(b"C5-A:") => self.echo_amp_sweep_exp(&payload[5..]),
            _ => {
                debug!(
                    "virtual generator ignoring command {:?}",
                    String::from_utf8_lossy(payload)
                );
            }
        }
    }

    /// `C3-F:` starts CW mode (3 fields) or a frequency sweep (6
    /// fields); each is confirmed by its own config line
    fn echo_c3f(&mut self, body: &[u8]) {
        let Ok(body) = std::str::from_utf8(body) else {
            return;
        };
        let fields: Vec<&str> = body.split(',').collect();
        let line = match fields.as_slice() {
            [cw, att, power] => {
                format!(
                    "#C3-G:{cw},{cw},0000,0000000,{att},{power},{}\r\n",
                    self.rf_power_code()
                )
            }
            [start, att, power, steps, step, delay] => {
                format!(
                    "#C3-F:{start},{steps},{step},{att},{power},{},{delay}\r\n",
                    self.rf_power_code()
                )
            }
            _ => return,
        };
        self.pending_output.push_back(line.into_bytes());
    }

    fn echo_amp_sweep(&mut self, body: &[u8]) {
        let Ok(body) = std::str::from_utf8(body) else {
            return;
        };
        let fields: Vec<&str> = body.split(',').collect();
        if let [cw, start_att, start_power, stop_att, stop_power, delay] = fields.as_slice() {
            let line = format!(
                "#C3-A:{cw},0000,{start_att},{start_power},{stop_att},{stop_power},{},{delay}\r\n",
                self.rf_power_code()
            );
            self.pending_output.push_back(line.into_bytes());
        }
    }

    /// `C5-F:` starts expansion CW (2 fields) or an expansion
    /// frequency sweep (5 fields)
    fn echo_c5f(&mut self, body: &[u8]) {
        let Ok(body) = std::str::from_utf8(body) else {
            return;
        };
        let fields: Vec<&str> = body.split(',').collect();
        let line = match fields.as_slice() {
            [cw, power] => format!("#C5-G:{cw},{power},{}\r\n", self.rf_power_code()),
            [start, power, steps, step, delay] => {
                format!("#C5-F:{start},{power},{steps},{step},{delay}\r\n")
            }
            _ => return,
        };
        self.pending_output.push_back(line.into_bytes());
    }

    fn echo_amp_sweep_exp(&mut self, body: &[u8]) {
        let Ok(body) = std::str::from_utf8(body) else {
            return;
        };
        let fields: Vec<&str> = body.split(',').collect();
        if let [cw, start_power, step_power, stop_power, delay] = fields.as_slice() {
            let line = format!("#C5-A:{cw},{start_power},{step_power},{stop_power},{delay}\r\n");
            self.pending_output.push_back(line.into_bytes());
        }
    }
}

impl Default for VirtualGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualDevice for VirtualGenerator {
    fn handle_input(&mut self, bytes: &[u8]) {
        self.input.extend_from_slice(bytes);

        loop {
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

    fn drain(device: &mut VirtualGenerator) -> String {
        let mut all = Vec::new();
        while let Some(frame) = device.take_output() {
            all.extend(frame);
        }
        String::from_utf8(all).unwrap()
    }

    #[test]
    fn test_handshake_reports_setup_and_combined_config() {
        let mut device = VirtualGenerator::new();
        device.handle_input(&[b'#', 4, b'C', b'0']);

        let output = drain(&mut device);
        assert!(output.starts_with("#C3-M:060,255,01.31\r\n"));
        assert!(output.contains("#C3-*:"));
    }

    #[test]
    fn test_cw_start_echoes_cw_config() {
        let mut device = VirtualGenerator::new();
        let mut frame = vec![b'#', 18];
        frame.extend(b"C3-F:0186525,0,3");
        device.handle_input(&frame);

        let output = drain(&mut device);
        assert!(output.starts_with("#C3-G:0186525,0186525,"));
    }

    #[test]
    fn test_freq_sweep_start_echoes_sweep_config() {
        let mut device = VirtualGenerator::new();
        let mut frame = vec![b'#', 37];
        frame.extend(b"C3-F:0186525,0,3,0005,0001000,00100");
        device.handle_input(&frame);

        let output = drain(&mut device);
        assert!(output.starts_with("#C3-F:0186525,0005,0001000,0,3,"));
    }

    #[test]
    fn test_rf_power_toggle() {
        let mut device = VirtualGenerator::new();
        device.handle_input(&[b'#', 5, b'C', b'P', b'1']);
        assert!(device.is_rf_power_on());
        let output = drain(&mut device);
        // RF power on encodes as 0 in the config report
        assert!(output.contains(",0,00100"));

        device.handle_input(&[b'#', 5, b'C', b'P', b'0']);
        assert!(!device.is_rf_power_on());
    }
}
