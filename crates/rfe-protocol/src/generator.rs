//! Signal generator protocol
//!
//! Message parsing and command encoding for the signal generator
//! family. The generator reports a different configuration message per
//! operating mode: `#C3-*:` (combined), `#C3-A:` (amplitude sweep),
//! `#C3-G:` (CW), `#C3-F:` (frequency sweep), plus `#C5-` variants for
//! the expansion module, which trades the attenuator/power-level pair
//! for a direct dBm power field.

use std::fmt::Display;
use std::time::Duration;

use crate::command::EncodeCommand;
use crate::error::ParseError;
use crate::frame::{Fields, FrameBuffer, RawFrame};
use crate::frequency::Frequency;
use crate::screen::ScreenData;
use crate::serial_number::SerialNumber;
use crate::setup::SetupInfo;
use crate::spectrum::strip_ascii_prefix;
use crate::ProtocolCodec;

/// Signal generator model reported in setup info
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Model {
    RfGen,
    RfGenExpansion,
}

impl Model {
    /// The wire code this model reports in setup info
    pub const fn code(&self) -> u8 {
        match self {
            Model::RfGen => 60,
            Model::RfGenExpansion => 61,
        }
    }

    pub fn min_freq(&self) -> Frequency {
        match self {
            Self::RfGen => 23_400_000,
            Self::RfGenExpansion => 100_000,
        }
        .into()
    }

    pub fn max_freq(&self) -> Frequency {
        Frequency::from_hz(6_000_000_000)
    }
}

impl TryFrom<u8> for Model {
    type Error = ParseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            60 => Ok(Model::RfGen),
            61 => Ok(Model::RfGenExpansion),
            _ => Err(ParseError::InvalidValue(code, "generator model")),
        }
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RfGen => write!(f, "RFGen"),
            Self::RfGenExpansion => write!(f, "RFGen Expansion"),
        }
    }
}

/// Internal 30 dB attenuator state
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attenuation {
    #[default]
    On,
    Off,
}

impl Attenuation {
    fn to_wire(self) -> u8 {
        match self {
            Attenuation::On => 0,
            Attenuation::Off => 1,
        }
    }
}

impl TryFrom<u8> for Attenuation {
    type Error = ParseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Attenuation::On),
            1 => Ok(Attenuation::Off),
            _ => Err(ParseError::InvalidValue(code, "attenuation")),
        }
    }
}

/// Coarse output power level
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PowerLevel {
    #[default]
    Lowest,
    Low,
    High,
    Highest,
}

impl PowerLevel {
    fn to_wire(self) -> u8 {
        match self {
            PowerLevel::Lowest => 0,
            PowerLevel::Low => 1,
            PowerLevel::High => 2,
            PowerLevel::Highest => 3,
        }
    }
}

impl TryFrom<u8> for PowerLevel {
    type Error = ParseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(PowerLevel::Lowest),
            1 => Ok(PowerLevel::Low),
            2 => Ok(PowerLevel::High),
            3 => Ok(PowerLevel::Highest),
            _ => Err(ParseError::InvalidValue(code, "power level")),
        }
    }
}

/// Whether the RF output stage is powered
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RfPower {
    On,
    #[default]
    Off,
}

impl TryFrom<u8> for RfPower {
    type Error = ParseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RfPower::On),
            1 => Ok(RfPower::Off),
            _ => Err(ParseError::InvalidValue(code, "rf power")),
        }
    }
}

/// Internal temperature band (`#T:`)
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Temperature {
    MinusTenToZero,
    ZeroToTen,
    TenToTwenty,
    TwentyToThirty,
    ThirtyToForty,
    FortyToFifty,
    FiftyToSixty,
}

impl TryFrom<u8> for Temperature {
    type Error = ParseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            b'0' => Ok(Temperature::MinusTenToZero),
            b'1' => Ok(Temperature::ZeroToTen),
            b'2' => Ok(Temperature::TenToTwenty),
            b'3' => Ok(Temperature::TwentyToThirty),
            b'4' => Ok(Temperature::ThirtyToForty),
            b'5' => Ok(Temperature::FortyToFifty),
            b'6' => Ok(Temperature::FiftyToSixty),
            _ => Err(ParseError::InvalidValue(code, "temperature band")),
        }
    }
}

impl Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let range = match self {
            Temperature::MinusTenToZero => "-10 to 0 C",
            Temperature::ZeroToTen => "0 to 10 C",
            Temperature::TenToTwenty => "10 to 20 C",
            Temperature::TwentyToThirty => "20 to 30 C",
            Temperature::ThirtyToForty => "30 to 40 C",
            Temperature::FortyToFifty => "40 to 50 C",
            Temperature::FiftyToSixty => "50 to 60 C",
        };
        write!(f, "{range}")
    }
}

/// Combined mode report covering every generator setting (`#C3-*:`)
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    pub start: Frequency,
    pub cw: Frequency,
    pub total_steps: u32,
    pub step: Frequency,
    pub attenuation: Attenuation,
    pub power_level: PowerLevel,
    pub sweep_power_steps: u16,
    pub start_attenuation: Attenuation,
    pub start_power_level: PowerLevel,
    pub stop_attenuation: Attenuation,
    pub stop_power_level: PowerLevel,
    pub rf_power: RfPower,
    pub sweep_delay: Duration,
}

impl Config {
    pub const PREFIX: &'static [u8] = b"#C3-*:";

    fn parse_body(body: &str) -> Result<Self, ParseError> {
        let mut fields = Fields::new(body);
        Ok(Config {
            start: fields.khz()?,
            cw: fields.khz()?,
            total_steps: fields.num()?,
            step: fields.khz()?,
            attenuation: Attenuation::try_from(fields.num::<u8>()?)?,
            power_level: PowerLevel::try_from(fields.num::<u8>()?)?,
            sweep_power_steps: fields.num()?,
            start_attenuation: Attenuation::try_from(fields.num::<u8>()?)?,
            start_power_level: PowerLevel::try_from(fields.num::<u8>()?)?,
            stop_attenuation: Attenuation::try_from(fields.num::<u8>()?)?,
            stop_power_level: PowerLevel::try_from(fields.num::<u8>()?)?,
            rf_power: RfPower::try_from(fields.num::<u8>()?)?,
            sweep_delay: Duration::from_millis(fields.num::<u64>()?),
        })
    }
}

/// Amplitude sweep mode report (`#C3-A:`)
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigAmpSweep {
    pub cw: Frequency,
    pub sweep_power_steps: u16,
    pub start_attenuation: Attenuation,
    pub start_power_level: PowerLevel,
    pub stop_attenuation: Attenuation,
    pub stop_power_level: PowerLevel,
    pub rf_power: RfPower,
    pub sweep_delay: Duration,
}

impl ConfigAmpSweep {
    pub const PREFIX: &'static [u8] = b"#C3-A:";

    fn parse_body(body: &str) -> Result<Self, ParseError> {
        let mut fields = Fields::new(body);
        Ok(ConfigAmpSweep {
            cw: fields.khz()?,
            sweep_power_steps: fields.num()?,
            start_attenuation: Attenuation::try_from(fields.num::<u8>()?)?,
            start_power_level: PowerLevel::try_from(fields.num::<u8>()?)?,
            stop_attenuation: Attenuation::try_from(fields.num::<u8>()?)?,
            stop_power_level: PowerLevel::try_from(fields.num::<u8>()?)?,
            rf_power: RfPower::try_from(fields.num::<u8>()?)?,
            sweep_delay: Duration::from_millis(fields.num::<u64>()?),
        })
    }
}

/// CW mode report (`#C3-G:`)
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigCw {
    pub cw: Frequency,
    pub total_steps: u32,
    pub step: Frequency,
    pub attenuation: Attenuation,
    pub power_level: PowerLevel,
    pub rf_power: RfPower,
}

impl ConfigCw {
    pub const PREFIX: &'static [u8] = b"#C3-G:";

    fn parse_body(body: &str) -> Result<Self, ParseError> {
        let mut fields = Fields::new(body);
        let cw = fields.khz()?;
        // The CW frequency is sent twice; ignore the second occurrence
        let _ = fields.khz()?;
        Ok(ConfigCw {
            cw,
            total_steps: fields.num()?,
            step: fields.khz()?,
            attenuation: Attenuation::try_from(fields.num::<u8>()?)?,
            power_level: PowerLevel::try_from(fields.num::<u8>()?)?,
            rf_power: RfPower::try_from(fields.num::<u8>()?)?,
        })
    }
}

/// Frequency sweep mode report (`#C3-F:`)
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigFreqSweep {
    pub start: Frequency,
    pub total_steps: u32,
    pub step: Frequency,
    pub attenuation: Attenuation,
    pub power_level: PowerLevel,
    pub rf_power: RfPower,
    pub sweep_delay: Duration,
}

impl ConfigFreqSweep {
    pub const PREFIX: &'static [u8] = b"#C3-F:";

    fn parse_body(body: &str) -> Result<Self, ParseError> {
        let mut fields = Fields::new(body);
        Ok(ConfigFreqSweep {
            start: fields.khz()?,
            total_steps: fields.num()?,
            step: fields.khz()?,
            attenuation: Attenuation::try_from(fields.num::<u8>()?)?,
            power_level: PowerLevel::try_from(fields.num::<u8>()?)?,
            rf_power: RfPower::try_from(fields.num::<u8>()?)?,
            sweep_delay: Duration::from_millis(fields.num::<u64>()?),
        })
    }
}

/// Expansion module CW report (`#C5-G:`)
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigCwExp {
    pub cw: Frequency,
    pub power_dbm: f32,
    pub rf_power: RfPower,
}

impl ConfigCwExp {
    pub const PREFIX: &'static [u8] = b"#C5-G:";

    fn parse_body(body: &str) -> Result<Self, ParseError> {
        let mut fields = Fields::new(body);
        Ok(ConfigCwExp {
            cw: fields.khz()?,
            power_dbm: fields.num()?,
            rf_power: RfPower::try_from(fields.num::<u8>()?)?,
        })
    }
}

/// Expansion module amplitude sweep report (`#C5-A:`)
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigAmpSweepExp {
    pub cw: Frequency,
    pub start_power_dbm: f32,
    pub step_power_db: f32,
    pub stop_power_dbm: f32,
    pub sweep_delay: Duration,
}

impl ConfigAmpSweepExp {
    pub const PREFIX: &'static [u8] = b"#C5-A:";

    fn parse_body(body: &str) -> Result<Self, ParseError> {
        let mut fields = Fields::new(body);
        Ok(ConfigAmpSweepExp {
            cw: fields.khz()?,
            start_power_dbm: fields.num()?,
            step_power_db: fields.num()?,
            stop_power_dbm: fields.num()?,
            sweep_delay: Duration::from_millis(fields.num::<u64>()?),
        })
    }
}

/// Expansion module frequency sweep report (`#C5-F:`)
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigFreqSweepExp {
    pub start: Frequency,
    pub power_dbm: f32,
    pub total_steps: u32,
    pub step: Frequency,
    pub sweep_delay: Duration,
}

impl ConfigFreqSweepExp {
    pub const PREFIX: &'static [u8] = b"#C5-F:";

    fn parse_body(body: &str) -> Result<Self, ParseError> {
        let mut fields = Fields::new(body);
        Ok(ConfigFreqSweepExp {
            start: fields.khz()?,
            power_dbm: fields.num()?,
            total_steps: fields.num()?,
            step: fields.khz()?,
            sweep_delay: Duration::from_millis(fields.num::<u64>()?),
        })
    }
}

/// One decoded signal generator message
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Config(Config),
    ConfigAmpSweep(ConfigAmpSweep),
    ConfigCw(ConfigCw),
    ConfigFreqSweep(ConfigFreqSweep),
    ConfigCwExp(ConfigCwExp),
    ConfigAmpSweepExp(ConfigAmpSweepExp),
    ConfigFreqSweepExp(ConfigFreqSweepExp),
    ScreenData(ScreenData),
    SetupInfo(SetupInfo<Model>),
    SerialNumber(SerialNumber),
    Temperature(Temperature),
    Unrecognized(Vec<u8>),
}

impl Message {
    pub(crate) fn parse_line(line: &[u8]) -> Result<Option<Message>, ParseError> {
        const SETUP_PREFIX: &[u8] = b"#C3-M:";
        const SERIAL_PREFIX: &[u8] = b"#Sn";
        const TEMPERATURE_PREFIX: &[u8] = b"#T:";

        if let Some(body) = strip_ascii_prefix(line, Config::PREFIX) {
            return Ok(Some(Message::Config(Config::parse_body(body)?)));
        }
        if let Some(body) = strip_ascii_prefix(line, ConfigAmpSweep::PREFIX) {
            return Ok(Some(Message::ConfigAmpSweep(ConfigAmpSweep::parse_body(
                body,
            )?)));
        }
        if let Some(body) = strip_ascii_prefix(line, ConfigCw::PREFIX) {
            return Ok(Some(Message::ConfigCw(ConfigCw::parse_body(body)?)));
        }
        if let Some(body) = strip_ascii_prefix(line, ConfigFreqSweep::PREFIX) {
            return Ok(Some(Message::ConfigFreqSweep(ConfigFreqSweep::parse_body(
                body,
            )?)));
        }
        if let Some(body) = strip_ascii_prefix(line, ConfigCwExp::PREFIX) {
            return Ok(Some(Message::ConfigCwExp(ConfigCwExp::parse_body(body)?)));
        }
        if let Some(body) = strip_ascii_prefix(line, ConfigAmpSweepExp::PREFIX) {
            return Ok(Some(Message::ConfigAmpSweepExp(
                ConfigAmpSweepExp::parse_body(body)?,
            )));
        }
        if let Some(body) = strip_ascii_prefix(line, ConfigFreqSweepExp::PREFIX) {
            return Ok(Some(Message::ConfigFreqSweepExp(
                ConfigFreqSweepExp::parse_body(body)?,
            )));
        }
        if let Some(body) = strip_ascii_prefix(line, SETUP_PREFIX) {
            return Ok(Some(Message::SetupInfo(SetupInfo::parse_body(body)?)));
        }
        if let Some(body) = strip_ascii_prefix(line, SERIAL_PREFIX) {
            return Ok(Some(Message::SerialNumber(SerialNumber::parse_body(body)?)));
        }
        if let Some(rest) = line.strip_prefix(TEMPERATURE_PREFIX) {
            return match rest.first() {
                Some(&code) => Ok(Some(Message::Temperature(Temperature::try_from(code)?))),
                None => Err(ParseError::InvalidFrame("empty temperature".into())),
            };
        }

        Ok(None)
    }
}

/// Commands specific to the signal generator family
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Command {
    RfPowerOn,
    RfPowerOff,
    StartCw {
        cw: Frequency,
        attenuation: Attenuation,
        power_level: PowerLevel,
    },
    StartCwExp {
        cw: Frequency,
        power_dbm: f64,
    },
    StartAmpSweep {
        cw: Frequency,
        start_attenuation: Attenuation,
        start_power_level: PowerLevel,
        stop_attenuation: Attenuation,
        stop_power_level: PowerLevel,
        step_delay: Duration,
    },
    StartAmpSweepExp {
        cw: Frequency,
        start_power_dbm: f64,
        step_power_db: f64,
        stop_power_dbm: f64,
        step_delay: Duration,
    },
    StartFreqSweep {
        start: Frequency,
        attenuation: Attenuation,
        power_level: PowerLevel,
        sweep_steps: u16,
        step: Frequency,
        step_delay: Duration,
    },
    StartFreqSweepExp {
        start: Frequency,
        power_dbm: f64,
        sweep_steps: u16,
        step: Frequency,
        step_delay: Duration,
    },
    StartTracking {
        start: Frequency,
        attenuation: Attenuation,
        power_level: PowerLevel,
        sweep_steps: u16,
        step: Frequency,
    },
    StartTrackingExp {
        start: Frequency,
        power_dbm: f64,
        sweep_steps: u16,
        step: Frequency,
    },
    TrackingStep(u16),
}

/// Frames an ASCII payload as `#<len><payload>`
fn frame_ascii(payload: String) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(payload.len() + 2);
    bytes.push(b'#');
    bytes.push((payload.len() + 2) as u8);
    bytes.extend(payload.bytes());
    bytes
}

impl EncodeCommand for Command {
    fn encode(&self) -> Vec<u8> {
        match *self {
            Command::RfPowerOn => vec![b'#', 5, b'C', b'P', b'1'],
            Command::RfPowerOff => vec![b'#', 5, b'C', b'P', b'0'],
            Command::StartCw {
                cw,
                attenuation,
                power_level,
            } => frame_ascii(format!(
                "C3-F:{:07},{},{}",
                cw.as_khz(),
                attenuation.to_wire(),
                power_level.to_wire()
            )),
            Command::StartCwExp { cw, power_dbm } => {
                frame_ascii(format!("C5-F:{:07},{:+05.1}", cw.as_khz(), power_dbm))
            }
            Command::StartAmpSweep {
                cw,
                start_attenuation,
                start_power_level,
                stop_attenuation,
                stop_power_level,
                step_delay,
            } => frame_ascii(format!(
                "C3-A:{:07},{},{},{},{},{:05}",
                cw.as_khz(),
                start_attenuation.to_wire(),
                start_power_level.to_wire(),
                stop_attenuation.to_wire(),
                stop_power_level.to_wire(),
                step_delay.as_millis()
            )),
            Command::StartAmpSweepExp {
                cw,
                start_power_dbm,
                step_power_db,
                stop_power_dbm,
                step_delay,
            } => frame_ascii(format!(
                "C5-A:{:07},{:+05.1},{:+05.1},{:05.1},{:05}",
                cw.as_khz(),
                start_power_dbm,
                step_power_db,
                stop_power_dbm,
                step_delay.as_millis()
            )),
            Command::StartFreqSweep {
                start,
                attenuation,
                power_level,
                sweep_steps,
                step,
                step_delay,
            } => frame_ascii(format!(
                "C3-F:{:07},{},{},{:04},{:07},{:05}",
                start.as_khz(),
                attenuation.to_wire(),
                power_level.to_wire(),
                sweep_steps,
                step.as_khz(),
                step_delay.as_millis()
            )),
            Command::StartFreqSweepExp {
                start,
                power_dbm,
                sweep_steps,
                step,
                step_delay,
            } => frame_ascii(format!(
                "C5-F:{:07},{:+05.1},{:04},{:07},{:05}",
                start.as_khz(),
                power_dbm,
                sweep_steps,
                step.as_khz(),
                step_delay.as_millis()
            )),
            Command::StartTracking {
                start,
                attenuation,
                power_level,
                sweep_steps,
                step,
            } => frame_ascii(format!(
                "C3-T:{:07},{},{},{:04},{:07}",
                start.as_khz(),
                attenuation.to_wire(),
                power_level.to_wire(),
                sweep_steps,
                step.as_khz()
            )),
            Command::StartTrackingExp {
                start,
                power_dbm,
                sweep_steps,
                step,
            } => frame_ascii(format!(
                "C5-T:{:07},{:+05.1},{:04},{:07}",
                start.as_khz(),
                power_dbm,
                sweep_steps,
                step.as_khz()
            )),
            Command::TrackingStep(steps) => {
                let steps = steps.to_be_bytes();
                vec![b'#', 5, b'k', steps[0], steps[1]]
            }
        }
    }
}

/// Streaming codec turning raw bytes into signal generator messages
#[derive(Debug, Default)]
pub struct GeneratorCodec {
    frames: FrameBuffer,
}

impl GeneratorCodec {
    pub fn new() -> Self {
        Self {
            frames: FrameBuffer::new(),
        }
    }
}

impl ProtocolCodec for GeneratorCodec {
    type Message = Message;

    fn push_bytes(&mut self, data: &[u8]) {
        self.frames.push_bytes(data);
    }

    fn next_message(&mut self) -> Option<Message> {
        loop {
            match self.frames.next_frame()? {
                // Generators do not produce sweep frames; surface the
                // payload rather than silently eating it
                RawFrame::Sweep(payload) => return Some(Message::Unrecognized(payload)),
                RawFrame::Screen(payload) => match ScreenData::from_payload(&payload) {
                    Ok(screen) => return Some(Message::ScreenData(screen)),
                    Err(err) => {
                        tracing::warn!("dropping malformed screen frame: {err}");
                        continue;
                    }
                },
                RawFrame::Line(line) => match Message::parse_line(&line) {
                    Ok(Some(message)) => return Some(message),
                    Ok(None) => return Some(Message::Unrecognized(line)),
                    Err(err) => {
                        tracing::warn!(
                            "dropping malformed message {:?}: {err}",
                            String::from_utf8_lossy(&line)
                        );
                        continue;
                    }
                },
            }
        }
    }

    fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_combined_config() {
        let body = "0186525,0186525,0005,0001000,0,3,0004,0,0,1,3,0,00100";
        let config = Config::parse_body(body).unwrap();
        assert_eq!(config.start.as_khz(), 186_525);
        assert_eq!(config.cw.as_khz(), 186_525);
        assert_eq!(config.total_steps, 5);
        assert_eq!(config.step.as_khz(), 1_000);
        assert_eq!(config.attenuation, Attenuation::On);
        assert_eq!(config.power_level, PowerLevel::Highest);
        assert_eq!(config.sweep_power_steps, 4);
        assert_eq!(config.stop_attenuation, Attenuation::Off);
        assert_eq!(config.stop_power_level, PowerLevel::Highest);
        assert_eq!(config.rf_power, RfPower::On);
        assert_eq!(config.sweep_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_parse_amp_sweep_config() {
        let config = ConfigAmpSweep::parse_body("0186525,0000,0,0,1,3,0,00100").unwrap();
        assert_eq!(config.cw.as_khz(), 186_525);
        assert_eq!(config.sweep_power_steps, 0);
        assert_eq!(config.start_attenuation, Attenuation::On);
        assert_eq!(config.start_power_level, PowerLevel::Lowest);
        assert_eq!(config.stop_attenuation, Attenuation::Off);
        assert_eq!(config.stop_power_level, PowerLevel::Highest);
        assert_eq!(config.rf_power, RfPower::On);
        assert_eq!(config.sweep_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_parse_cw_config_ignores_duplicate_freq() {
        let config = ConfigCw::parse_body("0186525,0186525,0005,0001000,0,3,0").unwrap();
        assert_eq!(config.cw.as_khz(), 186_525);
        assert_eq!(config.total_steps, 5);
        assert_eq!(config.step.as_khz(), 1_000);
        assert_eq!(config.rf_power, RfPower::On);
    }

    #[test]
    fn test_parse_freq_sweep_config() {
        let config = ConfigFreqSweep::parse_body("0186525,0005,0001000,0,3,0,00100").unwrap();
        assert_eq!(config.start.as_khz(), 186_525);
        assert_eq!(config.total_steps, 5);
        assert_eq!(config.step.as_khz(), 1_000);
        assert_eq!(config.attenuation, Attenuation::On);
        assert_eq!(config.power_level, PowerLevel::Highest);
        assert_eq!(config.sweep_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_parse_cw_exp_config() {
        let config = ConfigCwExp::parse_body("0186525,-10.5,0").unwrap();
        assert_eq!(config.cw.as_khz(), 186_525);
        assert_eq!(config.power_dbm, -10.5);
        assert_eq!(config.rf_power, RfPower::On);
    }

    #[test]
    fn test_codec_decodes_setup_and_config() {
        let mut codec = GeneratorCodec::new();
        codec.push_bytes(b"#C3-M:060,255,01.31\r\n");
        codec.push_bytes(b"#C3-G:0186525,0186525,0005,0001000,0,3,0\r\n");

        match codec.next_message() {
            Some(Message::SetupInfo(setup)) => {
                assert_eq!(setup.main_radio_module.model(), Model::RfGen);
                assert!(setup.expansion_radio_module.is_none());
                assert_eq!(setup.firmware_version, "01.31");
            }
            other => panic!("expected setup info, got {other:?}"),
        }
        assert!(matches!(
            codec.next_message(),
            Some(Message::ConfigCw(_))
        ));
    }

    #[test]
    fn test_start_cw_encoding() {
        let bytes = Command::StartCw {
            cw: Frequency::from_khz(186_525),
            attenuation: Attenuation::On,
            power_level: PowerLevel::Highest,
        }
        .encode();
        assert_eq!(&bytes[2..], b"C3-F:0186525,0,3".as_ref());
        assert_eq!(usize::from(bytes[1]), bytes.len());
    }

    #[test]
    fn test_start_freq_sweep_encoding() {
        let bytes = Command::StartFreqSweep {
            start: Frequency::from_khz(186_525),
            attenuation: Attenuation::On,
            power_level: PowerLevel::Highest,
            sweep_steps: 5,
            step: Frequency::from_khz(1_000),
            step_delay: Duration::from_millis(100),
        }
        .encode();
        assert_eq!(&bytes[2..], b"C3-F:0186525,0,3,0005,0001000,00100".as_ref());
        assert_eq!(usize::from(bytes[1]), bytes.len());
    }

    #[test]
    fn test_start_cw_exp_encoding() {
        let bytes = Command::StartCwExp {
            cw: Frequency::from_khz(186_525),
            power_dbm: -10.5,
        }
        .encode();
        assert_eq!(&bytes[2..], b"C5-F:0186525,-10.5".as_ref());
    }

    #[test]
    fn test_rf_power_commands() {
        assert_eq!(Command::RfPowerOn.encode(), [b'#', 5, b'C', b'P', b'1']);
        assert_eq!(Command::RfPowerOff.encode(), [b'#', 5, b'C', b'P', b'0']);
    }

    #[test]
    fn test_freq_sweep_command_round_trips_through_echo() {
        // The device echoes a C3-F config line when a frequency sweep
        // starts; encoding then parsing must preserve the parameters
        let command = Command::StartFreqSweep {
            start: Frequency::from_khz(200_000),
            attenuation: Attenuation::Off,
            power_level: PowerLevel::Low,
            sweep_steps: 20,
            step: Frequency::from_khz(500),
            step_delay: Duration::from_millis(50),
        };
        let encoded = command.encode();
        let body = std::str::from_utf8(&encoded[7..]).unwrap();

        let config = ConfigFreqSweep::parse_body(body).unwrap();
        assert_eq!(config.start.as_khz(), 200_000);
        assert_eq!(config.attenuation, Attenuation::Off);
        assert_eq!(config.power_level, PowerLevel::Low);
        assert_eq!(config.total_steps, 20);
        assert_eq!(config.step.as_khz(), 500);
        assert_eq!(config.sweep_delay, Duration::from_millis(50));
    }
}
