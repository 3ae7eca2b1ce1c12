//! Spectrum analyzer protocol
//!
//! Message parsing and command encoding for the spectrum analyzer
//! family. Inbound messages:
//!
//! - `#C2-F:` - current configuration
//! - `#C2-M:` - setup info (modules + firmware)
//! - `$S`/`$s`/`$z` - sweep data
//! - `$D` - screen data
//! - `#Sn` - serial number
//! - `DSP:` - DSP mode report
//! - `#a` - input stage report
//! - `#K` - tracking status report

use std::fmt::Display;

use crate::command::EncodeCommand;
use crate::error::ParseError;
use crate::frame::{Fields, FrameBuffer, RawFrame};
use crate::frequency::Frequency;
use crate::screen::ScreenData;
use crate::serial_number::SerialNumber;
use crate::setup::SetupInfo;
use crate::sweep::Sweep;
use crate::ProtocolCodec;

/// Spectrum analyzer model reported in setup info
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Model {
    Rfe433M,
    Rfe868M,
    Rfe915M,
    RfeWSub1G,
    Rfe24G,
    RfeWSub3G,
    Rfe6G,
    RfeWSub1GPlus,
    RfeProAudio,
    Rfe24GPlus,
    Rfe4GPlus,
    Rfe6GPlus,
    RfeMW5G3G,
    RfeMW5G4G,
    RfeMW5G5G,
    #[default]
    Unknown,
}

impl Model {
    /// The wire code this model reports in setup info
    pub const fn code(&self) -> u8 {
        match self {
            Model::Rfe433M => 0,
            Model::Rfe868M => 1,
            Model::Rfe915M => 2,
            Model::RfeWSub1G => 3,
            Model::Rfe24G => 4,
            Model::RfeWSub3G => 5,
            Model::Rfe6G => 6,
            Model::RfeWSub1GPlus => 10,
            Model::RfeProAudio => 11,
            Model::Rfe24GPlus => 12,
            Model::Rfe4GPlus => 13,
            Model::Rfe6GPlus => 14,
            Model::RfeMW5G3G => 16,
            Model::RfeMW5G4G => 17,
            Model::RfeMW5G5G => 18,
            Model::Unknown => 19,
        }
    }

    pub const fn is_plus_model(&self) -> bool {
        matches!(
            self,
            Model::RfeWSub1GPlus
                | Model::RfeProAudio
                | Model::Rfe24GPlus
                | Model::Rfe4GPlus
                | Model::Rfe6GPlus
                | Model::RfeMW5G3G
                | Model::RfeMW5G4G
                | Model::RfeMW5G5G
        )
    }

    pub const fn has_wifi_analyzer(&self) -> bool {
        matches!(
            self,
            Model::Rfe24G
                // The IoT module MWSub3G reports itself as a WSub3G but
                // does not support the Wi-Fi analyzer mode
                | Model::RfeWSub3G
                | Model::Rfe6G
                | Model::Rfe24GPlus
                | Model::Rfe4GPlus
                | Model::Rfe6GPlus
        )
    }

    pub fn min_freq(&self) -> Frequency {
        match self {
            Model::Rfe433M => 430_000_000,
            Model::Rfe868M => 860_000_000,
            Model::Rfe915M => 910_000_000,
            Model::RfeWSub1G => 240_000_000,
            Model::RfeWSub1GPlus => 50_000,
            Model::Rfe24G | Model::Rfe24GPlus => 2_350_000_000,
            Model::RfeWSub3G
            | Model::RfeProAudio
            | Model::RfeMW5G3G
            | Model::RfeMW5G4G
            | Model::RfeMW5G5G => 15_000_000,
            Model::Rfe6G => 4_850_000_000,
            Model::Rfe4GPlus | Model::Rfe6GPlus => 240_000_000,
            Model::Unknown => u64::MIN,
        }
        .into()
    }

    pub fn max_freq(&self) -> Frequency {
        match self {
            Model::Rfe433M => 440_000_000,
            Model::Rfe868M => 870_000_000,
            Model::Rfe915M => 920_000_000,
            Model::RfeWSub1G | Model::RfeWSub1GPlus => 960_000_000,
            Model::Rfe24G | Model::Rfe24GPlus => 2_550_000_000,
            Model::RfeWSub3G | Model::RfeProAudio => 2_700_000_000,
            Model::Rfe4GPlus => 4_000_000_000,
            Model::Rfe6G | Model::Rfe6GPlus => 6_100_000_000,
            Model::RfeMW5G3G => 3_000_000_000,
            Model::RfeMW5G4G => 4_000_000_000,
            Model::RfeMW5G5G => 5_000_000_000,
            Model::Unknown => u64::MAX,
        }
        .into()
    }

    pub fn min_span(&self) -> Frequency {
        match self {
            Model::Rfe433M
            | Model::Rfe868M
            | Model::Rfe915M
            | Model::RfeWSub1G
            | Model::RfeWSub3G
            | Model::RfeProAudio
            // The minimum spans of MW5G models are not documented
            | Model::RfeMW5G3G
            | Model::RfeMW5G4G
            | Model::RfeMW5G5G => 112_000,
            Model::RfeWSub1GPlus => 100_000,
            Model::Rfe24G
            | Model::Rfe24GPlus
            | Model::Rfe4GPlus
            | Model::Rfe6G
            | Model::Rfe6GPlus => 2_000_000,
            Model::Unknown => u64::MIN,
        }
        .into()
    }

    pub fn max_span(&self) -> Frequency {
        match self {
            Model::Rfe433M | Model::Rfe868M | Model::Rfe915M => 10_000_000,
            Model::Rfe24G | Model::Rfe24GPlus => 85_000_000,
            // The maximum spans of MW5G models are not documented
            Model::RfeWSub1G | Model::RfeMW5G3G | Model::RfeMW5G4G | Model::RfeMW5G5G => {
                300_000_000
            }
            Model::RfeWSub3G | Model::RfeProAudio | Model::Rfe6G => 600_000_000,
            Model::RfeWSub1GPlus => 959_950_000,
            Model::Rfe4GPlus | Model::Rfe6GPlus => 960_000_000,
            Model::Unknown => u64::MAX,
        }
        .into()
    }
}

impl TryFrom<u8> for Model {
    type Error = ParseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Model::Rfe433M,
            1 => Model::Rfe868M,
            2 => Model::Rfe915M,
            3 => Model::RfeWSub1G,
            4 => Model::Rfe24G,
            5 => Model::RfeWSub3G,
            6 => Model::Rfe6G,
            10 => Model::RfeWSub1GPlus,
            11 => Model::RfeProAudio,
            12 => Model::Rfe24GPlus,
            13 => Model::Rfe4GPlus,
            14 => Model::Rfe6GPlus,
            16 => Model::RfeMW5G3G,
            17 => Model::RfeMW5G4G,
            18 => Model::RfeMW5G5G,
            // Future models must not break the handshake
            _ => Model::Unknown,
        })
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Rfe433M => "433M",
            Self::Rfe868M => "868M",
            Self::Rfe915M => "915M",
            Self::RfeWSub1G => "WSUB1G",
            Self::Rfe24G => "2.4G",
            Self::RfeWSub3G => "WSUB3G",
            Self::Rfe6G => "6G",
            Self::RfeWSub1GPlus => "WSUB1G+",
            Self::RfeProAudio => "Pro Audio",
            Self::Rfe24GPlus => "2.4G+",
            Self::Rfe4GPlus => "4G+",
            Self::Rfe6GPlus => "6G+",
            Self::RfeMW5G3G => "MW5G 3GHz",
            Self::RfeMW5G4G => "MW5G 4GHz",
            Self::RfeMW5G5G => "MW5G 5GHz",
            Self::Unknown => "Unknown",
        };
        write!(f, "{name}")
    }
}

/// Operating mode reported in the configuration message
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    #[default]
    SpectrumAnalyzer,
    RfGenerator,
    WifiAnalyzer,
    AnalyzerTracking,
    RfSniffer,
    CwTransmitter,
    SweepFrequency,
    SweepAmplitude,
    GeneratorTracking,
    Unknown,
}

impl TryFrom<u8> for Mode {
    type Error = ParseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Mode::SpectrumAnalyzer,
            1 => Mode::RfGenerator,
            2 => Mode::WifiAnalyzer,
            5 => Mode::AnalyzerTracking,
            6 => Mode::RfSniffer,
            60 => Mode::CwTransmitter,
            61 => Mode::SweepFrequency,
            62 => Mode::SweepAmplitude,
            63 => Mode::GeneratorTracking,
            _ => Mode::Unknown,
        })
    }
}

/// Trace calculator applied to sweeps on the device
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalcMode {
    #[default]
    Normal,
    Max,
    Avg,
    Overwrite,
    MaxHold,
    MaxHistorical,
    Unknown,
}

impl CalcMode {
    fn to_wire(self) -> u8 {
        match self {
            CalcMode::Normal => 0,
            CalcMode::Max => 1,
            CalcMode::Avg => 2,
            CalcMode::Overwrite => 3,
            CalcMode::MaxHold => 4,
            CalcMode::MaxHistorical => 5,
            CalcMode::Unknown => 255,
        }
    }
}

impl TryFrom<u8> for CalcMode {
    type Error = ParseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => CalcMode::Normal,
            1 => CalcMode::Max,
            2 => CalcMode::Avg,
            3 => CalcMode::Overwrite,
            4 => CalcMode::MaxHold,
            5 => CalcMode::MaxHistorical,
            _ => CalcMode::Unknown,
        })
    }
}

/// DSP filtering mode
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DspMode {
    #[default]
    Auto,
    Filter,
    Fast,
    NoImg,
}

impl DspMode {
    fn to_wire(self) -> u8 {
        match self {
            DspMode::Auto => 0,
            DspMode::Filter => 1,
            DspMode::Fast => 2,
            DspMode::NoImg => 3,
        }
    }
}

impl TryFrom<u8> for DspMode {
    type Error = ParseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(DspMode::Auto),
            1 => Ok(DspMode::Filter),
            2 => Ok(DspMode::Fast),
            3 => Ok(DspMode::NoImg),
            _ => Err(ParseError::InvalidValue(code, "DSP mode")),
        }
    }
}

/// RF input stage selection (Plus models)
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputStage {
    Direct,
    Attenuator30dB,
    Lna25dB,
    Attenuator60dB,
    Lna12dB,
}

impl InputStage {
    fn to_wire(self) -> u8 {
        match self {
            InputStage::Direct => b'0',
            InputStage::Attenuator30dB => b'1',
            InputStage::Lna25dB => b'2',
            InputStage::Attenuator60dB => b'3',
            InputStage::Lna12dB => b'4',
        }
    }
}

impl TryFrom<u8> for InputStage {
    type Error = ParseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            b'0' => Ok(InputStage::Direct),
            b'1' => Ok(InputStage::Attenuator30dB),
            b'2' => Ok(InputStage::Lna25dB),
            b'3' => Ok(InputStage::Attenuator60dB),
            b'4' => Ok(InputStage::Lna12dB),
            _ => Err(ParseError::InvalidValue(code, "input stage")),
        }
    }
}

/// Whether tracking mode is active on the device
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum TrackingStatus {
    #[default]
    Disabled,
    Enabled,
}

/// Wi-Fi analyzer band selection
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WifiBand {
    TwoPointFourGhz,
    FiveGhz,
}

impl WifiBand {
    fn to_wire(self) -> u8 {
        match self {
            WifiBand::TwoPointFourGhz => 1,
            WifiBand::FiveGhz => 2,
        }
    }
}

/// Snapshot of the analyzer's operating parameters (`#C2-F:`)
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    pub start: Frequency,
    pub step: Frequency,
    pub stop: Frequency,
    pub center: Frequency,
    pub span: Frequency,
    pub max_amp_dbm: i16,
    pub min_amp_dbm: i16,
    pub sweep_points: u16,
    pub is_expansion_radio_module_active: bool,
    pub mode: Mode,
    pub min_freq: Frequency,
    pub max_freq: Frequency,
    pub max_span: Frequency,
    /// Not sent by older firmware
    pub rbw: Option<Frequency>,
    /// Not sent by older firmware
    pub amp_offset_db: Option<i16>,
    /// Not sent by older firmware
    pub calc_mode: Option<CalcMode>,
}

impl Config {
    pub const PREFIX: &'static [u8] = b"#C2-F:";

    fn parse_body(body: &str) -> Result<Self, ParseError> {
        let mut fields = Fields::new(body);

        let start = fields.khz()?;
        // The step field is in Hz, unlike every other frequency field
        let step = Frequency::from_hz(fields.num()?);
        let max_amp_dbm: i16 = fields.num()?;
        let min_amp_dbm: i16 = fields.num()?;
        let sweep_points: u16 = fields.num()?;
        let expansion_active: u8 = fields.num()?;
        if expansion_active > 1 {
            return Err(ParseError::InvalidValue(
                expansion_active,
                "expansion module flag",
            ));
        }
        let mode = Mode::try_from(fields.num::<u8>()?)?;
        let min_freq = fields.khz()?;
        let max_freq = fields.khz()?;
        let max_span = fields.khz()?;

        // Optional tail, absent on older firmware
        let rbw = fields.khz_opt();
        let amp_offset_db = fields.num_opt::<i16>();
        let calc_mode = fields
            .num_opt::<u8>()
            .map(CalcMode::try_from)
            .transpose()?;

        if sweep_points == 0 {
            return Err(ParseError::InvalidFrame("config with zero sweep points".into()));
        }

        let stop = start + step * u64::from(sweep_points - 1);

        Ok(Config {
            start,
            step,
            stop,
            center: (start + stop) / 2,
            span: stop - start,
            max_amp_dbm,
            min_amp_dbm,
            sweep_points,
            is_expansion_radio_module_active: expansion_active == 1,
            mode,
            min_freq,
            max_freq,
            max_span,
            rbw,
            amp_offset_db,
            calc_mode,
        })
    }

    /// Whether this config reflects a requested start/stop/amplitude
    /// window, allowing for the device snapping frequencies to its step
    /// grid.
    pub fn contains_start_stop_amp_range(
        &self,
        start: Frequency,
        stop: Frequency,
        min_amp_dbm: i16,
        max_amp_dbm: i16,
    ) -> bool {
        self.start.abs_diff(start) <= self.step
            && self.stop.abs_diff(stop) <= self.step * 2
            && self.min_amp_dbm == min_amp_dbm
            && self.max_amp_dbm == max_amp_dbm
    }
}

/// One decoded spectrum analyzer message
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Config(Config),
    Sweep(Sweep),
    ScreenData(ScreenData),
    DspMode(DspMode),
    InputStage(InputStage),
    TrackingStatus(TrackingStatus),
    SetupInfo(SetupInfo<Model>),
    SerialNumber(SerialNumber),
    /// A well-formed line this engine does not recognize. Unknown
    /// prefixes must never crash the parser; firmware adds new
    /// messages over time.
    Unrecognized(Vec<u8>),
}

impl Message {
    pub(crate) fn parse_line(line: &[u8]) -> Result<Option<Message>, ParseError> {
        const SETUP_PREFIX: &[u8] = b"#C2-M:";
        const SERIAL_PREFIX: &[u8] = b"#Sn";
        const DSP_PREFIX: &[u8] = b"DSP:";
        const INPUT_STAGE_PREFIX: &[u8] = b"#a";
        const TRACKING_PREFIX: &[u8] = b"#K";

        if let Some(body) = strip_ascii_prefix(line, Config::PREFIX) {
            return Ok(Some(Message::Config(Config::parse_body(body)?)));
        }
        if let Some(body) = strip_ascii_prefix(line, SETUP_PREFIX) {
            return Ok(Some(Message::SetupInfo(SetupInfo::parse_body(body)?)));
        }
        if let Some(body) = strip_ascii_prefix(line, SERIAL_PREFIX) {
            return Ok(Some(Message::SerialNumber(SerialNumber::parse_body(body)?)));
        }
        if let Some(body) = strip_ascii_prefix(line, DSP_PREFIX) {
            let code: u8 = body
                .trim()
                .parse()
                .map_err(|_| ParseError::InvalidNumber(body.into()))?;
            return Ok(Some(Message::DspMode(DspMode::try_from(code)?)));
        }
        // Tracking status carries a raw byte, not an ASCII digit
        if let Some(rest) = line.strip_prefix(TRACKING_PREFIX) {
            return match rest.first() {
                Some(0) => Ok(Some(Message::TrackingStatus(TrackingStatus::Disabled))),
                Some(1) => Ok(Some(Message::TrackingStatus(TrackingStatus::Enabled))),
                Some(&code) => Err(ParseError::InvalidValue(code, "tracking status")),
                None => Err(ParseError::InvalidFrame("empty tracking status".into())),
            };
        }
        if let Some(rest) = line.strip_prefix(INPUT_STAGE_PREFIX) {
            return match rest.first() {
                Some(&code) => Ok(Some(Message::InputStage(InputStage::try_from(code)?))),
                None => Err(ParseError::InvalidFrame("empty input stage".into())),
            };
        }

        Ok(None)
    }
}

pub(crate) fn strip_ascii_prefix<'a>(line: &'a [u8], prefix: &[u8]) -> Option<&'a str> {
    let rest = line.strip_prefix(prefix)?;
    std::str::from_utf8(rest).ok()
}

/// Commands specific to the spectrum analyzer family
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Command {
    SetConfig {
        start: Frequency,
        stop: Frequency,
        min_amp_dbm: i16,
        max_amp_dbm: i16,
    },
    SwitchModuleMain,
    SwitchModuleExp,
    StartTracking {
        start: Frequency,
        step: Frequency,
    },
    TrackingStep(u16),
    StartWifiAnalyzer(WifiBand),
    StopWifiAnalyzer,
    SetCalcMode(CalcMode),
    SetDsp(DspMode),
    SetOffsetDB(i8),
    SetInputStage(InputStage),
    /// Sweep point counts up to 4096, encoded as `points / 16 - 1`
    SetSweepPointsExt(u16),
    /// Sweep point counts above 4096, encoded as a big-endian `u16`
    SetSweepPointsLarge(u16),
}

impl EncodeCommand for Command {
    fn encode(&self) -> Vec<u8> {
        match *self {
            Command::SetConfig {
                start,
                stop,
                min_amp_dbm,
                max_amp_dbm,
            } => {
                let mut bytes = vec![b'#', 32];
                bytes.extend(
                    format!(
                        "C2-F:{:07},{:07},{:04},{:04}",
                        start.as_khz(),
                        stop.as_khz(),
                        max_amp_dbm,
                        min_amp_dbm
                    )
                    .bytes(),
                );
                bytes
            }
            Command::SwitchModuleMain => vec![b'#', 5, b'C', b'M', 0],
            Command::SwitchModuleExp => vec![b'#', 5, b'C', b'M', 1],
            Command::StartTracking { start, step } => {
                let mut bytes = vec![b'#', 22];
                bytes.extend(
                    format!("C3-K:{:07},{:07}", start.as_khz(), step.as_khz()).bytes(),
                );
                bytes
            }
            Command::TrackingStep(steps) => {
                let steps = steps.to_be_bytes();
                vec![b'#', 5, b'k', steps[0], steps[1]]
            }
            Command::StartWifiAnalyzer(band) => vec![b'#', 5, b'C', b'W', band.to_wire()],
            Command::StopWifiAnalyzer => vec![b'#', 5, b'C', b'W', 0],
            Command::SetCalcMode(calc_mode) => vec![b'#', 5, b'C', b'+', calc_mode.to_wire()],
            Command::SetDsp(dsp_mode) => vec![b'#', 5, b'C', b'p', dsp_mode.to_wire()],
            Command::SetOffsetDB(offset_db) => vec![b'#', 5, b'C', b'O', offset_db as u8],
            Command::SetInputStage(input_stage) => vec![b'#', 4, b'a', input_stage.to_wire()],
            Command::SetSweepPointsExt(sweep_points) => {
                vec![b'#', 5, b'C', b'J', ((sweep_points / 16) - 1) as u8]
            }
            Command::SetSweepPointsLarge(sweep_points) => {
                let points = sweep_points.to_be_bytes();
                vec![b'#', 6, b'C', b'j', points[0], points[1]]
            }
        }
    }
}

/// Streaming codec turning raw bytes into spectrum analyzer messages
#[derive(Debug, Default)]
pub struct SpectrumCodec {
    frames: FrameBuffer,
}

impl SpectrumCodec {
    pub fn new() -> Self {
        Self {
            frames: FrameBuffer::new(),
        }
    }
}

impl ProtocolCodec for SpectrumCodec {
    type Message = Message;

    fn push_bytes(&mut self, data: &[u8]) {
        self.frames.push_bytes(data);
    }

    fn next_message(&mut self) -> Option<Message> {
        loop {
            match self.frames.next_frame()? {
                RawFrame::Sweep(payload) => {
                    return Some(Message::Sweep(Sweep::from_amplitude_bytes(&payload)))
                }
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
    fn test_parse_6g_combo_config() {
        let body = "5249000,0196428,-030,-118,0112,0,000,4850000,6100000,0600000,00200,0000,000";
        let config = Config::parse_body(body).unwrap();
        assert_eq!(config.start.as_hz(), 5_249_000_000);
        assert_eq!(config.step.as_hz(), 196_428);
        assert_eq!(config.stop.as_hz(), 5_270_803_508);
        assert_eq!(config.center.as_hz(), 5_259_901_754);
        assert_eq!(config.span.as_hz(), 21_803_508);
        assert_eq!(config.max_amp_dbm, -30);
        assert_eq!(config.min_amp_dbm, -118);
        assert_eq!(config.sweep_points, 112);
        assert!(!config.is_expansion_radio_module_active);
        assert_eq!(config.mode, Mode::SpectrumAnalyzer);
        assert_eq!(config.min_freq.as_hz(), 4_850_000_000);
        assert_eq!(config.max_freq.as_hz(), 6_100_000_000);
        assert_eq!(config.max_span.as_hz(), 600_000_000);
        assert_eq!(config.rbw, Some(Frequency::from_khz(200)));
        assert_eq!(config.amp_offset_db, Some(0));
        assert_eq!(config.calc_mode, Some(CalcMode::Normal));
    }

    #[test]
    fn test_parse_wsub1g_plus_config() {
        let body = "0096000,0090072,-010,-120,0112,0,000,0000050,0960000,0959950,00110,0000,000";
        let config = Config::parse_body(body).unwrap();
        assert_eq!(config.start.as_hz(), 96_000_000);
        assert_eq!(config.step.as_hz(), 90_072);
        assert_eq!(config.min_freq.as_hz(), 50_000);
        assert_eq!(config.max_freq.as_hz(), 960_000_000);
        assert_eq!(config.max_span.as_hz(), 959_950_000);
        assert_eq!(config.rbw, Some(Frequency::from_khz(110)));
    }

    #[test]
    fn test_parse_config_without_optional_tail() {
        let body = "5249000,0196428,-030,-118,0112,0,000,4850000,6100000,0600000";
        let config = Config::parse_body(body).unwrap();
        assert_eq!(config.rbw, None);
        assert_eq!(config.amp_offset_db, None);
        assert_eq!(config.calc_mode, None);
    }

    #[test]
    fn test_reject_config_with_bad_start_freq() {
        let body = "XX96000,0090072,-010,-120,0112,0,000,0000050,0960000,0959950";
        assert!(Config::parse_body(body).is_err());
    }

    #[test]
    fn test_codec_decodes_config_line() {
        let mut codec = SpectrumCodec::new();
        codec.push_bytes(
            b"#C2-F:0096000,0090072,-010,-120,0112,0,000,0000050,0960000,0959950\r\n",
        );

        match codec.next_message() {
            Some(Message::Config(config)) => assert_eq!(config.sweep_points, 112),
            other => panic!("expected config, got {other:?}"),
        }
        assert!(codec.next_message().is_none());
    }

    #[test]
    fn test_codec_decodes_sweep_between_lines() {
        let mut codec = SpectrumCodec::new();
        codec.push_bytes(b"#K\x01\r\n");
        codec.push_bytes(&[b'$', b'S', 3, 228, 100, 0, b'\r', b'\n']);
        codec.push_bytes(b"DSP:2\r\n");

        assert_eq!(
            codec.next_message(),
            Some(Message::TrackingStatus(TrackingStatus::Enabled))
        );
        match codec.next_message() {
            Some(Message::Sweep(sweep)) => {
                assert_eq!(sweep.amplitudes_dbm(), &[-114.0, -50.0, 0.0])
            }
            other => panic!("expected sweep, got {other:?}"),
        }
        assert_eq!(codec.next_message(), Some(Message::DspMode(DspMode::Fast)));
    }

    #[test]
    fn test_codec_survives_malformed_line() {
        let mut codec = SpectrumCodec::new();
        // Known prefix, broken body: dropped. The next message survives.
        codec.push_bytes(b"#C2-F:garbage\r\n#Sn0SME38SI2X7NGR48\r\n");

        match codec.next_message() {
            Some(Message::SerialNumber(sn)) => assert_eq!(sn.as_str(), "0SME38SI2X7NGR48"),
            other => panic!("expected serial number, got {other:?}"),
        }
    }

    #[test]
    fn test_codec_reports_unknown_prefix() {
        let mut codec = SpectrumCodec::new();
        codec.push_bytes(b"#QRZ:nothing\r\n");

        assert_eq!(
            codec.next_message(),
            Some(Message::Unrecognized(b"#QRZ:nothing".to_vec()))
        );
    }

    #[test]
    fn test_set_config_encoding() {
        let bytes = Command::SetConfig {
            start: Frequency::from_mhz(90),
            stop: Frequency::from_mhz(110),
            min_amp_dbm: -120,
            max_amp_dbm: -40,
        }
        .encode();
        assert_eq!(bytes[..2], [b'#', 32]);
        assert_eq!(&bytes[2..], b"C2-F:0090000,0110000,-040,-120".as_ref());
        assert_eq!(bytes.len(), 32);
    }

    #[test]
    fn test_command_framing_byte_matches_length() {
        use crate::command::tests::assert_framed_len;

        assert_framed_len!(Command::SetConfig {
            start: Frequency::from_mhz(90),
            stop: Frequency::from_mhz(110),
            min_amp_dbm: -120,
            max_amp_dbm: -40,
        });
        assert_framed_len!(Command::SwitchModuleMain);
        assert_framed_len!(Command::SwitchModuleExp);
        assert_framed_len!(Command::StartTracking {
            start: Frequency::from_khz(100_000),
            step: Frequency::from_khz(1_000),
        });
        assert_framed_len!(Command::TrackingStep(4));
        assert_framed_len!(Command::StartWifiAnalyzer(WifiBand::FiveGhz));
        assert_framed_len!(Command::StopWifiAnalyzer);
        assert_framed_len!(Command::SetCalcMode(CalcMode::Normal));
        assert_framed_len!(Command::SetDsp(DspMode::Auto));
        assert_framed_len!(Command::SetOffsetDB(20));
        assert_framed_len!(Command::SetInputStage(InputStage::Direct));
        assert_framed_len!(Command::SetSweepPointsExt(1024));
        assert_framed_len!(Command::SetSweepPointsLarge(8192));
    }

    #[test]
    fn test_model_capability_lookup() {
        assert_eq!(Model::Rfe6G.min_freq().as_hz(), 4_850_000_000);
        assert_eq!(Model::Rfe6G.max_freq().as_hz(), 6_100_000_000);
        assert!(!Model::Rfe6G.is_plus_model());
        assert!(Model::Rfe6GPlus.is_plus_model());
        assert!(Model::Rfe24G.has_wifi_analyzer());
        assert!(!Model::Rfe433M.has_wifi_analyzer());
    }
}
