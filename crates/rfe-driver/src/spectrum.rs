//! Spectrum analyzer device handle
//!
//! [`SpectrumAnalyzer`] is what callers hold for one connected
//! analyzer: identity strings cached at connect time, snapshot
//! accessors over the state the reader loop maintains, blocking
//! next-value waits, subscriber callbacks, and validated command
//! issuers.
//!
//! Callbacks run synchronously on the reader thread. They must not
//! block and must not call back into the same handle's command API;
//! the reader is the only thread that can observe the response such a
//! call would wait for.

use std::ops::RangeInclusive;
use std::time::Duration;

use rfe_protocol::spectrum::{
    CalcMode, Command, Config, DspMode, InputStage, Message, Model, SpectrumCodec,
    TrackingStatus, WifiBand,
};
use rfe_protocol::{
    BaudRate, Command as CommonCommand, Frequency, RadioModule, ScreenData, SerialNumber,
    SetupInfo, Sweep,
};
use tracing::{info, trace};

use crate::device::{check_firmware, Device, MessageSink, COMMAND_RESPONSE_TIMEOUT};
use crate::error::{ConnectError, ConnectResult, Error, Result};
use crate::sync::{CallbackSlot, Latest, WaitError};
use crate::transport::{SerialTransport, Transport, FAST_BAUD_RATE, SLOW_BAUD_RATE};

const NEXT_SWEEP_TIMEOUT: Duration = Duration::from_secs(2);
const NEXT_SCREEN_DATA_TIMEOUT: Duration = Duration::from_secs(2);
const NEXT_CONFIG_TIMEOUT: Duration = Duration::from_secs(2);
const SERIAL_NUMBER_TIMEOUT: Duration = Duration::from_secs(2);

const MIN_MAX_AMP_RANGE_DBM: RangeInclusive<i16> = -120..=35;
const MIN_SWEEP_POINTS: u16 = 112;

/// Which physical radio module should drive sweeps
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ModuleSelection {
    Main,
    Expansion,
}

/// Shared state container for one analyzer, owned jointly by the
/// handle and its reader loop
#[derive(Debug, Default)]
pub(crate) struct SpectrumState {
    config: Latest<Config>,
    sweep: Latest<Sweep>,
    screen_data: Latest<ScreenData>,
    dsp_mode: Latest<DspMode>,
    input_stage: Latest<InputStage>,
    tracking_status: Latest<TrackingStatus>,
    setup_info: Latest<SetupInfo<Model>>,
    serial_number: Latest<SerialNumber>,
    config_callback: CallbackSlot<Config>,
    sweep_callback: CallbackSlot<Sweep>,
}

impl MessageSink for SpectrumState {
    type Codec = SpectrumCodec;

    fn receive(&self, message: Message) {
        match message {
            Message::Config(config) => {
                // Publish first so blocking waiters and the subscriber
                // observe the same delivery
                self.config.publish(config);
                self.config_callback.invoke(config);
            }
            Message::Sweep(sweep) => {
                self.sweep.publish(sweep.clone());
                self.sweep_callback.invoke(sweep);
            }
            Message::ScreenData(screen_data) => self.screen_data.publish(screen_data),
            Message::DspMode(dsp_mode) => self.dsp_mode.publish(dsp_mode),
            Message::InputStage(input_stage) => self.input_stage.publish(input_stage),
            Message::TrackingStatus(status) => self.tracking_status.publish(status),
            Message::SetupInfo(setup_info) => self.setup_info.publish(setup_info),
            Message::SerialNumber(serial_number) => self.serial_number.publish(serial_number),
            Message::Unrecognized(line) => {
                trace!("unrecognized message: {:?}", String::from_utf8_lossy(&line));
            }
        }
    }

    fn wait_for_device_info(&self, timeout: Duration) -> bool {
        self.setup_info.wait_until(timeout, |_| true).is_ok()
            && self.config.wait_until(timeout, |_| true).is_ok()
    }

    fn firmware_version(&self) -> Option<String> {
        self.setup_info.get().map(|setup| setup.firmware_version)
    }

    fn close(&self) {
        self.config.close();
        self.sweep.close();
        self.screen_data.close();
        self.dsp_mode.close();
        self.input_stage.close();
        self.tracking_status.close();
        self.setup_info.close();
        self.serial_number.close();
    }
}

/// A connected RF Explorer spectrum analyzer
///
/// Dropping the handle stops and joins the reader thread and releases
/// the transport; any outstanding blocking wait returns
/// [`Error::Disconnected`].
#[derive(Debug)]
pub struct SpectrumAnalyzer {
    device: Device<SpectrumState>,
}

impl SpectrumAnalyzer {
    /// Connects to the first available RF Explorer spectrum analyzer.
    ///
    /// Tries every CP210x port at the fast default baud rate and then
    /// the slow one; ports that fail to handshake are skipped.
    pub fn connect() -> Option<Self> {
        rfe_detect::explorer_ports()
            .unwrap_or_default()
            .into_iter()
            .flat_map(|port| [(port.clone(), FAST_BAUD_RATE), (port, SLOW_BAUD_RATE)])
            .find_map(|(port, baud_rate)| {
                let transport = SerialTransport::open(&port.port, baud_rate).ok()?;
                Self::connect_transport(transport).ok()
            })
    }

    /// Connects to an RF Explorer with the provided port name and baud
    /// rate.
    pub fn connect_with_name_and_baud_rate(name: &str, baud_rate: u32) -> ConnectResult<Self> {
        let exists = serialport::available_ports()
            .map(|ports| ports.iter().any(|p| p.port_name == name))
            .unwrap_or(false);
        if !exists {
            return Err(ConnectError::PortNotFound(name.to_string()));
        }
        Self::connect_transport(SerialTransport::open(name, baud_rate)?)
    }

    /// Connects to every available RF Explorer spectrum analyzer.
    ///
    /// A port that fails to open or handshake is skipped, never
    /// aborting the scan.
    pub fn connect_all() -> Vec<Self> {
        rfe_detect::explorer_ports()
            .unwrap_or_default()
            .into_iter()
            .flat_map(|port| [(port.clone(), FAST_BAUD_RATE), (port, SLOW_BAUD_RATE)])
            .filter_map(|(port, baud_rate)| {
                let transport = SerialTransport::open(&port.port, baud_rate).ok()?;
                Self::connect_transport(transport).ok()
            })
            .collect()
    }

    /// Connects over an already-open transport. This is the seam
    /// simulated devices and tests plug into.
    pub fn connect_transport(transport: impl Transport + 'static) -> ConnectResult<Self> {
        let device: Device<SpectrumState> = Device::connect(transport)?;
        let version = device.sink().firmware_version().unwrap_or_default();
        check_firmware(&version)?;
        info!(
            "connected to spectrum analyzer on {} (firmware {version})",
            device.port_name()
        );
        Ok(SpectrumAnalyzer { device })
    }

    fn state(&self) -> &SpectrumState {
        self.device.sink()
    }

    /// The name of the serial port this analyzer is connected through
    pub fn port_name(&self) -> &str {
        self.device.port_name()
    }

    /// The baud rate of the serial connection
    pub fn baud_rate(&self) -> Result<u32> {
        self.device.baud_rate().map_err(Error::Io)
    }

    /// Switches the device and then the local port to a new baud rate.
    ///
    /// Valid rates are 1200, 2400, 4800, 9600, 19200, 38400, 57600,
    /// 115200, and 500000 bps.
    pub fn set_baud_rate(&self, baud_rate: u32) -> Result<()> {
        let baud_rate = BaudRate::try_from(baud_rate)
            .map_err(|_| Error::InvalidInput(format!("invalid baud rate: {baud_rate} bps")))?;
        self.device
            .send_command(CommonCommand::SetBaudRate(baud_rate))?;
        self.device
            .set_transport_baud_rate(baud_rate.bps())
            .map_err(Error::Io)
    }

    /// Whether the transport is still alive. Once this reports `false`
    /// the handle is permanently disconnected.
    pub fn is_connected(&self) -> bool {
        self.device.is_connected()
    }

    /// The firmware version reported during the handshake
    pub fn firmware_version(&self) -> String {
        self.state().firmware_version().unwrap_or_default()
    }

    /// The device serial number. Requested from the device on first
    /// call and cached afterwards.
    pub fn serial_number(&self) -> Result<SerialNumber> {
        if let Some(serial_number) = self.state().serial_number.get() {
            return Ok(serial_number);
        }

        self.device
            .send_command(CommonCommand::RequestSerialNumber)?;
        self.state()
            .serial_number
            .wait_until(SERIAL_NUMBER_TIMEOUT, |_| true)
            .map_err(|err| wait_error(err, SERIAL_NUMBER_TIMEOUT))
    }

    /// The main radio module
    pub fn main_radio_module(&self) -> Option<RadioModule<Model>> {
        self.state()
            .setup_info
            .get()
            .map(|setup| setup.main_radio_module)
    }

    /// The expansion radio module, if one is installed
    pub fn expansion_radio_module(&self) -> Option<RadioModule<Model>> {
        self.state()
            .setup_info
            .get()
            .and_then(|setup| setup.expansion_radio_module)
    }

    /// The radio module currently driving sweeps
    pub fn active_radio_module(&self) -> Option<RadioModule<Model>> {
        if self.config()?.is_expansion_radio_module_active {
            self.expansion_radio_module()
        } else {
            self.main_radio_module()
        }
    }

    /// The radio module not currently driving sweeps, if the unit has
    /// two
    pub fn inactive_radio_module(&self) -> Option<RadioModule<Model>> {
        let expansion = self.expansion_radio_module()?;
        if self.config()?.is_expansion_radio_module_active {
            self.main_radio_module()
        } else {
            Some(expansion)
        }
    }

    fn active_model(&self) -> Model {
        self.active_radio_module()
            .map(|module| module.model())
            .unwrap_or_default()
    }

    /// The most recent configuration reported by the analyzer. May be
    /// stale relative to hardware if no update has arrived since a
    /// front-panel change.
    pub fn config(&self) -> Option<Config> {
        self.state().config.get()
    }

    /// The most recent sweep measured by the analyzer, if any has
    /// arrived yet
    pub fn sweep(&self) -> Option<Sweep> {
        self.state().sweep.get()
    }

    /// The most recent screen capture, if any has arrived yet.
    /// Screen frames only flow while dump-screen is enabled.
    pub fn screen_data(&self) -> Option<ScreenData> {
        self.state().screen_data.get()
    }

    /// The analyzer's DSP mode, once it has reported one
    pub fn dsp_mode(&self) -> Option<DspMode> {
        self.state().dsp_mode.get()
    }

    /// The analyzer's RF input stage, once it has reported one
    pub fn input_stage(&self) -> Option<InputStage> {
        self.state().input_stage.get()
    }

    /// Whether tracking mode is active, once the device has reported it
    pub fn tracking_status(&self) -> Option<TrackingStatus> {
        self.state().tracking_status.get()
    }

    /// Blocks until the analyzer measures its next sweep
    pub fn wait_for_next_sweep(&self) -> Result<Sweep> {
        self.wait_for_next_sweep_with_timeout(NEXT_SWEEP_TIMEOUT)
    }

    /// Blocks until the analyzer measures a sweep strictly after call
    /// entry, or the timeout elapses
    pub fn wait_for_next_sweep_with_timeout(&self, timeout: Duration) -> Result<Sweep> {
        self.state()
            .sweep
            .wait_for_next(timeout)
            .map_err(|err| wait_error(err, timeout))
    }

    /// Blocks until the analyzer captures its next screen frame
    pub fn wait_for_next_screen_data(&self) -> Result<ScreenData> {
        self.wait_for_next_screen_data_with_timeout(NEXT_SCREEN_DATA_TIMEOUT)
    }

    /// Blocks until the analyzer captures a screen frame strictly
    /// after call entry, or the timeout elapses
    pub fn wait_for_next_screen_data_with_timeout(&self, timeout: Duration) -> Result<ScreenData> {
        self.state()
            .screen_data
            .wait_for_next(timeout)
            .map_err(|err| wait_error(err, timeout))
    }

    /// Blocks until the analyzer reports its next configuration update
    pub fn wait_for_next_config(&self) -> Result<Config> {
        self.wait_for_next_config_with_timeout(NEXT_CONFIG_TIMEOUT)
    }

    /// Blocks until a configuration update arrives strictly after call
    /// entry, or the timeout elapses
    pub fn wait_for_next_config_with_timeout(&self, timeout: Duration) -> Result<Config> {
        self.state()
            .config
            .wait_for_next(timeout)
            .map_err(|err| wait_error(err, timeout))
    }

    /// Sets the callback invoked for every incoming sweep, replacing
    /// any previous one. The callback runs on the reader thread and
    /// must not call back into this handle.
    pub fn set_sweep_callback(&self, callback: impl FnMut(Sweep) + Send + 'static) {
        self.state().sweep_callback.set(callback);
    }

    /// Removes the sweep callback
    pub fn remove_sweep_callback(&self) {
        self.state().sweep_callback.clear();
    }

    /// Sets the callback invoked for every configuration update,
    /// replacing any previous one
    pub fn set_config_callback(&self, callback: impl FnMut(Config) + Send + 'static) {
        self.state().config_callback.set(callback);
    }

    /// Removes the config callback
    pub fn remove_config_callback(&self) {
        self.state().config_callback.clear();
    }

    /// Sends raw bytes to the analyzer
    pub fn send_bytes(&self, bytes: impl AsRef<[u8]>) -> Result<()> {
        self.device.send_bytes(bytes)
    }

    /// Sets the start and stop frequency of sweeps
    pub fn set_start_stop(
        &self,
        start: impl Into<Frequency>,
        stop: impl Into<Frequency>,
    ) -> Result<()> {
        let config = self.config().unwrap_or_default();
        self.set_config(
            start.into(),
            stop.into(),
            config.min_amp_dbm,
            config.max_amp_dbm,
        )
    }

    /// Sets the start frequency, stop frequency, and sweep point count
    pub fn set_start_stop_sweep_points(
        &self,
        start: impl Into<Frequency>,
        stop: impl Into<Frequency>,
        sweep_points: u16,
    ) -> Result<()> {
        let (start, stop) = (start.into(), stop.into());
        let config = self.config().unwrap_or_default();
        self.set_sweep_points(sweep_points)?;
        self.set_config(start, stop, config.min_amp_dbm, config.max_amp_dbm)
    }

    /// Sets the center frequency and span of sweeps
    pub fn set_center_span(
        &self,
        center: impl Into<Frequency>,
        span: impl Into<Frequency>,
    ) -> Result<()> {
        let (center, span) = (center.into(), span.into());
        self.set_start_stop(center - span / 2, center + span / 2)
    }

    /// Sets the center frequency, span, and sweep point count
    pub fn set_center_span_sweep_points(
        &self,
        center: impl Into<Frequency>,
        span: impl Into<Frequency>,
        sweep_points: u16,
    ) -> Result<()> {
        let (center, span) = (center.into(), span.into());
        self.set_start_stop_sweep_points(center - span / 2, center + span / 2, sweep_points)
    }

    /// Sets the minimum and maximum amplitudes displayed on screen
    pub fn set_min_max_amps(&self, min_amp_dbm: i16, max_amp_dbm: i16) -> Result<()> {
        let config = self.config().unwrap_or_default();
        self.set_config(config.start, config.stop, min_amp_dbm, max_amp_dbm)
    }

    /// Validates, sends, and confirms a configuration change. The
    /// command lock stays held across send plus confirmation so only
    /// one configuration command is ever in flight.
    fn set_config(
        &self,
        start: Frequency,
        stop: Frequency,
        min_amp_dbm: i16,
        max_amp_dbm: i16,
    ) -> Result<()> {
        self.validate_start_stop(start, stop)?;
        validate_min_max_amps(min_amp_dbm, max_amp_dbm)?;

        let _guard = self.device.command_guard();
        self.device.send_command(Command::SetConfig {
            start,
            stop,
            min_amp_dbm,
            max_amp_dbm,
        })?;

        // The device snaps requested frequencies to its step grid, so
        // confirmation allows a one-step tolerance
        self.state()
            .config
            .wait_until(COMMAND_RESPONSE_TIMEOUT, |config| {
                config.contains_start_stop_amp_range(start, stop, min_amp_dbm, max_amp_dbm)
            })
            .map_err(|err| wait_error(err, COMMAND_RESPONSE_TIMEOUT))?;
        Ok(())
    }

    /// Sets the number of points per sweep. Only Plus models support
    /// this; the requested count is rounded down to a multiple of 16
    /// with a floor of 112.
    pub fn set_sweep_points(&self, sweep_points: u16) -> Result<()> {
        if !self.active_model().is_plus_model() {
            return Err(Error::InvalidOperation(
                "only RF Explorer 'Plus' models support setting the number of sweep points"
                    .to_string(),
            ));
        }

        let _guard = self.device.command_guard();
        if sweep_points <= 4096 {
            self.device
                .send_command(Command::SetSweepPointsExt(sweep_points))?;
        } else {
            self.device
                .send_command(Command::SetSweepPointsLarge(sweep_points))?;
        }

        let expected_sweep_points = if sweep_points < MIN_SWEEP_POINTS {
            MIN_SWEEP_POINTS
        } else {
            (sweep_points / 16) * 16
        };

        self.state()
            .config
            .wait_until(COMMAND_RESPONSE_TIMEOUT, |config| {
                config.sweep_points == expected_sweep_points
            })
            .map_err(|err| wait_error(err, COMMAND_RESPONSE_TIMEOUT))?;
        Ok(())
    }

    /// Sets the trace calculator mode
    pub fn set_calc_mode(&self, calc_mode: CalcMode) -> Result<()> {
        self.device.send_command(Command::SetCalcMode(calc_mode))
    }

    /// Switches which radio module drives sweeps. Fails with
    /// `InvalidOperation` on single-module units.
    pub fn set_active_radio_module(&self, module: ModuleSelection) -> Result<()> {
        if self.expansion_radio_module().is_none() {
            return Err(Error::InvalidOperation(format!(
                "this RF Explorer only has one radio module ({})",
                self.active_model()
            )));
        }

        let want_expansion = module == ModuleSelection::Expansion;
        if self
            .config()
            .is_some_and(|c| c.is_expansion_radio_module_active == want_expansion)
        {
            return Ok(());
        }

        let _guard = self.device.command_guard();
        self.device.send_command(match module {
            ModuleSelection::Main => Command::SwitchModuleMain,
            ModuleSelection::Expansion => Command::SwitchModuleExp,
        })?;

        // Switching modules resets the sweep range; the confirming
        // config reports the newly active module
        self.state()
            .config
            .wait_until(COMMAND_RESPONSE_TIMEOUT, |config| {
                config.is_expansion_radio_module_active == want_expansion
            })
            .map_err(|err| wait_error(err, COMMAND_RESPONSE_TIMEOUT))?;
        Ok(())
    }

    /// Sets the DSP mode and waits for the device to confirm it
    pub fn set_dsp_mode(&self, dsp_mode: DspMode) -> Result<()> {
        if self.dsp_mode() == Some(dsp_mode) {
            return Ok(());
        }

        let _guard = self.device.command_guard();
        self.device.send_command(Command::SetDsp(dsp_mode))?;
        self.state()
            .dsp_mode
            .wait_until(COMMAND_RESPONSE_TIMEOUT, |&mode| mode == dsp_mode)
            .map_err(|err| wait_error(err, COMMAND_RESPONSE_TIMEOUT))?;
        Ok(())
    }

    /// Selects the RF input stage (Plus models)
    pub fn set_input_stage(&self, input_stage: InputStage) -> Result<()> {
        if !self.active_model().is_plus_model() {
            return Err(Error::InvalidOperation(
                "only RF Explorer 'Plus' models have a switchable input stage".to_string(),
            ));
        }
        self.device
            .send_command(Command::SetInputStage(input_stage))
    }

    /// Adds or subtracts an offset to the amplitudes in each sweep
    pub fn set_offset_db(&self, offset_db: i8) -> Result<()> {
        self.device.send_command(Command::SetOffsetDB(offset_db))
    }

    /// Requests the analyzer enter tracking mode and reports the
    /// resulting tracking status
    pub fn request_tracking(
        &self,
        start: impl Into<Frequency>,
        step: impl Into<Frequency>,
    ) -> Result<TrackingStatus> {
        let _guard = self.device.command_guard();
        let entry_seq = self.state().tracking_status.seq();
        self.device.send_command(Command::StartTracking {
            start: start.into(),
            step: step.into(),
        })?;
        self.state()
            .tracking_status
            .wait_for_next_after(entry_seq, COMMAND_RESPONSE_TIMEOUT)
            .map_err(|err| wait_error(err, COMMAND_RESPONSE_TIMEOUT))
    }

    /// Steps the tracking generator and measures once. Only valid
    /// after tracking has been started.
    pub fn tracking_step(&self, step: u16) -> Result<()> {
        if self.tracking_status() != Some(TrackingStatus::Enabled) {
            return Err(Error::InvalidOperation(
                "tracking step requires tracking mode to be started first".to_string(),
            ));
        }
        self.device.send_command(Command::TrackingStep(step))
    }

    /// Starts the Wi-Fi analyzer mode on models that have one
    pub fn start_wifi_analyzer(&self, wifi_band: WifiBand) -> Result<()> {
        if !self.active_model().has_wifi_analyzer() {
            return Err(Error::InvalidOperation(format!(
                "the {} does not have a Wi-Fi analyzer",
                self.active_model()
            )));
        }
        self.device
            .send_command(Command::StartWifiAnalyzer(wifi_band))
    }

    /// Stops the Wi-Fi analyzer mode
    pub fn stop_wifi_analyzer(&self) -> Result<()> {
        self.device.send_command(Command::StopWifiAnalyzer)
    }

    /// Turns the LCD screen on
    pub fn lcd_on(&self) -> Result<()> {
        self.device.send_command(CommonCommand::EnableLcd)
    }

    /// Turns the LCD screen off
    pub fn lcd_off(&self) -> Result<()> {
        self.device.send_command(CommonCommand::DisableLcd)
    }

    /// Asks the device to start streaming screen frames
    pub fn enable_dump_screen(&self) -> Result<()> {
        self.device.send_command(CommonCommand::EnableDumpScreen)
    }

    /// Asks the device to stop streaming screen frames
    pub fn disable_dump_screen(&self) -> Result<()> {
        self.device.send_command(CommonCommand::DisableDumpScreen)
    }

    /// Pauses the device's data dump
    pub fn hold(&self) -> Result<()> {
        self.device.send_command(CommonCommand::Hold)
    }

    /// Reboots the device, consuming the handle
    pub fn reboot(self) -> Result<()> {
        self.device.send_command(CommonCommand::Reboot)
    }

    /// Powers the device off, consuming the handle
    pub fn power_off(self) -> Result<()> {
        self.device.send_command(CommonCommand::PowerOff)
    }

    fn validate_start_stop(&self, start: Frequency, stop: Frequency) -> Result<()> {
        if start >= stop {
            return Err(Error::InvalidInput(
                "the start frequency must be less than the stop frequency".to_string(),
            ));
        }

        let model = self.active_model();
        let freq_range = model.min_freq()..=model.max_freq();
        if !freq_range.contains(&start) {
            return Err(Error::InvalidInput(format!(
                "start frequency {start} is outside the device's range of {}-{}",
                freq_range.start(),
                freq_range.end()
            )));
        }
        if !freq_range.contains(&stop) {
            return Err(Error::InvalidInput(format!(
                "stop frequency {stop} is outside the device's range of {}-{}",
                freq_range.start(),
                freq_range.end()
            )));
        }

        let span_range = model.min_span()..=model.max_span();
        if !span_range.contains(&(stop - start)) {
            return Err(Error::InvalidInput(format!(
                "span {} is outside the device's span range of {}-{}",
                stop - start,
                span_range.start(),
                span_range.end()
            )));
        }

        Ok(())
    }
}

fn validate_min_max_amps(min_amp_dbm: i16, max_amp_dbm: i16) -> Result<()> {
    if min_amp_dbm >= max_amp_dbm {
        return Err(Error::InvalidInput(
            "the minimum amplitude must be less than the maximum amplitude".to_string(),
        ));
    }
    for amp_dbm in [min_amp_dbm, max_amp_dbm] {
        if !MIN_MAX_AMP_RANGE_DBM.contains(&amp_dbm) {
            return Err(Error::InvalidInput(format!(
                "amplitude {amp_dbm} dBm is outside the supported range of {}-{} dBm",
                MIN_MAX_AMP_RANGE_DBM.start(),
                MIN_MAX_AMP_RANGE_DBM.end()
            )));
        }
    }
    Ok(())
}

pub(crate) fn wait_error(err: WaitError, timeout: Duration) -> Error {
    match err {
        WaitError::TimedOut => Error::TimedOut(timeout),
        WaitError::Closed => Error::Disconnected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amplitude_validation() {
        assert!(validate_min_max_amps(-120, -30).is_ok());
        assert!(validate_min_max_amps(-30, -120).is_err());
        assert!(validate_min_max_amps(-50, -50).is_err());
        assert!(validate_min_max_amps(-121, 0).is_err());
        assert!(validate_min_max_amps(-120, 36).is_err());
    }
}
