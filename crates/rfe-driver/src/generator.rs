//! Signal generator device handle
//!
//! [`SignalGenerator`] mirrors the analyzer handle for the generator
//! family: per-mode configuration snapshots and callbacks, screen
//! capture delivery, and command issuers for CW, amplitude sweep,
//! frequency sweep, and tracking modes, with expansion-module variants
//! taking a direct dBm power.
//!
//! The same callback discipline applies: callbacks run on the reader
//! thread, must not block, and must not call back into the handle.

use std::time::Duration;

use rfe_protocol::generator::{
    Attenuation, Command, Config, ConfigAmpSweep, ConfigAmpSweepExp, ConfigCw, ConfigCwExp,
    ConfigFreqSweep, ConfigFreqSweepExp, GeneratorCodec, Message, Model, PowerLevel, Temperature,
};
use rfe_protocol::{
    BaudRate, Command as CommonCommand, Frequency, RadioModule, ScreenData, SerialNumber,
    SetupInfo,
};
use tracing::{info, trace};

use crate::device::{check_firmware, Device, MessageSink};
use crate::error::{ConnectError, ConnectResult, Error, Result};
use crate::spectrum::wait_error;
use crate::sync::{CallbackSlot, Latest};
use crate::transport::{SerialTransport, Transport, FAST_BAUD_RATE, SLOW_BAUD_RATE};

const NEXT_SCREEN_DATA_TIMEOUT: Duration = Duration::from_secs(2);
const NEXT_CONFIG_TIMEOUT: Duration = Duration::from_secs(2);
const SERIAL_NUMBER_TIMEOUT: Duration = Duration::from_secs(2);

/// Shared state container for one generator, owned jointly by the
/// handle and its reader loop
#[derive(Debug, Default)]
pub(crate) struct GeneratorState {
    config: Latest<Config>,
    config_amp_sweep: Latest<ConfigAmpSweep>,
    config_cw: Latest<ConfigCw>,
    config_freq_sweep: Latest<ConfigFreqSweep>,
    config_cw_exp: Latest<ConfigCwExp>,
    config_amp_sweep_exp: Latest<ConfigAmpSweepExp>,
    config_freq_sweep_exp: Latest<ConfigFreqSweepExp>,
    screen_data: Latest<ScreenData>,
    temperature: Latest<Temperature>,
    setup_info: Latest<SetupInfo<Model>>,
    serial_number: Latest<SerialNumber>,
    config_callback: CallbackSlot<Config>,
    config_amp_sweep_callback: CallbackSlot<ConfigAmpSweep>,
    config_cw_callback: CallbackSlot<ConfigCw>,
    config_freq_sweep_callback: CallbackSlot<ConfigFreqSweep>,
    config_cw_exp_callback: CallbackSlot<ConfigCwExp>,
    config_amp_sweep_exp_callback: CallbackSlot<ConfigAmpSweepExp>,
    config_freq_sweep_exp_callback: CallbackSlot<ConfigFreqSweepExp>,
}

impl MessageSink for GeneratorState {
    type Codec = GeneratorCodec;

    fn receive(&self, message: Message) {
        match message {
            Message::Config(config) => {
                self.config.publish(config);
                self.config_callback.invoke(config);
            }
            Message::ConfigAmpSweep(config) => {
                self.config_amp_sweep.publish(config);
                self.config_amp_sweep_callback.invoke(config);
            }
            Message::ConfigCw(config) => {
                self.config_cw.publish(config);
                self.config_cw_callback.invoke(config);
            }
            Message::ConfigFreqSweep(config) => {
                self.config_freq_sweep.publish(config);
                self.config_freq_sweep_callback.invoke(config);
            }
            Message::ConfigCwExp(config) => {
                self.config_cw_exp.publish(config);
                self.config_cw_exp_callback.invoke(config);
            }
            Message::ConfigAmpSweepExp(config) => {
                self.config_amp_sweep_exp.publish(config);
                self.config_amp_sweep_exp_callback.invoke(config);
            }
            Message::ConfigFreqSweepExp(config) => {
                self.config_freq_sweep_exp.publish(config);
                self.config_freq_sweep_exp_callback.invoke(config);
            }
            Message::ScreenData(screen_data) => self.screen_data.publish(screen_data),
            Message::Temperature(temperature) => self.temperature.publish(temperature),
            Message::SetupInfo(setup_info) => self.setup_info.publish(setup_info),
            Message::SerialNumber(serial_number) => self.serial_number.publish(serial_number),
            Message::Unrecognized(line) => {
                trace!("unrecognized message: {:?}", String::from_utf8_lossy(&line));
            }
        }
    }

    fn wait_for_device_info(&self, timeout: Duration) -> bool {
        // Generators answer the handshake with setup info and the
        // combined `#C3-*:` configuration report
        self.setup_info.wait_until(timeout, |_| true).is_ok()
            && self.config.wait_until(timeout, |_| true).is_ok()
    }

    fn firmware_version(&self) -> Option<String> {
        self.setup_info.get().map(|setup| setup.firmware_version)
    }

    fn close(&self) {
        self.config.close();
        self.config_amp_sweep.close();
        self.config_cw.close();
        self.config_freq_sweep.close();
        self.config_cw_exp.close();
        self.config_amp_sweep_exp.close();
        self.config_freq_sweep_exp.close();
        self.screen_data.close();
        self.temperature.close();
        self.setup_info.close();
        self.serial_number.close();
    }
}

/// A connected RF Explorer signal generator
///
/// Dropping the handle stops and joins the reader thread and releases
/// the transport; any outstanding blocking wait returns
/// [`Error::Disconnected`].
#[derive(Debug)]
pub struct SignalGenerator {
    device: Device<GeneratorState>,
}

impl SignalGenerator {
    /// Connects to the first available RF Explorer signal generator
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
    /// rate
    pub fn connect_with_name_and_baud_rate(name: &str, baud_rate: u32) -> ConnectResult<Self> {
        let exists = serialport::available_ports()
            .map(|ports| ports.iter().any(|p| p.port_name == name))
            .unwrap_or(false);
        if !exists {
            return Err(ConnectError::PortNotFound(name.to_string()));
        }
        Self::connect_transport(SerialTransport::open(name, baud_rate)?)
    }

    /// Connects to every available RF Explorer signal generator.
    /// Non-responsive ports are skipped, never aborting the scan.
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
        let device: Device<GeneratorState> = Device::connect(transport)?;
        let version = device.sink().firmware_version().unwrap_or_default();
        check_firmware(&version)?;
        info!(
            "connected to signal generator on {} (firmware {version})",
            device.port_name()
        );
        Ok(SignalGenerator { device })
    }

    fn state(&self) -> &GeneratorState {
        self.device.sink()
    }

    /// The name of the serial port this generator is connected through
    pub fn port_name(&self) -> &str {
        self.device.port_name()
    }

    /// The baud rate of the serial connection
    pub fn baud_rate(&self) -> Result<u32> {
        self.device.baud_rate().map_err(Error::Io)
    }

    /// Switches the device and then the local port to a new baud rate
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

    /// The model whose limits currently constrain output: the
    /// expansion module once an expansion-mode report has been seen,
    /// the main module otherwise
    fn active_model(&self) -> Model {
        let has_exp_config = self.state().config_cw_exp.get().is_some()
            || self.state().config_amp_sweep_exp.get().is_some()
            || self.state().config_freq_sweep_exp.get().is_some();

        if has_exp_config {
            if let Some(expansion) = self.expansion_radio_module() {
                return expansion.model();
            }
        }
        self.main_radio_module()
            .map(|module| module.model())
            .unwrap_or(Model::RfGen)
    }

    /// The most recent combined configuration report
    pub fn config(&self) -> Option<Config> {
        self.state().config.get()
    }

    /// The most recent amplitude sweep configuration report
    pub fn config_amp_sweep(&self) -> Option<ConfigAmpSweep> {
        self.state().config_amp_sweep.get()
    }

    /// The most recent CW configuration report
    pub fn config_cw(&self) -> Option<ConfigCw> {
        self.state().config_cw.get()
    }

    /// The most recent frequency sweep configuration report
    pub fn config_freq_sweep(&self) -> Option<ConfigFreqSweep> {
        self.state().config_freq_sweep.get()
    }

    /// The most recent expansion module CW report
    pub fn config_cw_expansion(&self) -> Option<ConfigCwExp> {
        self.state().config_cw_exp.get()
    }

    /// The most recent expansion module amplitude sweep report
    pub fn config_amp_sweep_expansion(&self) -> Option<ConfigAmpSweepExp> {
        self.state().config_amp_sweep_exp.get()
    }

    /// The most recent expansion module frequency sweep report
    pub fn config_freq_sweep_expansion(&self) -> Option<ConfigFreqSweepExp> {
        self.state().config_freq_sweep_exp.get()
    }

    /// The most recent screen capture, if any has arrived yet
    pub fn screen_data(&self) -> Option<ScreenData> {
        self.state().screen_data.get()
    }

    /// The generator's internal temperature band, once reported
    pub fn temperature(&self) -> Option<Temperature> {
        self.state().temperature.get()
    }

    /// Blocks until the generator reports its next combined
    /// configuration update
    pub fn wait_for_next_config(&self) -> Result<Config> {
        self.wait_for_next_config_with_timeout(NEXT_CONFIG_TIMEOUT)
    }

    /// Blocks until a combined configuration update arrives strictly
    /// after call entry, or the timeout elapses
    pub fn wait_for_next_config_with_timeout(&self, timeout: Duration) -> Result<Config> {
        self.state()
            .config
            .wait_for_next(timeout)
            .map_err(|err| wait_error(err, timeout))
    }

    /// Blocks until the generator captures its next screen frame
    pub fn wait_for_next_screen_data(&self) -> Result<ScreenData> {
        self.wait_for_next_screen_data_with_timeout(NEXT_SCREEN_DATA_TIMEOUT)
    }

    /// Blocks until a screen frame arrives strictly after call entry,
    /// or the timeout elapses
    pub fn wait_for_next_screen_data_with_timeout(&self, timeout: Duration) -> Result<ScreenData> {
        self.state()
            .screen_data
            .wait_for_next(timeout)
            .map_err(|err| wait_error(err, timeout))
    }

    /// Sets the callback invoked for every combined configuration
    /// report, replacing any previous one
    pub fn set_config_callback(&self, callback: impl FnMut(Config) + Send + 'static) {
        self.state().config_callback.set(callback);
    }

    /// Removes the combined configuration callback
    pub fn remove_config_callback(&self) {
        self.state().config_callback.clear();
    }

    /// Sets the callback invoked for every amplitude sweep report
    pub fn set_config_amp_sweep_callback(
        &self,
        callback: impl FnMut(ConfigAmpSweep) + Send + 'static,
    ) {
        self.state().config_amp_sweep_callback.set(callback);
    }

    /// Removes the amplitude sweep report callback
    pub fn remove_config_amp_sweep_callback(&self) {
        self.state().config_amp_sweep_callback.clear();
    }

    /// Sets the callback invoked for every CW report
    pub fn set_config_cw_callback(&self, callback: impl FnMut(ConfigCw) + Send + 'static) {
        self.state().config_cw_callback.set(callback);
    }

    /// Removes the CW report callback
    pub fn remove_config_cw_callback(&self) {
        self.state().config_cw_callback.clear();
    }

    /// Sets the callback invoked for every frequency sweep report
    pub fn set_config_freq_sweep_callback(
        &self,
        callback: impl FnMut(ConfigFreqSweep) + Send + 'static,
    ) {
        self.state().config_freq_sweep_callback.set(callback);
    }

    /// Removes the frequency sweep report callback
    pub fn remove_config_freq_sweep_callback(&self) {
        self.state().config_freq_sweep_callback.clear();
    }

    /// Sets the callback invoked for every expansion CW report
    pub fn set_config_cw_exp_callback(&self, callback: impl FnMut(ConfigCwExp) + Send + 'static) {
        self.state().config_cw_exp_callback.set(callback);
    }

    /// Removes the expansion CW report callback
    pub fn remove_config_cw_exp_callback(&self) {
        self.state().config_cw_exp_callback.clear();
    }

    /// Sets the callback invoked for every expansion amplitude sweep
    /// report
    pub fn set_config_amp_sweep_exp_callback(
        &self,
        callback: impl FnMut(ConfigAmpSweepExp) + Send + 'static,
    ) {
        self.state().config_amp_sweep_exp_callback.set(callback);
    }

    /// Removes the expansion amplitude sweep report callback
    pub fn remove_config_amp_sweep_exp_callback(&self) {
        self.state().config_amp_sweep_exp_callback.clear();
    }

    /// Sets the callback invoked for every expansion frequency sweep
    /// report
    pub fn set_config_freq_sweep_exp_callback(
        &self,
        callback: impl FnMut(ConfigFreqSweepExp) + Send + 'static,
    ) {
        self.state().config_freq_sweep_exp_callback.set(callback);
    }

    /// Removes the expansion frequency sweep report callback
    pub fn remove_config_freq_sweep_exp_callback(&self) {
        self.state().config_freq_sweep_exp_callback.clear();
    }

    /// Sends raw bytes to the generator
    pub fn send_bytes(&self, bytes: impl AsRef<[u8]>) -> Result<()> {
        self.device.send_bytes(bytes)
    }

    /// Starts CW output at a fixed frequency
    pub fn start_cw(
        &self,
        cw: impl Into<Frequency>,
        attenuation: Attenuation,
        power_level: PowerLevel,
    ) -> Result<()> {
        let cw = cw.into();
        self.validate_freq(cw)?;
        self.device.send_command(Command::StartCw {
            cw,
            attenuation,
            power_level,
        })
    }

    /// Starts CW output on the expansion module with a direct dBm
    /// power
    pub fn start_cw_exp(&self, cw: impl Into<Frequency>, power_dbm: f64) -> Result<()> {
        self.require_expansion()?;
        let cw = cw.into();
        self.validate_freq(cw)?;
        self.device.send_command(Command::StartCwExp { cw, power_dbm })
    }

    /// Starts the amplitude sweep mode
    pub fn start_amp_sweep(
        &self,
        cw: impl Into<Frequency>,
        start_attenuation: Attenuation,
        start_power_level: PowerLevel,
        stop_attenuation: Attenuation,
        stop_power_level: PowerLevel,
        step_delay: Duration,
    ) -> Result<()> {
        let cw = cw.into();
        self.validate_freq(cw)?;
        self.device.send_command(Command::StartAmpSweep {
            cw,
            start_attenuation,
            start_power_level,
            stop_attenuation,
            stop_power_level,
            step_delay,
        })
    }

    /// Starts the amplitude sweep mode on the expansion module
    pub fn start_amp_sweep_exp(
        &self,
        cw: impl Into<Frequency>,
        start_power_dbm: f64,
        step_power_db: f64,
        stop_power_dbm: f64,
        step_delay: Duration,
    ) -> Result<()> {
        self.require_expansion()?;
        let cw = cw.into();
        self.validate_freq(cw)?;
        self.device.send_command(Command::StartAmpSweepExp {
            cw,
            start_power_dbm,
            step_power_db,
            stop_power_dbm,
            step_delay,
        })
    }

    /// Starts the frequency sweep mode
    pub fn start_freq_sweep(
        &self,
        start: impl Into<Frequency>,
        attenuation: Attenuation,
        power_level: PowerLevel,
        sweep_steps: u16,
        step: impl Into<Frequency>,
        step_delay: Duration,
    ) -> Result<()> {
        let (start, step) = (start.into(), step.into());
        self.validate_sweep_range(start, step, sweep_steps)?;
        self.device.send_command(Command::StartFreqSweep {
            start,
            attenuation,
            power_level,
            sweep_steps,
            step,
            step_delay,
        })
    }

    /// Starts the frequency sweep mode on the expansion module
    pub fn start_freq_sweep_exp(
        &self,
        start: impl Into<Frequency>,
        power_dbm: f64,
        sweep_steps: u16,
        step: impl Into<Frequency>,
        step_delay: Duration,
    ) -> Result<()> {
        self.require_expansion()?;
        let (start, step) = (start.into(), step.into());
        self.validate_sweep_range(start, step, sweep_steps)?;
        self.device.send_command(Command::StartFreqSweepExp {
            start,
            power_dbm,
            sweep_steps,
            step,
            step_delay,
        })
    }

    /// Starts tracking mode, stepping on the analyzer's command
    pub fn start_tracking(
        &self,
        start: impl Into<Frequency>,
        attenuation: Attenuation,
        power_level: PowerLevel,
        sweep_steps: u16,
        step: impl Into<Frequency>,
    ) -> Result<()> {
        let (start, step) = (start.into(), step.into());
        self.validate_sweep_range(start, step, sweep_steps)?;
        self.device.send_command(Command::StartTracking {
            start,
            attenuation,
            power_level,
            sweep_steps,
            step,
        })
    }

    /// Starts tracking mode on the expansion module
    pub fn start_tracking_exp(
        &self,
        start: impl Into<Frequency>,
        power_dbm: f64,
        sweep_steps: u16,
        step: impl Into<Frequency>,
    ) -> Result<()> {
        self.require_expansion()?;
        let (start, step) = (start.into(), step.into());
        self.validate_sweep_range(start, step, sweep_steps)?;
        self.device.send_command(Command::StartTrackingExp {
            start,
            power_dbm,
            sweep_steps,
            step,
        })
    }

    /// Jumps the tracking generator forward by the given number of
    /// steps
    pub fn tracking_step(&self, steps: u16) -> Result<()> {
        self.device.send_command(Command::TrackingStep(steps))
    }

    /// Turns on RF power with the current configuration
    pub fn rf_power_on(&self) -> Result<()> {
        self.device.send_command(Command::RfPowerOn)
    }

    /// Turns off RF power
    pub fn rf_power_off(&self) -> Result<()> {
        self.device.send_command(Command::RfPowerOff)
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

    fn require_expansion(&self) -> Result<()> {
        if self.expansion_radio_module().is_none() {
            return Err(Error::InvalidOperation(
                "this signal generator has no expansion module".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_freq(&self, freq: Frequency) -> Result<()> {
        let model = self.active_model();
        let range = model.min_freq()..=model.max_freq();
        if !range.contains(&freq) {
            return Err(Error::InvalidInput(format!(
                "frequency {freq} is outside the generator's range of {}-{}",
                range.start(),
                range.end()
            )));
        }
        Ok(())
    }

    fn validate_sweep_range(
        &self,
        start: Frequency,
        step: Frequency,
        sweep_steps: u16,
    ) -> Result<()> {
        self.validate_freq(start)?;
        let stop = start + step * u64::from(sweep_steps);
        self.validate_freq(stop).map_err(|_| {
            Error::InvalidInput(format!(
                "the sweep's final frequency {stop} is outside the generator's range"
            ))
        })
    }
}
