//! Power sequencing
//!
//! Power-up walks the controller through a fixed, timing-sensitive sequence:
//!
//! ```text
//! Off -> BusReset -> SupplyRamp -> ResetPulse -> WaitBusy -> HandshakeProbe
//!     -> RegisterInit -> ChargePumpRamp -> Ready
//! ```
//!
//! Any step can end in `Failed`. A failed panel is in an undefined
//! electrical state and must be powered off before another attempt.

use embedded_hal::delay::DelayNs;

use crate::command::*;
use crate::display::Display;
use crate::error::Error;
use crate::interface::DisplayInterface;
use crate::line::{fill_border_dummy_line, fill_nothing_line};
use crate::observer::DisplayObserver;

/// Power-on timing, in ms
const BUS_RESET_MS: u32 = 6;
const SUPPLY_RAMP_MS: u32 = 11;
const RESET_PULSE_MS: u32 = 6;
const PROBE_SETTLE_MS: u32 = 6;
const LATCH_SETTLE_MS: u32 = 6;

/// Charge pump ramp timing, in ms
const PUMP_POSITIVE_MS: u32 = 155;
const PUMP_NEGATIVE_MS: u32 = 95;
const PUMP_VCOM_MS: u32 = 45;

/// Power-off timing, in ms
const DUMMY_LINE_SETTLE_MS: u32 = 200;
const SHUTDOWN_SETTLE_MS: u32 = 55;
const DISCHARGE_MS: u32 = 150;

/// Register writes after the ID probe and status check, in order
const REGISTER_INIT: [(u8, u8); 6] = [
    (OSCILLATOR, HIGH_POWER_MODE),
    (POWER_MODE, POWER_MODE_DEFAULT),
    (VCOM_LEVEL, VCOM_DEFAULT),
    (POWER_SETTING, POWER_SETTING_DEFAULT),
    (DRIVER_LATCH, LATCH_ON),
    (DRIVER_LATCH, LATCH_OFF),
];

/// Register writes shutting the controller down, in order
const SHUTDOWN: [(u8, u8); 7] = [
    (POWER_SAVING, POWER_SAVING_OFF),
    (DRIVER_LATCH, LATCH_ON),
    (CHARGE_PUMP, PUMP_NEGATIVE),
    (CHARGE_PUMP, PUMP_POSITIVE),
    (POWER_SETTING, DISCHARGE_INTERNAL),
    (CHARGE_PUMP, PUMP_OFF),
    (OSCILLATOR, OSCILLATOR_OFF),
];

/// Power sequence state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerState {
    /// Rails off, or never powered
    Off,
    /// Pins driven to their idle levels
    BusReset,
    /// Panel supply switched on
    SupplyRamp,
    /// Reset being pulsed
    ResetPulse,
    /// Waiting for BUSY to clear
    WaitBusy,
    /// Checking the controller ID
    HandshakeProbe,
    /// Writing the power-up registers
    RegisterInit,
    /// Bringing the charge pump up
    ChargePumpRamp,
    /// Ready for frames
    Ready,
    /// Power-up aborted
    Failed,
}

impl<I, O> Display<I, O>
where
    I: DisplayInterface,
    O: DisplayObserver,
{
    /// Power the panel up
    ///
    /// On success the observer's `on_ready` runs once. On a controller
    /// fault the observer's `on_error` runs with the matching
    /// [`ErrorCode`](crate::error::ErrorCode) and the error is also returned.
    ///
    /// # Errors
    ///
    /// - [`Error::BusyTimeout`] if BUSY never clears after reset
    /// - [`Error::NoDevice`] if the ID probe does not return the G2 ID
    /// - [`Error::UnknownFault`] if the status register reports a fault
    /// - [`Error::ChargePumpTimeout`] if the charge pump never comes up
    /// - [`Error::Interface`] on bus failure
    pub fn power_up<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        log::info!("Powering up {} panel", self.config.panel);

        match self.run_power_up(delay) {
            Ok(()) => {
                self.enter(PowerState::Ready);
                self.observer.on_ready();
                Ok(())
            }
            Err(err) => {
                log::error!("Power-up failed in {:?}: {err}", self.state);
                self.enter(PowerState::Failed);
                if let Some(code) = err.code() {
                    self.observer.on_error(code);
                }
                Err(err)
            }
        }
    }

    fn run_power_up<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        self.enter(PowerState::BusReset);
        self.interface.set_reset(false).map_err(Error::Interface)?;
        self.interface.set_power(false).map_err(Error::Interface)?;
        self.interface.set_discharge(false).map_err(Error::Interface)?;
        self.interface.set_chip_select(false).map_err(Error::Interface)?;
        delay.delay_ms(BUS_RESET_MS);

        self.enter(PowerState::SupplyRamp);
        self.interface.set_power(true).map_err(Error::Interface)?;
        delay.delay_ms(SUPPLY_RAMP_MS);

        self.enter(PowerState::ResetPulse);
        self.interface.set_reset(true).map_err(Error::Interface)?;
        self.interface.set_chip_select(true).map_err(Error::Interface)?;
        delay.delay_ms(RESET_PULSE_MS);
        self.interface.set_reset(false).map_err(Error::Interface)?;
        delay.delay_ms(RESET_PULSE_MS);
        self.interface.set_reset(true).map_err(Error::Interface)?;
        delay.delay_ms(RESET_PULSE_MS);

        self.enter(PowerState::WaitBusy);
        self.wait_while_busy(delay)?;
        delay.delay_ms(PROBE_SETTLE_MS);

        self.enter(PowerState::HandshakeProbe);
        let probe = self
            .interface
            .raw_transfer(&[HEADER_ID, 0x00])
            .map_err(Error::Interface)?;
        if probe != COG_ID {
            return Err(Error::NoDevice { probe });
        }

        self.enter(PowerState::RegisterInit);
        self.send_command(delay, OUTPUT_ENABLE, OE_DISABLE)?;
        let status = self.read_register(delay, STATUS)?;
        if status & STATUS_BREAKAGE_OK == 0 {
            return Err(Error::UnknownFault { status });
        }
        self.send_command(delay, POWER_SAVING, POWER_SAVING_ON)?;
        self.send_data(delay, CHANNEL_SELECT, &CHANNEL_DATA_144)?;
        for (index, value) in REGISTER_INIT {
            self.send_command(delay, index, value)?;
        }
        delay.delay_ms(LATCH_SETTLE_MS);

        self.enter(PowerState::ChargePumpRamp);
        self.ramp_charge_pump(delay)
    }

    fn ramp_charge_pump<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        let attempts = self.config.charge_pump_attempts;

        for attempt in 1..=attempts {
            log::debug!("Charge pump attempt {attempt}/{attempts}");

            self.send_command(delay, CHARGE_PUMP, PUMP_POSITIVE)?;
            delay.delay_ms(PUMP_POSITIVE_MS);
            self.send_command(delay, CHARGE_PUMP, PUMP_NEGATIVE)?;
            delay.delay_ms(PUMP_NEGATIVE_MS);
            self.send_command(delay, CHARGE_PUMP, PUMP_VCOM)?;
            delay.delay_ms(PUMP_VCOM_MS);

            let status = self.read_register(delay, STATUS)?;
            if status & STATUS_PUMP_READY != 0 {
                self.send_command(delay, OUTPUT_ENABLE, OE_DISABLE_READY)?;
                return Ok(());
            }
            log::warn!("Charge pump not ready (status {status:#04x})");
        }

        Err(Error::ChargePumpTimeout { attempts })
    }

    /// Poll BUSY until it clears, bounded by `config.busy_timeout_ms`
    fn wait_while_busy<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        let interval = self.config.busy_poll_interval_ms;
        let mut waited_ms: u32 = 0;

        while self.interface.is_busy().map_err(Error::Interface)? {
            if waited_ms >= self.config.busy_timeout_ms {
                return Err(Error::BusyTimeout { waited_ms });
            }
            log::trace!("Waiting for BUSY ({waited_ms} ms)");
            delay.delay_ms(interval);
            waited_ms = waited_ms.saturating_add(interval);
        }

        Ok(())
    }

    /// Power the panel off
    ///
    /// Drives a blank frame, shuts the controller down and releases the
    /// rails, discharging the panel. Safe to call from any state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Interface`] on bus failure.
    pub fn power_off<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        log::info!("Powering off {} panel", self.config.panel);

        // One blank line scanned over every row, then the border
        fill_nothing_line(&mut self.line);
        self.send_line(delay)?;
        fill_border_dummy_line(&mut self.line);
        self.send_line(delay)?;
        delay.delay_ms(DUMMY_LINE_SETTLE_MS);

        for (index, value) in SHUTDOWN {
            self.send_command(delay, index, value)?;
        }
        delay.delay_ms(SHUTDOWN_SETTLE_MS);

        self.interface.set_power(false).map_err(Error::Interface)?;
        self.interface.set_reset(false).map_err(Error::Interface)?;
        self.interface.set_chip_select(false).map_err(Error::Interface)?;
        self.interface.set_discharge(true).map_err(Error::Interface)?;
        delay.delay_ms(DISCHARGE_MS);
        self.interface.set_discharge(false).map_err(Error::Interface)?;

        self.enter(PowerState::Off);
        Ok(())
    }

    fn enter(&mut self, state: PowerState) {
        log::debug!("Power state {:?} -> {:?}", self.state, state);
        self.state = state;
    }
}
