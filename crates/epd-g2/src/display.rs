//! Core display operations

use alloc::vec::Vec;
use embedded_hal::delay::DelayNs;

use crate::command::*;
use crate::config::Config;
use crate::error::Error;
use crate::interface::DisplayInterface;
use crate::line::encode_line;
use crate::observer::DisplayObserver;
use crate::power::PowerState;
use crate::stage::{Source, Stage};

/// Core display driver for G2 panels
///
/// Owns the hardware interface, the configuration, the observer and the
/// scratch buffer every line is encoded into. All operations take
/// `&mut self`, so one `Display` drives one panel from one caller at a time.
///
/// Power sequencing lives in [`power`](crate::power); this module holds
/// construction and frame transmission.
pub struct Display<I, O = ()>
where
    I: DisplayInterface,
    O: DisplayObserver,
{
    /// Hardware interface
    pub(crate) interface: I,
    /// Display configuration
    pub(crate) config: Config,
    /// Receives ready/error/stage-updated notifications
    pub(crate) observer: O,
    /// Where the power sequence currently stands
    pub(crate) state: PowerState,
    /// Scratch buffer holding the line being sent
    pub(crate) line: Vec<u8>,
}

impl<I, O> Display<I, O>
where
    I: DisplayInterface,
    O: DisplayObserver,
{
    /// Create a new Display instance
    ///
    /// Validates the configuration and allocates the line buffer. Nothing
    /// is sent to the panel until [`power_up`](Self::power_up).
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if [`Config::validate`] rejects the configuration
    /// - [`Error::OutOfMemory`] if the line buffer cannot be allocated
    pub fn new(interface: I, config: Config, observer: O) -> Result<Self, Error<I>> {
        config.validate().map_err(Error::Config)?;

        let mut line = Vec::new();
        line.try_reserve_exact(config.line_buffer_length)
            .map_err(|_| Error::OutOfMemory)?;
        line.resize(config.line_buffer_length, 0);

        Ok(Self {
            interface,
            config,
            observer,
            state: PowerState::Off,
            line,
        })
    }

    /// Draw a frame without ghost cancellation
    ///
    /// Sends every line of `frame` once, in scan order.
    ///
    /// # Errors
    ///
    /// - [`Error::BufferTooSmall`] if `frame` is shorter than `config.frame_size()`
    /// - [`Error::Interface`] on bus failure
    pub fn push_frame<D: DelayNs>(&mut self, delay: &mut D, frame: &[u8]) -> Result<(), Error<I>> {
        self.check_frame(frame)?;
        self.warn_if_unpowered();

        for line_no in 0..self.config.lines as usize {
            encode_line(&mut self.line, frame, line_no);
            self.send_line(delay)?;
        }

        Ok(())
    }

    /// Replace `previous` with `next`, cancelling the ghost of `previous`
    ///
    /// Drives the four [`Stage`]s in order. Compensate, White and Inverse
    /// each redraw the panel `ghost_iterations` times, Normal twice as
    /// often. Every stage is followed by the stage delay. The observer's
    /// `on_stage_updated` runs once, after the last delay.
    ///
    /// # Errors
    ///
    /// - [`Error::BufferTooSmall`] if either frame is shorter than `config.frame_size()`
    /// - [`Error::Interface`] on bus failure
    pub fn stage_update<D: DelayNs>(
        &mut self,
        delay: &mut D,
        previous: &[u8],
        next: &[u8],
    ) -> Result<(), Error<I>> {
        self.check_frame(previous)?;
        self.check_frame(next)?;
        self.warn_if_unpowered();

        for stage in Stage::ALL {
            let frame = match stage.source() {
                Source::Previous => previous,
                Source::Next => next,
            };
            let passes = stage.passes(self.config.ghost_iterations);
            log::debug!("Stage {stage:?}: {passes} passes");

            for _ in 0..passes {
                for line_no in 0..self.config.lines as usize {
                    encode_line(&mut self.line, frame, line_no);
                    stage.apply_to_line(&mut self.line);
                    self.send_line(delay)?;
                }
            }

            delay.delay_ms(self.config.stage_delay_ms());
        }

        self.observer.on_stage_updated(previous, next);
        Ok(())
    }

    fn check_frame(&self, frame: &[u8]) -> Result<(), Error<I>> {
        let required = self.config.frame_size();
        if frame.len() < required {
            return Err(Error::BufferTooSmall {
                required,
                provided: frame.len(),
            });
        }
        Ok(())
    }

    fn warn_if_unpowered(&self) {
        if self.state != PowerState::Ready {
            log::warn!("Sending frame while panel is {:?}", self.state);
        }
    }

    /// Send the line buffer and commit it
    pub(crate) fn send_line<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        self.interface
            .send_data(delay, LINE_DATA, &self.line)
            .map_err(Error::Interface)?;
        self.send_command(delay, OUTPUT_ENABLE, OE_COMMIT_LINE)
    }

    /// Write a register on the controller
    pub(crate) fn send_command<D: DelayNs>(
        &mut self,
        delay: &mut D,
        index: u8,
        value: u8,
    ) -> Result<(), Error<I>> {
        self.interface
            .send_command(delay, index, value)
            .map_err(Error::Interface)
    }

    /// Write a multi-byte register on the controller
    pub(crate) fn send_data<D: DelayNs>(
        &mut self,
        delay: &mut D,
        index: u8,
        payload: &[u8],
    ) -> Result<(), Error<I>> {
        self.interface
            .send_data(delay, index, payload)
            .map_err(Error::Interface)
    }

    /// Read a register from the controller
    pub(crate) fn read_register<D: DelayNs>(
        &mut self,
        delay: &mut D,
        index: u8,
    ) -> Result<u8, Error<I>> {
        self.interface
            .read_register(delay, index)
            .map_err(Error::Interface)
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Where the power sequence currently stands
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Access the observer
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Access the observer mutably
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Give back the interface and observer
    pub fn release(self) -> (I, O) {
        (self.interface, self.observer)
    }
}
