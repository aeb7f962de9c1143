//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`Interface`] struct
//! for communicating with the G2 controller over SPI.
//!
//! ## Hardware Requirements
//!
//! The G2 controller requires:
//! - SPI bus (MOSI + MISO + SCK), full duplex
//! - 5 GPIO pins:
//!   - **CS**: Chip select (output, active low), driven by the interface
//!     because the controller needs it toggled between index and data phases
//!   - **RST**: Reset (output, active low)
//!   - **PWR**: Panel Vcc/Vdd switch (output, active high)
//!   - **DIS**: Discharge (output, active high)
//!   - **BUSY**: Busy status (input, active high)
//!
//! ## Bus framing
//!
//! Every register access is two chip-select cycles separated by 1 ms:
//!
//! ```text
//! CS low, 0x70, index, CS high, 1 ms, CS low, 0x72, value..., CS high
//! ```
//!
//! Reads replace the second cycle with `0x73` followed by a dummy `0x00`
//! that clocks the register value out.
//!
//! ## Example
//!
//! ```rust,ignore
//! use epd_g2::{DisplayInterface, Interface};
//!
//! let mut interface = Interface::new(spi_bus, cs, rst, pwr, discharge, busy);
//!
//! // Write a register
//! interface.send_command(&mut delay, 0x0B, 0x02)?;
//!
//! // Read the status register
//! let status = interface.read_register(&mut delay, 0x0F)?;
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

use crate::command::{HEADER_DATA, HEADER_INDEX, HEADER_READ};

/// Settle time between the index and data cycles of a register access
pub const FRAME_SETTLE_MS: u32 = 1;

/// Register-level access to a G2 controller and its control lines
///
/// [`Display`](crate::display::Display) never touches the bus directly;
/// every register write, read and pin change goes through this trait.
/// [`Interface`] implements it over embedded-hal; implement it yourself
/// for another transport or a test double.
pub trait DisplayInterface {
    /// Bus or pin failure
    type Error: Debug;

    /// Write one register
    ///
    /// `0x70 index` in one chip-select cycle, 1 ms, then `0x72 value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip select fails.
    fn send_command<D: DelayNs>(
        &mut self,
        delay: &mut D,
        index: u8,
        value: u8,
    ) -> Result<(), Self::Error>;

    /// Write a register with a multi-byte payload
    ///
    /// Same framing as [`send_command`](Self::send_command), streaming the
    /// whole payload after `0x72`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip select fails.
    fn send_data<D: DelayNs>(
        &mut self,
        delay: &mut D,
        index: u8,
        payload: &[u8],
    ) -> Result<(), Self::Error>;

    /// Read one register
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip select fails.
    fn read_register<D: DelayNs>(&mut self, delay: &mut D, index: u8)
    -> Result<u8, Self::Error>;

    /// Clock raw bytes under one chip-select cycle, without preamble
    ///
    /// Returns the byte read back while the last byte was sent. Used for
    /// the controller ID probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip select fails.
    fn raw_transfer(&mut self, bytes: &[u8]) -> Result<u8, Self::Error>;

    /// Drive the panel supply switch
    fn set_power(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Drive the reset line (`false` holds the controller in reset)
    fn set_reset(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Drive the chip-select line directly (`false` selects)
    fn set_chip_select(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Drive the discharge switch
    fn set_discharge(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Sample the BUSY line
    fn is_busy(&mut self) -> Result<bool, Self::Error>;
}

/// Failure raised by [`Interface`]
#[derive(Debug, PartialEq)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// The SPI bus failed
    Spi(SpiErr),
    /// A control pin failed
    Pin(PinErr),
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InterfaceError::Spi(e) => write!(f, "SPI bus failure: {e:?}"),
            InterfaceError::Pin(e) => write!(f, "control pin failure: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// [`DisplayInterface`] over an embedded-hal SPI bus and five GPIO lines
///
/// * `SPI` - SPI bus implementing [`SpiBus`] (the interface owns chip select)
/// * `CS` - Chip select pin implementing [`OutputPin`]
/// * `RST` - Reset pin implementing [`OutputPin`]
/// * `PWR` - Panel power switch implementing [`OutputPin`]
/// * `DIS` - Discharge switch implementing [`OutputPin`]
/// * `BUSY` - Busy pin implementing [`InputPin`]
pub struct Interface<SPI, CS, RST, PWR, DIS, BUSY> {
    /// SPI bus for communication
    spi: SPI,
    /// Chip select (active low)
    cs: CS,
    /// Reset pin (active low)
    rst: RST,
    /// Panel Vcc/Vdd switch
    pwr: PWR,
    /// Discharge switch
    discharge: DIS,
    /// Busy pin (active high)
    busy: BUSY,
}

impl<SPI, CS, RST, PWR, DIS, BUSY> Interface<SPI, CS, RST, PWR, DIS, BUSY>
where
    SPI: SpiBus,
    CS: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
    DIS: OutputPin,
    BUSY: InputPin,
{
    /// Create a new Interface
    ///
    /// Pins are not touched until the power-up sequence runs.
    pub fn new(spi: SPI, cs: CS, rst: RST, pwr: PWR, discharge: DIS, busy: BUSY) -> Self {
        Self {
            spi,
            cs,
            rst,
            pwr,
            discharge,
            busy,
        }
    }

    /// Release the bus and pins
    pub fn release(self) -> (SPI, CS, RST, PWR, DIS, BUSY) {
        (
            self.spi,
            self.cs,
            self.rst,
            self.pwr,
            self.discharge,
            self.busy,
        )
    }
}

impl<SPI, CS, RST, PWR, DIS, BUSY, PinErr> Interface<SPI, CS, RST, PWR, DIS, BUSY>
where
    SPI: SpiBus,
    CS: OutputPin<Error = PinErr>,
    PinErr: Debug,
{
    /// Run `transfer` with chip select asserted
    ///
    /// Chip select is released even when the transfer fails, so the next
    /// access starts on a frame boundary. The transfer error wins over a
    /// failure to release.
    fn framed<R>(
        &mut self,
        transfer: impl FnOnce(&mut SPI) -> Result<R, SPI::Error>,
    ) -> Result<R, InterfaceError<SPI::Error, PinErr>> {
        self.cs.set_low().map_err(InterfaceError::Pin)?;
        let result = transfer(&mut self.spi).map_err(InterfaceError::Spi);
        let released = self.deselect();
        let value = result?;
        released?;
        Ok(value)
    }

    fn deselect(&mut self) -> Result<(), InterfaceError<SPI::Error, PinErr>> {
        let flushed = self.spi.flush().map_err(InterfaceError::Spi);
        self.cs.set_high().map_err(InterfaceError::Pin)?;
        flushed
    }

    /// First cycle of every register access
    fn write_index<D: DelayNs>(
        &mut self,
        delay: &mut D,
        index: u8,
    ) -> Result<(), InterfaceError<SPI::Error, PinErr>> {
        self.framed(|spi| spi.write(&[HEADER_INDEX, index]))?;
        delay.delay_ms(FRAME_SETTLE_MS);
        Ok(())
    }
}

impl<SPI, CS, RST, PWR, DIS, BUSY, PinErr> DisplayInterface
    for Interface<SPI, CS, RST, PWR, DIS, BUSY>
where
    SPI: SpiBus,
    SPI::Error: Debug,
    CS: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    PWR: OutputPin<Error = PinErr>,
    DIS: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    fn send_command<D: DelayNs>(
        &mut self,
        delay: &mut D,
        index: u8,
        value: u8,
    ) -> Result<(), Self::Error> {
        self.write_index(delay, index)?;
        self.framed(|spi| spi.write(&[HEADER_DATA, value]))
    }

    fn send_data<D: DelayNs>(
        &mut self,
        delay: &mut D,
        index: u8,
        payload: &[u8],
    ) -> Result<(), Self::Error> {
        self.write_index(delay, index)?;
        self.framed(|spi| {
            spi.write(&[HEADER_DATA])?;
            spi.write(payload)
        })
    }

    fn read_register<D: DelayNs>(
        &mut self,
        delay: &mut D,
        index: u8,
    ) -> Result<u8, Self::Error> {
        self.write_index(delay, index)?;
        self.framed(|spi| {
            let mut frame = [HEADER_READ, 0x00];
            spi.transfer_in_place(&mut frame)?;
            Ok(frame[1])
        })
    }

    fn raw_transfer(&mut self, bytes: &[u8]) -> Result<u8, Self::Error> {
        self.framed(|spi| {
            let mut last = 0;
            for &byte in bytes {
                let mut word = [byte];
                spi.transfer_in_place(&mut word)?;
                last = word[0];
            }
            Ok(last)
        })
    }

    fn set_power(&mut self, on: bool) -> Result<(), Self::Error> {
        if on {
            self.pwr.set_high().map_err(InterfaceError::Pin)
        } else {
            self.pwr.set_low().map_err(InterfaceError::Pin)
        }
    }

    fn set_reset(&mut self, high: bool) -> Result<(), Self::Error> {
        if high {
            self.rst.set_high().map_err(InterfaceError::Pin)
        } else {
            self.rst.set_low().map_err(InterfaceError::Pin)
        }
    }

    fn set_chip_select(&mut self, high: bool) -> Result<(), Self::Error> {
        if high {
            self.cs.set_high().map_err(InterfaceError::Pin)
        } else {
            self.cs.set_low().map_err(InterfaceError::Pin)
        }
    }

    fn set_discharge(&mut self, on: bool) -> Result<(), Self::Error> {
        if on {
            self.discharge.set_high().map_err(InterfaceError::Pin)
        } else {
            self.discharge.set_low().map_err(InterfaceError::Pin)
        }
    }

    fn is_busy(&mut self) -> Result<bool, Self::Error> {
        self.busy.is_high().map_err(InterfaceError::Pin)
    }
}
