//! Failures
//!
//! [`BuilderError`] rejects a configuration before any hardware is touched.
//! [`Error`] is returned by every [`Display`](crate::display::Display)
//! operation and carries the interface's own error for bus failures.
//! Controller faults during power-up also map to an [`ErrorCode`], which
//! is what [`DisplayObserver::on_error`](crate::observer::DisplayObserver::on_error)
//! receives.
//!
//! ```
//! use epd_g2::{Builder, BuilderError, Config, PanelKind};
//!
//! // Panel without a profile
//! let result = Config::for_panel(PanelKind::Epd270);
//! assert!(matches!(result, Err(BuilderError::Unsupported(PanelKind::Epd270))));
//!
//! // Degenerate timing
//! let result = Builder::new(PanelKind::Epd144).ghost_iterations(0).build();
//! assert!(result.is_err());
//! ```

use crate::config::PanelKind;
use crate::interface::DisplayInterface;

/// Fault reported to the observer while powering up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// The controller did not answer the ID probe
    NoDevice,
    /// The controller status register reported a fault
    UnknownFault,
    /// The charge pump never reached its level
    ChargePumpTimeout,
    /// BUSY never cleared
    BusyTimeout,
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ErrorCode::NoDevice => write!(f, "no device"),
            ErrorCode::UnknownFault => write!(f, "unknown fault"),
            ErrorCode::ChargePumpTimeout => write!(f, "charge pump timeout"),
            ErrorCode::BusyTimeout => write!(f, "busy timeout"),
        }
    }
}

/// Failure of a display operation
///
/// `I` is the interface, so [`Error::Interface`] holds its concrete error.
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// The bus or a control pin failed
    Interface(I::Error),
    /// The configuration was rejected by [`Config::validate`](crate::config::Config::validate)
    Config(BuilderError),
    /// The line buffer could not be allocated
    OutOfMemory,
    /// Frame is too small for the display
    ///
    /// A frame must be at least `config.frame_size()` bytes.
    BufferTooSmall {
        /// Required frame size in bytes
        required: usize,
        /// Provided frame size in bytes
        provided: usize,
    },
    /// The ID probe returned something other than the G2 controller ID
    NoDevice {
        /// Byte returned by the probe
        probe: u8,
    },
    /// The status register did not report an intact controller
    UnknownFault {
        /// Status register value
        status: u8,
    },
    /// The charge pump did not come up within the configured attempts
    ChargePumpTimeout {
        /// Attempts made
        attempts: u8,
    },
    /// BUSY stayed asserted for longer than the configured timeout
    BusyTimeout {
        /// Time spent polling, in ms
        waited_ms: u32,
    },
}

impl<I: DisplayInterface> Error<I> {
    /// Observer code for power-up faults, `None` for other errors
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::NoDevice { .. } => Some(ErrorCode::NoDevice),
            Error::UnknownFault { .. } => Some(ErrorCode::UnknownFault),
            Error::ChargePumpTimeout { .. } => Some(ErrorCode::ChargePumpTimeout),
            Error::BusyTimeout { .. } => Some(ErrorCode::BusyTimeout),
            Error::Interface(_)
            | Error::Config(_)
            | Error::OutOfMemory
            | Error::BufferTooSmall { .. } => None,
        }
    }
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Interface(e) => write!(f, "Bus failure: {e:?}"),
            Error::Config(err) => write!(f, "Invalid configuration: {err}"),
            Error::OutOfMemory => write!(f, "Out of memory allocating line buffer"),
            Error::BufferTooSmall { required, provided } => {
                write!(
                    f,
                    "Frame too small: required {required} bytes, provided {provided}"
                )
            }
            Error::NoDevice { probe } => {
                write!(f, "No device: ID probe returned {probe:#04x}")
            }
            Error::UnknownFault { status } => {
                write!(f, "Controller fault: status {status:#04x}")
            }
            Error::ChargePumpTimeout { attempts } => {
                write!(f, "Charge pump not ready after {attempts} attempts")
            }
            Error::BusyTimeout { waited_ms } => {
                write!(f, "BUSY still asserted after {waited_ms} ms")
            }
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Rejected configuration
#[derive(Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// The panel has no geometry/timing profile
    Unsupported(PanelKind),
    /// Ghost iterations must be at least one
    InvalidGhostIterations,
    /// Stage delay multiplier must be at least one
    InvalidStageDelay {
        /// Requested base delay
        base_ms: u32,
        /// Requested multiplier
        multiplier: u32,
    },
    /// BUSY poll interval must be at least one millisecond
    InvalidBusyPolling,
    /// Charge pump attempts must be at least one
    InvalidChargePumpAttempts,
    /// Geometry differs from the panel's line layout
    InvalidGeometry {
        /// Configured columns
        columns: u16,
        /// Configured scan lines
        lines: u16,
        /// Configured line buffer length
        line_buffer_length: usize,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BuilderError::Unsupported(panel) => write!(f, "Unsupported panel: {panel}"),
            BuilderError::InvalidGhostIterations => {
                write!(f, "Ghost iterations must be at least 1")
            }
            BuilderError::InvalidStageDelay {
                base_ms,
                multiplier,
            } => write!(
                f,
                "Invalid stage delay {base_ms} ms x {multiplier} (multiplier must be at least 1)"
            ),
            BuilderError::InvalidBusyPolling => {
                write!(f, "BUSY poll interval must be at least 1 ms")
            }
            BuilderError::InvalidChargePumpAttempts => {
                write!(f, "Charge pump attempts must be at least 1")
            }
            BuilderError::InvalidGeometry {
                columns,
                lines,
                line_buffer_length,
            } => write!(
                f,
                "Invalid geometry {columns} x {lines} with {line_buffer_length}-byte lines"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
