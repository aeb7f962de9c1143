//! Driver for G2 line-addressed e-Paper panel controllers
//!
//! The controller is written one scan line at a time over SPI. This crate
//! brings the controller up from a powered-off panel, encodes frames into
//! lines, drives the four-stage ghost-cancelling update bistable panels
//! need, and powers the panel down again.
//!
//! Only the 1.44" (128 x 96) panel has a complete profile.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use epd_g2::{Config, Display, Interface, PanelKind};
//!
//! let interface = Interface::new(spi_bus, cs, rst, pwr, discharge, busy);
//! let config = Config::for_panel(PanelKind::Epd144)?;
//! let mut display = Display::new(interface, config, ())?;
//!
//! display.power_up(&mut delay)?;
//! display.stage_update(&mut delay, &previous, &next)?;
//! display.power_off(&mut delay)?;
//! ```
//!
//! ## Frames
//!
//! A frame is `lines * 32` bytes, 2 bits per pixel, four pixels per byte
//! with the first pixel in the most significant bits. Lane `11` drives a
//! pixel black, `10` white, `00` leaves it alone. With the `graphics`
//! feature, [`FrameCanvas`] builds frames through embedded-graphics.
//!
//! ## Notifications
//!
//! Every operation returns a `Result`. A [`DisplayObserver`] passed to
//! [`Display::new`] is additionally told when power-up completes or fails
//! and when a stage update has finished.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod interface;
pub mod line;
pub mod observer;
pub mod power;
pub mod stage;

#[cfg(feature = "graphics")]
#[cfg_attr(docsrs, doc(cfg(feature = "graphics")))]
pub mod graphics;

pub use config::{Builder, Config, PanelKind};
pub use display::Display;
pub use error::{BuilderError, Error, ErrorCode};
pub use interface::{DisplayInterface, Interface, InterfaceError};
pub use observer::DisplayObserver;
pub use power::PowerState;
pub use stage::Stage;

#[cfg(feature = "graphics")]
pub use graphics::{FrameCanvas, Rotation};
