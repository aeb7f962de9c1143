//! Graphics support via embedded-graphics
//!
//! This module provides [`FrameCanvas`], a frame buffer in the panel's
//! 2-bit-per-pixel layout that implements the
//! [`DrawTarget`](embedded_graphics_core::draw_target::DrawTarget) trait from
//! the embedded-graphics ecosystem. The finished buffer is passed straight to
//! [`Display::push_frame`](crate::display::Display::push_frame) or
//! [`Display::stage_update`](crate::display::Display::stage_update).
//!
//! ## Pixel layout
//!
//! Line `y` starts at byte `y * 32`. Column `x` lives in byte `x / 4`, lane
//! `x % 4`, with lane 0 in the two most significant bits.
//! [`BinaryColor::On`] is black (`11`), [`BinaryColor::Off`] is white (`10`).
//!
//! ## Example
//!
//! ```rust,ignore
//! use epd_g2::{FrameCanvas, Rotation};
//! use embedded_graphics::{pixelcolor::BinaryColor, prelude::*, primitives::*};
//!
//! let mut previous = FrameCanvas::new([0u8; 96 * 32], Rotation::Rotate0);
//! let mut next = FrameCanvas::new([0u8; 96 * 32], Rotation::Rotate0);
//! previous.clear(BinaryColor::Off)?;
//! next.clear(BinaryColor::Off)?;
//!
//! Circle::new(Point::new(40, 24), 48)
//!     .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 2))
//!     .draw(&mut next)?;
//!
//! display.stage_update(&mut delay, previous.frame(), next.frame())?;
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::BinaryColor,
    prelude::Pixel,
};

use crate::config::{COLUMNS_144, LINES_144};

/// Lane value driving a pixel black
pub const LANE_BLACK: u8 = 0b11;
/// Lane value driving a pixel white
pub const LANE_WHITE: u8 = 0b10;

const WIDTH: u32 = COLUMNS_144 as u32;
const HEIGHT: u32 = LINES_144 as u32;
const BYTES_PER_LINE: usize = COLUMNS_144 as usize / 4;

/// Bytes in one frame
pub const FRAME_SIZE: usize = LINES_144 as usize * BYTES_PER_LINE;

/// Display rotation relative to native orientation
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Rotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate 90 degrees clockwise
    Rotate90,
    /// Rotate 180 degrees
    Rotate180,
    /// Rotate 270 degrees clockwise
    Rotate270,
}

/// Map a point in rotated space to native panel coordinates
fn apply_rotation(x: u32, y: u32, rotation: Rotation) -> (u32, u32) {
    match rotation {
        Rotation::Rotate0 => (x, y),
        Rotation::Rotate90 => (y, HEIGHT - 1 - x),
        Rotation::Rotate180 => (WIDTH - 1 - x, HEIGHT - 1 - y),
        Rotation::Rotate270 => (WIDTH - 1 - y, x),
    }
}

/// Frame buffer for the 1.44" panel
///
/// `B` is any byte storage of at least [`FRAME_SIZE`] bytes; writes past
/// the end of a shorter buffer are dropped.
pub struct FrameCanvas<B> {
    buffer: B,
    rotation: Rotation,
}

impl<B> FrameCanvas<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Wrap a buffer; its contents are kept as is
    pub fn new(buffer: B, rotation: Rotation) -> Self {
        Self { buffer, rotation }
    }

    /// The frame, ready for the driver
    pub fn frame(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    /// Current rotation
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Give back the buffer
    pub fn into_inner(self) -> B {
        self.buffer
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: BinaryColor) {
        let (x, y) = apply_rotation(x, y, self.rotation);
        let index = y as usize * BYTES_PER_LINE + x as usize / 4;
        let shift = 6 - 2 * (x % 4);
        let lane = match color {
            BinaryColor::On => LANE_BLACK,
            BinaryColor::Off => LANE_WHITE,
        };

        if let Some(byte) = self.buffer.as_mut().get_mut(index) {
            *byte = (*byte & !(0b11 << shift)) | (lane << shift);
        }
    }
}

impl<B> DrawTarget for FrameCanvas<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let sz = self.size();

        for Pixel(Point { x, y }, color) in pixels {
            if x >= 0 && y >= 0 {
                let x = x as u32;
                let y = y as u32;
                if x < sz.width && y < sz.height {
                    self.set_pixel(x, y, color);
                }
            }
        }

        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let lane = match color {
            BinaryColor::On => LANE_BLACK,
            BinaryColor::Off => LANE_WHITE,
        };
        let frame = self.buffer.as_mut();
        let len = frame.len().min(FRAME_SIZE);
        frame[..len].fill(lane * 0b0101_0101);
        Ok(())
    }
}

impl<B> OriginDimensions for FrameCanvas<B> {
    fn size(&self) -> Size {
        match self.rotation {
            Rotation::Rotate0 | Rotation::Rotate180 => Size::new(WIDTH, HEIGHT),
            Rotation::Rotate90 | Rotation::Rotate270 => Size::new(HEIGHT, WIDTH),
        }
    }
}
