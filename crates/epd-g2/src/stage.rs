//! Ghost-cancelling stages
//!
//! A stage update drives the panel through four stages. Each stage redraws
//! the whole panel from one of the two frames, with every pixel lane passed
//! through a per-lane rule first:
//!
//! | lane  | compensate | white | inverse | normal |
//! |-------|------------|-------|---------|--------|
//! | `00`  | `00`       | `00`  | `00`    | `00`   |
//! | `01`  | `00`       | `00`  | `00`    | `01`   |
//! | `10`  | `11`       | `10`  | `11`    | `10`   |
//! | `11`  | `10`       | `00`  | `00`    | `11`   |
//!
//! Only the two bitmap halves of an encoded line are transformed; the scan
//! region and border byte pass through untouched.

use crate::line::bitmap_halves_mut;

/// Apply a 4-entry lane table to every 2-bit lane of `byte`
const fn map_lanes(byte: u8, table: [u8; 4]) -> u8 {
    let mut out = 0;
    let mut shift: u32 = 0;
    while shift < 8 {
        let lane = (byte >> shift) & 0b11;
        out |= table[lane as usize] << shift;
        shift += 2;
    }
    out
}

/// Swap drive states of the previous image
pub const fn compensate(byte: u8) -> u8 {
    map_lanes(byte, [0b00, 0b00, 0b11, 0b10])
}

/// Keep `10` lanes, drop everything else
pub const fn flatten_white(byte: u8) -> u8 {
    map_lanes(byte, [0b00, 0b00, 0b10, 0b00])
}

/// Turn `10` lanes into `11`, drop everything else
pub const fn invert(byte: u8) -> u8 {
    map_lanes(byte, [0b00, 0b00, 0b11, 0b00])
}

/// Which frame a stage redraws
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// The image currently on the panel
    Previous,
    /// The image being drawn
    Next,
}

/// One stage of a stage update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Previous image, compensated
    Compensate,
    /// Previous image, flattened to white
    White,
    /// Next image, inverted
    Inverse,
    /// Next image as is
    Normal,
}

impl Stage {
    /// Stages in the order they are driven
    pub const ALL: [Stage; 4] = [Stage::Compensate, Stage::White, Stage::Inverse, Stage::Normal];

    /// Frame the stage draws from
    pub fn source(self) -> Source {
        match self {
            Stage::Compensate | Stage::White => Source::Previous,
            Stage::Inverse | Stage::Normal => Source::Next,
        }
    }

    /// Full-panel passes as a multiple of the ghost iteration count
    pub fn pass_multiplier(self) -> u16 {
        match self {
            Stage::Normal => 2,
            _ => 1,
        }
    }

    /// Full-panel passes for a ghost iteration count
    pub fn passes(self, ghost_iterations: u8) -> u16 {
        u16::from(ghost_iterations) * self.pass_multiplier()
    }

    /// Transform one frame byte
    pub fn transform(self, byte: u8) -> u8 {
        match self {
            Stage::Compensate => compensate(byte),
            Stage::White => flatten_white(byte),
            Stage::Inverse => invert(byte),
            Stage::Normal => byte,
        }
    }

    /// Transform both bitmap halves of an encoded line in place
    pub fn apply_to_line(self, line: &mut [u8]) {
        if self == Stage::Normal {
            return;
        }
        let (first, second) = bitmap_halves_mut(line);
        for byte in first.iter_mut().chain(second.iter_mut()) {
            *byte = self.transform(*byte);
        }
    }
}
