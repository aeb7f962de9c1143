//! Line encoding
//!
//! The controller takes the panel one scan line at a time. An encoded line
//! is 73 bytes:
//!
//! ```text
//! [0, 16)   first half of the line's bitmap
//! [16, 40)  scan-address region, exactly one 2-bit lane set to 0b11
//! [40, 56)  second half of the line's bitmap
//! [56, 72)  unused, zero
//! [72]      border byte
//! ```
//!
//! Frames are 2 bits per pixel, 32 bytes per line, so line `n` of a frame
//! starts at byte `n * 32` and is split 16/16 around the scan region.

/// Bytes in each half of a line's bitmap
pub const BITMAP_HALF_LEN: usize = 16;
/// Bytes in the scan-address region
pub const SCAN_LEN: usize = 24;
/// Offset of the scan-address region
pub const SCAN_OFFSET: usize = BITMAP_HALF_LEN;
/// Offset of the second bitmap half
pub const SECOND_HALF_OFFSET: usize = SCAN_OFFSET + SCAN_LEN;
/// Bytes of zero padding between the second half and the border byte
pub const PADDING_LEN: usize = 16;
/// Offset of the border byte
pub const BORDER_OFFSET: usize = SECOND_HALF_OFFSET + BITMAP_HALF_LEN + PADDING_LEN;
/// Length of one encoded line
pub const LINE_BUFFER_LEN: usize = BORDER_OFFSET + 1;
/// Bytes of frame data per scan line
pub const FRAME_LINE_BYTES: usize = 2 * BITMAP_HALF_LEN;
/// Scan rows addressable through the scan region
pub const SCAN_ROWS: usize = SCAN_LEN * 4;

/// Lane value selecting a scan row
const SCAN_SELECT: u8 = 0b11;
/// Border byte of the dummy line sent while powering off
const BORDER_DUMMY: u8 = 0xAA;

/// Position of a line's select lane within the scan region
///
/// Returns `(byte offset within the scan region, lane)`. Lane `n` sits at bit
/// offset `2 * n`. Rows are addressed from the end of the region backwards.
pub const fn scan_position(line_no: usize) -> (usize, usize) {
    (SCAN_LEN - 1 - line_no / 4, line_no % 4)
}

/// Encode line `line_no` of `frame` into `line`
///
/// `line` must be at least [`LINE_BUFFER_LEN`] bytes and `frame` must hold
/// the whole line; `line_no` must be below [`SCAN_ROWS`]. The caller checks
/// frame length up front, so this only debug-asserts.
pub fn encode_line(line: &mut [u8], frame: &[u8], line_no: usize) {
    debug_assert!(line_no < SCAN_ROWS);
    debug_assert!(line.len() >= LINE_BUFFER_LEN);

    let line = &mut line[..LINE_BUFFER_LEN];
    line.fill(0);

    let source = &frame[line_no * FRAME_LINE_BYTES..(line_no + 1) * FRAME_LINE_BYTES];
    let (first, second) = source.split_at(BITMAP_HALF_LEN);
    line[..BITMAP_HALF_LEN].copy_from_slice(first);
    line[SECOND_HALF_OFFSET..SECOND_HALF_OFFSET + BITMAP_HALF_LEN].copy_from_slice(second);

    let (byte, lane) = scan_position(line_no);
    line[SCAN_OFFSET + byte] = SCAN_SELECT << (lane * 2);
}

/// Both bitmap halves of an encoded line
pub fn bitmap_halves_mut(line: &mut [u8]) -> (&mut [u8], &mut [u8]) {
    let (head, tail) = line.split_at_mut(SECOND_HALF_OFFSET);
    (
        &mut head[..BITMAP_HALF_LEN],
        &mut tail[..BITMAP_HALF_LEN],
    )
}

/// Blank line selecting every scan row at once
///
/// Writing it once drives "nothing" on the whole panel.
pub fn fill_nothing_line(line: &mut [u8]) {
    let line = &mut line[..LINE_BUFFER_LEN];
    line.fill(0);
    line[SCAN_OFFSET..SCAN_OFFSET + SCAN_LEN].fill(0xFF);
}

/// Line with no data, no scan row and the dummy border value
pub fn fill_border_dummy_line(line: &mut [u8]) {
    let line = &mut line[..LINE_BUFFER_LEN];
    line.fill(0);
    line[BORDER_OFFSET] = BORDER_DUMMY;
}
