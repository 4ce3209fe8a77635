//! RGB565 helpers and the named palette.
//!
//! The panel consumes pixels as big-endian RGB565, so colors are kept in two
//! forms: the packed `u16` callers work with, and the `[u8; 2]` wire form the
//! streamer sends verbatim.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::IntoStorage;

pub const BLACK: u16 = 0x0000; //   0,   0,   0
pub const NAVY: u16 = 0x000F; //   0,   0, 128
pub const DARKGREEN: u16 = 0x03E0; //   0, 128,   0
pub const DARKCYAN: u16 = 0x03EF; //   0, 128, 128
pub const MAROON: u16 = 0x7800; // 128,   0,   0
pub const PURPLE: u16 = 0x780F; // 128,   0, 128
pub const OLIVE: u16 = 0x7BE0; // 128, 128,   0
pub const LIGHTGREY: u16 = 0xC618; // 192, 192, 192
pub const DARKGREY: u16 = 0x7BEF; // 128, 128, 128
pub const BLUE: u16 = 0x001F; //   0,   0, 255
pub const GREEN: u16 = 0x07E0; //   0, 255,   0
pub const CYAN: u16 = 0x07FF; //   0, 255, 255
pub const RED: u16 = 0xF800; // 255,   0,   0
pub const MAGENTA: u16 = 0xF81F; // 255,   0, 255
pub const YELLOW: u16 = 0xFFE0; // 255, 255,   0
pub const WHITE: u16 = 0xFFFF; // 255, 255, 255
pub const ORANGE: u16 = 0xFD20; // 255, 165,   0
pub const GREENYELLOW: u16 = 0xAFE5; // 173, 255,  47
pub const PINK: u16 = 0xF81F;

/// Pack 8-bit components into RGB565 by truncating the low bits.
#[inline]
pub const fn color565(r: u8, g: u8, b: u8) -> u16 {
    (((r & 0xF8) as u16) << 8) | (((g & 0xFC) as u16) << 3) | (((b & 0xF8) as u16) >> 3)
}

/// Packed RGB565 to the two bytes sent on the bus.
#[inline]
pub const fn to_wire(color: u16) -> [u8; 2] {
    color.to_be_bytes()
}

/// Two wire bytes back to packed RGB565.
#[inline]
pub const fn from_wire(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

// embedded-graphics colors are already 565, only the byte order changes
#[inline]
pub fn rgb565_to_wire(color: Rgb565) -> [u8; 2] {
    to_wire(color.into_storage())
}
