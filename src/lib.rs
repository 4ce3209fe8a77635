//! Framebuffer-less ILI9341 renderer.
//!
//! Shapes, bitmap-font text and DIF images are streamed straight into the
//! panel's GRAM over any `display_interface::WriteOnlyDataCommand`; the MCU
//! only holds the active window, two colors and a font reference.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
mod logging;

pub mod color;
pub mod commands;
pub mod config;
pub mod demo;
pub mod dif;
pub mod font;
pub mod fonts;
pub mod ili9341;
pub mod primitives;
pub mod window;

#[cfg(feature = "esp32s3")]
pub mod display;
#[cfg(feature = "esp32s3")]
pub mod wiring;

#[cfg(test)]
mod testing;

pub use ili9341::{Ili9341, Ili9341Error, ScreenDimensions};
