// Board pin mapping for an ESP32-S3 devkit with a bare ILI9341 module on SPI2.
//! The following wiring is assumed:
//! - SCK  => GPIO12
//! - MOSI => GPIO11
//! - CS   => GPIO10
//! - D/C  => GPIO9
//! - RST  => GPIO14
//! - LED (backlight) => GPIO2
//! - VCC => 3.3V, GND => GND
//! MISO is not connected; the renderer never reads GRAM back.

use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::peripherals::{Peripherals, GPIO11, GPIO12, SPI2};

pub struct DisplayPins<'a> {
    pub spi2: SPI2<'a>,
    pub spi_sck: GPIO12<'a>,
    pub spi_mosi: GPIO11<'a>,
    pub lcd_cs: Output<'a>,
    pub lcd_dc: Output<'a>,
    pub lcd_rst: Output<'a>,
    pub lcd_bl: Output<'a>,
}

pub struct BoardPins<'a> {
    pub display_pins: DisplayPins<'a>,
}

pub fn init_board_pins<'a>(p: Peripherals) -> BoardPins<'a> {
    // LCD control pins, SCK/MOSI are handed to the SPI driver untouched
    let lcd_cs = Output::new(p.GPIO10, Level::High, OutputConfig::default());
    let lcd_dc = Output::new(p.GPIO9, Level::Low, OutputConfig::default());
    let lcd_rst = Output::new(p.GPIO14, Level::High, OutputConfig::default());
    let lcd_bl = Output::new(p.GPIO2, Level::Low, OutputConfig::default());

    BoardPins {
        display_pins: DisplayPins {
            spi2: p.SPI2,
            spi_sck: p.GPIO12,
            spi_mosi: p.GPIO11,
            lcd_cs,
            lcd_dc,
            lcd_rst,
            lcd_bl,
        },
    }
}
