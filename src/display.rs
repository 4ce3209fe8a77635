//! Display setup for the ESP32-S3 board.
//
// - SPI2 in mode 0 at `PanelConfig::spi_frequency_hz`, write-only.
// - D/C framing through display-interface-spi, CS through ExclusiveDevice.
// - Hard reset, backlight on, then the panel init sequence.

use display_interface_spi::SPIInterface;
use embedded_hal::delay::DelayNs;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use esp_hal::{
    gpio::Output,
    spi::master::{Config, ConfigError, Spi},
    spi::Mode,
    time::Rate,
    Blocking,
};

use crate::config::PanelConfig;
use crate::ili9341::{hard_reset, Ili9341, Ili9341Error};
use crate::wiring::DisplayPins;

pub type DisplayType<'a> = Ili9341<
    'a,
    SPIInterface<ExclusiveDevice<Spi<'a, Blocking>, Output<'a>, NoDelay>, Output<'a>>,
>;

/// Pins the panel still needs after setup.
pub struct PanelPins<'a> {
    pub lcd_rst: Output<'a>,
    pub lcd_bl: Output<'a>,
}

#[derive(Debug)]
pub enum SetupError {
    Spi(ConfigError),
    Panel(Ili9341Error),
}

pub fn setup_display<'a>(
    display_pins: DisplayPins<'a>,
    config: PanelConfig,
    delay: &mut impl DelayNs,
) -> Result<(DisplayType<'a>, PanelPins<'a>), SetupError> {
    // Destructure pins
    let DisplayPins {
        spi2,
        spi_sck,
        spi_mosi,
        lcd_cs,
        lcd_dc,
        mut lcd_rst,
        mut lcd_bl,
    } = display_pins;

    // Hardware reset & backlight
    let Ok(()) = hard_reset(&mut lcd_rst, delay);
    lcd_bl.set_high();

    let spi_cfg = Config::default()
        .with_frequency(Rate::from_hz(config.spi_frequency_hz))
        .with_mode(Mode::_0);

    let spi = Spi::new(spi2, spi_cfg)
        .map_err(SetupError::Spi)?
        .with_sck(spi_sck)
        .with_mosi(spi_mosi);

    // SPI device + D/C interface
    let Ok(spi_dev) = ExclusiveDevice::new(spi, lcd_cs, NoDelay);
    let di = SPIInterface::new(spi_dev, lcd_dc);

    let mut tft = Ili9341::new(di, config);
    tft.init(delay).map_err(SetupError::Panel)?;

    Ok((tft, PanelPins { lcd_rst, lcd_bl }))
}
