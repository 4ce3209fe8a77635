//! ILI9341 streaming renderer demo
//! ========================================
//! needs the Xtensa toolchain (espup)
//! cargo run --release --features esp32s3
//! ========================================
//!
//! Cycles through the demo pages, rotating the panel after each full pass.

//% CHIPS: esp32s3
//% FEATURES: esp-hal/unstable

#![no_std]
#![no_main]

// Define the application description, which is placed in a special section of the binary.
// This is used by the bootloader to verify the application.
esp_bootloader_esp_idf::esp_app_desc!();

use esp_backtrace as _;
use esp_hal::{delay::Delay, main, Config};
use esp_println::println;

use embedded_hal::delay::DelayNs;

use ili9341_stream::{
    config::{PanelConfig, Rotation},
    demo::{render_page, DemoPage},
    display::setup_display,
    wiring::{init_board_pins, BoardPins},
};

extern crate alloc;

// Time each page stays on screen
const PAGE_MS: u32 = 3000;

#[main]
fn main() -> ! {
    let peripherals = esp_hal::init(Config::default());

    // Row scratch buffers for text and images
    esp_alloc::heap_allocator!(size: 64 * 1024);

    let BoardPins { display_pins } = init_board_pins(peripherals);
    let mut delay = Delay::new();

    let config = PanelConfig::default();
    let (mut tft, _panel_pins) = match setup_display(display_pins, config, &mut delay) {
        Ok(display) => display,
        Err(e) => {
            println!("display setup failed: {:?}", e);
            loop {
                delay.delay_ms(1000);
            }
        }
    };
    println!("display {}x{}", tft.screen_width(), tft.screen_height());

    let mut page = DemoPage::Shapes;
    let mut rotation = Rotation::Landscape;

    loop {
        if let Err(e) = render_page(&mut tft, page) {
            println!("page {:?} failed: {:?}", page, e);
        }
        delay.delay_ms(PAGE_MS);

        page = page.next();
        if page == DemoPage::Shapes {
            rotation = Rotation::from_u8(rotation.as_u8() + 1);
            if let Err(e) = tft.set_rotation(rotation) {
                println!("rotation {:?} failed: {:?}", rotation, e);
            }
        }
    }
}
