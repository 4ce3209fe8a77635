//! Demo pages for the firmware.
//!
//! This module provides:
//! - The `DemoPage` enum and its navigation methods (`next`, `prev`, etc.)
//! - The `render_page` function that draws one page with the streaming renderer
//!
//! Layout is computed from the current screen size, so every rotation works.

use alloc::vec::Vec;

use display_interface::WriteOnlyDataCommand;
use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::{Point, Primitive, RgbColor},
    primitives::{Circle, PrimitiveStyle},
    Drawable,
};

use crate::color::{self, color565};
use crate::dif;
use crate::fonts::TINY_DIGITS;
use crate::ili9341::{Ili9341, Ili9341Error};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DemoPage {
    Shapes,
    Lines,
    Text,
    Image,
}

impl DemoPage {
    // All pages, in cycling order
    pub const ALL: [DemoPage; 4] = [DemoPage::Shapes, DemoPage::Lines, DemoPage::Text, DemoPage::Image];

    pub fn next(self) -> Self {
        use DemoPage::*;
        match self {
            Shapes => Lines,
            Lines => Text,
            Text => Image,
            Image => Shapes,
        }
    }

    pub fn prev(self) -> Self {
        use DemoPage::*;
        match self {
            Shapes => Image,
            Lines => Shapes,
            Text => Lines,
            Image => Text,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            DemoPage::Shapes => 1,
            DemoPage::Lines => 2,
            DemoPage::Text => 3,
            DemoPage::Image => 4,
        }
    }

    pub fn from_u8(n: u8) -> Self {
        match n {
            2 => DemoPage::Lines,
            3 => DemoPage::Text,
            4 => DemoPage::Image,
            _ => DemoPage::Shapes,
        }
    }
}

/// Clear the screen and draw `page`.
pub fn render_page<DI>(tft: &mut Ili9341<'_, DI>, page: DemoPage) -> Result<(), Ili9341Error>
where
    DI: WriteOnlyDataCommand,
{
    let (w, h) = (i32::from(tft.screen_width()), i32::from(tft.screen_height()));
    let (cx, cy) = (w / 2, h / 2);

    // Clear display background
    let sw = tft.screen_width();
    let sh = tft.screen_height();
    tft.set_window(0, 0, sw.saturating_sub(1), sh.saturating_sub(1));
    tft.set_fgcolor565(color::BLACK);
    tft.fill_screen()?;

    match page {
        DemoPage::Shapes => {
            tft.set_fgcolor565(color::NAVY);
            tft.fill_round_rect(cx - 100, cy - 60, 200, 120, 16)?;
            tft.set_fgcolor565(color::YELLOW);
            tft.draw_round_rect(cx - 100, cy - 60, 200, 120, 16)?;

            tft.set_fgcolor565(color::RED);
            tft.fill_circle(cx - 50, cy, 30)?;
            tft.set_fgcolor565(color::WHITE);
            tft.draw_circle(cx - 50, cy, 34)?;

            tft.set_fgcolor565(color::GREEN);
            tft.fill_triangle(cx + 20, cy + 40, cx + 80, cy + 40, cx + 50, cy - 40)?;
            tft.set_fgcolor565(color::WHITE);
            tft.draw_triangle(cx + 20, cy + 40, cx + 80, cy + 40, cx + 50, cy - 40)?;

            // embedded-graphics shapes go through the same streamer
            Circle::new(Point::new(cx - 8, cy - 56), 16)
                .into_styled(PrimitiveStyle::with_fill(Rgb565::CYAN))
                .draw(tft)?;
        }
        DemoPage::Lines => {
            let steps = 16;
            for i in 0..=steps {
                tft.set_fgcolor(0, (255 * i / steps) as u8, 255 - (255 * i / steps) as u8);
                tft.draw_line(0, 0, w - 1, (h - 1) * i / steps)?;
                tft.draw_line(w - 1, h - 1, (w - 1) * i / steps, 0)?;
            }
            tft.set_fgcolor565(color::ORANGE);
            tft.draw_rect(4, 4, (w - 8) as u32, (h - 8) as u32)?;
        }
        DemoPage::Text => {
            tft.set_font(&TINY_DIGITS);
            tft.set_bgcolor565(color::BLACK);

            let clock = "12:34.56";
            let text_w = i32::from(tft.string_width(clock));
            let text_h = i32::from(tft.string_height(clock));
            tft.set_fgcolor565(color::GREENYELLOW);
            tft.print(cx - text_w / 2, cy - text_h / 2, clock)?;

            // one row of digits per text line, bottom-up
            tft.set_fgcolor565(color::LIGHTGREY);
            for n in 1..=4 {
                tft.print(2, tft.line(-n), "0123456789-")?;
            }

            // clipped text inside a small window
            let (x0, y0) = ((cx - 20).max(0) as u16, (cy + 20).max(0) as u16);
            tft.set_window(x0, y0, x0 + 39, y0 + 7);
            tft.set_fgcolor565(color::MAGENTA);
            tft.print(-3, 1, "9876543210")?;
        }
        DemoPage::Image => {
            let image = gradient(64, 64)?;
            let mut source: &[u8] = &image;
            tft.draw_dif(cx - 32, cy - 32, &mut source)?;

            // half off the left edge
            let mut source: &[u8] = &image;
            tft.draw_dif(-32, 8, &mut source)?;
        }
    }
    Ok(())
}

// RGB gradient encoded as a DIF image.
fn gradient(width: u32, height: u32) -> Result<Vec<u8>, Ili9341Error> {
    let mut pixels: Vec<u16> = Vec::new();
    pixels
        .try_reserve_exact((width * height) as usize)
        .map_err(|_| Ili9341Error::OutOfMemory)?;
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            pixels.push(color565(r, g, 255 - r));
        }
    }
    Ok(dif::encode_rgb565(width, height, &pixels)?)
}
