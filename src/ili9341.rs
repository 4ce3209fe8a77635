// ILI9341 render context without a framebuffer.
//
// Everything is streamed straight into panel GRAM: a draw call programs the
// column/row address window (CASET/PASET), issues RAMWR and pushes big-endian
// RGB565 bytes. The only state kept on the MCU is the active window, the two
// colors and an optional font.
//
// Bus: any `display_interface::WriteOnlyDataCommand` (D/C framed SPI on the
// board, see `display.rs`).

use alloc::vec::Vec;

use display_interface::{DataFormat, DisplayError, WriteOnlyDataCommand};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::color::{color565, rgb565_to_wire};
use crate::commands::{self, CASET, DISPON, INVOFF, INVON, MADCTL, PASET, RAMWR};
use crate::config::{Orientation, PanelConfig, Rotation};
use crate::dif::DifError;
use crate::font::ActiveFont;
use crate::window::{Area, Window};

/// Pixels per burst when streaming a solid color.
pub const FILL_CHUNK: usize = 256;
const FILL_CHUNK_BYTES: usize = FILL_CHUNK * 2;

/// Error type for every drawing and panel call.
#[derive(Debug)]
pub enum Ili9341Error {
    /// The bus rejected a command or data write.
    Interface(DisplayError),
    /// A scratch buffer could not be allocated.
    OutOfMemory,
    /// Pixel buffer length does not match the rectangle.
    BufferSize { expected: usize, actual: usize },
    /// Text operation without a font.
    NoFont,
    Image(DifError),
}

impl From<DisplayError> for Ili9341Error {
    fn from(e: DisplayError) -> Self {
        Self::Interface(e)
    }
}

impl From<DifError> for Ili9341Error {
    fn from(e: DifError) -> Self {
        Self::Image(e)
    }
}

/// Logical screen size after orientation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScreenDimensions {
    pub width: u16,
    pub height: u16,
}

/// Pulse the reset line. Call before [`Ili9341::init`] when RST is wired.
pub fn hard_reset<RST, D>(rst: &mut RST, delay: &mut D) -> Result<(), RST::Error>
where
    RST: OutputPin,
    D: DelayNs,
{
    rst.set_high()?;
    delay.delay_ms(5);
    rst.set_low()?;
    delay.delay_ms(20);
    rst.set_high()?;
    delay.delay_ms(150);
    Ok(())
}

pub struct Ili9341<'f, DI> {
    di: DI,
    config: PanelConfig,
    orientation: Orientation,
    inverted: bool,
    screen: ScreenDimensions,
    pub(crate) window: Window,
    pub(crate) font: Option<ActiveFont<'f>>,
}

impl<'f, DI> Ili9341<'f, DI>
where
    DI: WriteOnlyDataCommand,
{
    /// Wrap a bus. Nothing is sent until [`init`](Self::init).
    pub fn new(di: DI, config: PanelConfig) -> Self {
        let (width, height) = config.logical_size();
        Self {
            di,
            config,
            orientation: config.orientation,
            inverted: config.inverted,
            screen: ScreenDimensions { width, height },
            window: Window::full(width, height),
            font: None,
        }
    }

    /// Power-on sequence, then the configured orientation and inversion.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Ili9341Error> {
        let sent = commands::run_command_list(&mut self.di, delay, commands::INIT_SEQUENCE)
            .map_err(|e| {
                log_error!("init: command table failed: {:?}", e);
                Ili9341Error::Interface(e)
            })?;
        log_debug!("init: {} commands", sent);

        self.set_orientation(self.config.orientation)?;
        self.set_inverted(self.config.inverted)?;

        commands::write_command(&mut self.di, DISPON, &[])?;
        delay.delay_ms(100);

        log_info!(
            "ILI9341 ready: {}x{} madctl=0x{:02X}",
            self.screen.width,
            self.screen.height,
            self.orientation.madctl()
        );
        Ok(())
    }

    /// Give the bus back.
    pub fn release(self) -> DI {
        self.di
    }

    pub fn interface(&self) -> &DI {
        &self.di
    }

    pub fn interface_mut(&mut self) -> &mut DI {
        &mut self.di
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    // ---- Panel control ----

    /// Program MADCTL and swap the logical size when X/Y are exchanged.
    /// Resets the window to the full screen.
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), Ili9341Error> {
        commands::write_command(&mut self.di, MADCTL, &[orientation.madctl()])?;
        self.orientation = orientation;
        let (w, h) = orientation.logical_size(self.config.width, self.config.height);
        self.set_dimensions(w, h);
        Ok(())
    }

    pub fn set_rotation(&mut self, rotation: Rotation) -> Result<(), Ili9341Error> {
        self.set_orientation(rotation.orientation())
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), Ili9341Error> {
        let cmd = if inverted { INVON } else { INVOFF };
        commands::write_command(&mut self.di, cmd, &[])?;
        self.inverted = inverted;
        Ok(())
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Override the logical size (no bus traffic). Resets the window.
    pub fn set_dimensions(&mut self, width: u16, height: u16) {
        self.screen = ScreenDimensions { width, height };
        let (fg, bg) = (self.window.fg(), self.window.bg());
        self.window = Window::full(width, height);
        self.window.set_fg(fg);
        self.window.set_bg(bg);
    }

    #[inline]
    pub fn screen_width(&self) -> u16 {
        self.screen.width
    }

    #[inline]
    pub fn screen_height(&self) -> u16 {
        self.screen.height
    }

    pub fn screen_size(&self) -> ScreenDimensions {
        self.screen
    }

    // ---- Window and colors ----

    /// Set the active window in absolute panel coordinates (inclusive).
    pub fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) {
        self.window.set_bounds(x0, y0, x1, y1);
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn set_fgcolor(&mut self, r: u8, g: u8, b: u8) {
        self.window.set_fg(color565(r, g, b));
    }

    pub fn set_bgcolor(&mut self, r: u8, g: u8, b: u8) {
        self.window.set_bg(color565(r, g, b));
    }

    pub fn set_fgcolor565(&mut self, color: u16) {
        self.window.set_fg(color);
    }

    pub fn set_bgcolor565(&mut self, color: u16) {
        self.window.set_bg(color);
    }

    // ---- Pixel streaming ----

    /// Stream a `w` x `h` block of big-endian RGB565 at local `(x, y)`.
    ///
    /// `buf` must hold exactly `w * h` pixels. Only the part that survives
    /// clipping is sent: one burst when whole rows are visible, one burst per
    /// row otherwise.
    pub fn send_pixels(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        buf: &[u8],
    ) -> Result<(), Ili9341Error> {
        let expected = (w as usize) * (h as usize) * 2;
        if buf.len() != expected {
            log_error!("send_pixels: {}x{} needs {} bytes, got {}", w, h, expected, buf.len());
            return Err(Ili9341Error::BufferSize { expected, actual: buf.len() });
        }
        let Some(area) = self.window.clip(x, y, w, h) else {
            return Ok(());
        };

        let origin = self.window.bounds();
        let skip_cols = (i64::from(area.x0) - i64::from(origin.x0) - i64::from(x)) as usize;
        let skip_rows = (i64::from(area.y0) - i64::from(origin.y0) - i64::from(y)) as usize;
        let stride = (w as usize) * 2;
        let span = (area.width() as usize) * 2;
        let rows = area.height() as usize;

        self.set_address_window(area)?;
        if span == stride {
            let start = skip_rows * stride;
            self.write_pixels(&buf[start..start + rows * stride])
        } else {
            for row in skip_rows..skip_rows + rows {
                let start = row * stride + skip_cols * 2;
                self.write_pixels(&buf[start..start + span])?;
            }
            Ok(())
        }
    }

    /// Solid fill with the foreground color.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32) -> Result<(), Ili9341Error> {
        let fg = self.window.fg_wire();
        self.fill_area(x, y, w, h, fg)
    }

    /// Fill the whole logical screen (as far as the window allows) with fg.
    pub fn fill_screen(&mut self) -> Result<(), Ili9341Error> {
        let (w, h) = (u32::from(self.screen.width), u32::from(self.screen.height));
        self.fill_rect(0, 0, w, h)
    }

    /// Solid fill with an explicit wire-order color. Memory use is one
    /// `FILL_CHUNK` regardless of the area.
    pub(crate) fn fill_area(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        color: [u8; 2],
    ) -> Result<(), Ili9341Error> {
        let Some(area) = self.window.clip(x, y, w, h) else {
            return Ok(());
        };
        let mut todo = area.pixel_count();

        let mut chunk: heapless::Vec<u8, FILL_CHUNK_BYTES> = heapless::Vec::new();
        for _ in 0..todo.min(FILL_CHUNK) {
            chunk.extend_from_slice(&color).ok();
        }

        self.set_address_window(area)?;
        while todo > 0 {
            let n = todo.min(FILL_CHUNK);
            self.write_pixels(&chunk[..n * 2])?;
            todo -= n;
        }
        Ok(())
    }

    // ---- Low-level helpers ----

    /// CASET + PASET + RAMWR for an absolute inclusive area.
    pub(crate) fn set_address_window(&mut self, area: Area) -> Result<(), Ili9341Error> {
        let ca = [(area.x0 >> 8) as u8, area.x0 as u8, (area.x1 >> 8) as u8, area.x1 as u8];
        let ra = [(area.y0 >> 8) as u8, area.y0 as u8, (area.y1 >> 8) as u8, area.y1 as u8];
        commands::write_command(&mut self.di, CASET, &ca)?;
        commands::write_command(&mut self.di, PASET, &ra)?;
        commands::write_command(&mut self.di, RAMWR, &[])?;
        Ok(())
    }

    #[inline]
    pub(crate) fn write_pixels(&mut self, bytes: &[u8]) -> Result<(), Ili9341Error> {
        self.di.send_data(DataFormat::U8(bytes))?;
        Ok(())
    }
}

// -------------------- embedded-graphics integration --------------------
impl<'f, DI> OriginDimensions for Ili9341<'f, DI>
where
    DI: WriteOnlyDataCommand,
{
    fn size(&self) -> Size {
        Size::new(self.window.width(), self.window.height())
    }
}

impl<'f, DI> DrawTarget for Ili9341<'f, DI>
where
    DI: WriteOnlyDataCommand,
{
    type Color = Rgb565;
    type Error = Ili9341Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            self.fill_area(p.x, p.y, 1, 1, rgb565_to_wire(c))?;
        }
        Ok(())
    }

    // One send_pixels call per row
    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let w = area.size.width as usize;
        if w == 0 || area.size.height == 0 {
            return Ok(());
        }

        let mut row: Vec<[u8; 2]> = Vec::new();
        row.try_reserve_exact(w).map_err(|_| {
            log_error!("fill_contiguous: no memory for a {} pixel row", w);
            Ili9341Error::OutOfMemory
        })?;

        let mut colors = colors.into_iter();
        for dy in 0..area.size.height {
            let y = area.top_left.y.saturating_add(dy as i32);
            if self.window.is_below(y) {
                break;
            }
            row.clear();
            row.extend(colors.by_ref().take(w).map(rgb565_to_wire));
            if row.len() < w {
                break;
            }
            self.send_pixels(area.top_left.x, y, w as u32, 1, bytemuck::cast_slice(&row))?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_area(
            area.top_left.x,
            area.top_left.y,
            area.size.width,
            area.size.height,
            rgb565_to_wire(color),
        )
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let (w, h) = (self.window.width(), self.window.height());
        self.fill_area(0, 0, w, h, rgb565_to_wire(color))
    }
}
