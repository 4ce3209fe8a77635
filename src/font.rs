//! Bitmap fonts rendered one scanline at a time.
//!
//! Glyph bitmaps are 1 bit per pixel, MSB first, with rows packed back to
//! back (a row does not start on a byte boundary). Text is never rasterized
//! as a whole: [`ActiveFont::fill_pixel_line`] paints a single row of a
//! string into a caller-provided buffer, which `print` streams immediately.

use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use critical_section::Mutex;
use display_interface::WriteOnlyDataCommand;

use crate::ili9341::{Ili9341, Ili9341Error};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Glyph {
    /// Byte offset of the first row in the font bitmap.
    pub bitmap_offset: u16,
    pub width: u8,
    pub height: u8,
    /// Cursor advance after this glyph.
    pub x_advance: u8,
    /// Left edge relative to the cursor.
    pub x_offset: i8,
    /// Top edge relative to the baseline (negative is above).
    pub y_offset: i8,
}

impl Glyph {
    pub const fn new(
        bitmap_offset: u16,
        width: u8,
        height: u8,
        x_advance: u8,
        x_offset: i8,
        y_offset: i8,
    ) -> Self {
        Self { bitmap_offset, width, height, x_advance, x_offset, y_offset }
    }
}

/// Box that fits every glyph of a font.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FontMetrics {
    pub height: u16,
    pub width: u16,
    pub min_x_offset: i8,
    pub min_y_offset: i8,
}

/// A font covering the character codes `first..=last`.
///
/// Metrics are memoized on the font itself, so a `static` font is scanned at
/// most once no matter how often it is made current.
pub struct Font<'a> {
    pub bitmap: &'a [u8],
    /// One entry per code, starting at `first`.
    pub glyphs: &'a [Glyph],
    pub first: u8,
    pub last: u8,
    pub y_advance: u8,
    metrics: Mutex<Cell<Option<FontMetrics>>>,
}

impl<'a> Font<'a> {
    pub const fn new(
        bitmap: &'a [u8],
        glyphs: &'a [Glyph],
        first: u8,
        last: u8,
        y_advance: u8,
    ) -> Self {
        Self { bitmap, glyphs, first, last, y_advance, metrics: Mutex::new(Cell::new(None)) }
    }

    /// Ship precomputed metrics so `set_font` skips the scan.
    pub const fn with_metrics(self, metrics: FontMetrics) -> Self {
        Self {
            bitmap: self.bitmap,
            glyphs: self.glyphs,
            first: self.first,
            last: self.last,
            y_advance: self.y_advance,
            metrics: Mutex::new(Cell::new(Some(metrics))),
        }
    }

    /// Memoized metrics, if they were computed or supplied.
    pub fn metrics(&self) -> Option<FontMetrics> {
        critical_section::with(|cs| self.metrics.borrow(cs).get())
    }

    /// Scan every glyph in `first..=last`. Pure, so repeated calls agree.
    pub fn analyze(&self) -> FontMetrics {
        let mut top: Option<i32> = None;
        let mut bottom: Option<i32> = None;
        let mut min_x: Option<i8> = None;
        let mut widest = 0u16;

        for g in self.range() {
            let yo = i32::from(g.y_offset);
            top = Some(top.map_or(yo, |t| t.min(yo)));
            bottom = Some(bottom.map_or(yo + i32::from(g.height), |b| b.max(yo + i32::from(g.height))));
            min_x = Some(min_x.map_or(g.x_offset, |m| m.min(g.x_offset)));
            widest = widest.max(u16::from(g.x_advance)).max(u16::from(g.width));
        }

        let top = top.unwrap_or(0);
        let height = (bottom.unwrap_or(0) - top).clamp(0, i32::from(u16::MAX)) as u16;
        FontMetrics {
            height,
            width: widest,
            min_x_offset: min_x.unwrap_or(0),
            min_y_offset: top as i8,
        }
    }

    /// Metrics, computing and storing them on first use.
    pub fn ensure_metrics(&self) -> FontMetrics {
        if let Some(m) = self.metrics() {
            return m;
        }
        let m = self.analyze();
        critical_section::with(|cs| self.metrics.borrow(cs).set(Some(m)));
        m
    }

    /// Glyph for `c`. Codes outside the font fall back to the space glyph;
    /// `None` when that is missing too.
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.lookup(u32::from(c)).or_else(|| self.lookup(u32::from(' ')))
    }

    fn lookup(&self, code: u32) -> Option<&Glyph> {
        if code < u32::from(self.first) || code > u32::from(self.last) {
            return None;
        }
        self.glyphs.get((code - u32::from(self.first)) as usize)
    }

    fn range(&self) -> &[Glyph] {
        let count = if self.last >= self.first {
            usize::from(self.last - self.first) + 1
        } else {
            0
        };
        &self.glyphs[..count.min(self.glyphs.len())]
    }
}

impl Clone for Font<'_> {
    fn clone(&self) -> Self {
        Self {
            bitmap: self.bitmap,
            glyphs: self.glyphs,
            first: self.first,
            last: self.last,
            y_advance: self.y_advance,
            metrics: Mutex::new(Cell::new(self.metrics())),
        }
    }
}

impl fmt::Debug for Font<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("first", &self.first)
            .field("last", &self.last)
            .field("y_advance", &self.y_advance)
            .field("glyphs", &self.glyphs.len())
            .field("metrics", &self.metrics())
            .finish_non_exhaustive()
    }
}

/// Reads a bitmap one bit at a time, MSB first.
pub struct BitCursor<'a> {
    bytes: &'a [u8],
    index: usize,
    bit: u8,
}

impl<'a> BitCursor<'a> {
    /// Start `bit_offset` bits into `bytes`.
    pub fn new(bytes: &'a [u8], bit_offset: usize) -> Self {
        Self { bytes, index: bit_offset / 8, bit: (bit_offset % 8) as u8 }
    }

    /// Bits past the end read as clear.
    pub fn next_bit(&mut self) -> bool {
        let set = self
            .bytes
            .get(self.index)
            .is_some_and(|b| b & (0x80 >> self.bit) != 0);
        self.bit += 1;
        if self.bit == 8 {
            self.bit = 0;
            self.index += 1;
        }
        set
    }
}

/// The font attached to a render context together with its metrics.
#[derive(Copy, Clone, Debug)]
pub struct ActiveFont<'f> {
    font: &'f Font<'f>,
    metrics: FontMetrics,
}

impl<'f> ActiveFont<'f> {
    pub fn new(font: &'f Font<'f>) -> Self {
        let metrics = font.ensure_metrics();
        Self { font, metrics }
    }

    pub fn font(&self) -> &'f Font<'f> {
        self.font
    }

    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    pub fn string_width(&self, s: &str) -> u16 {
        self.layout(s, |_, _| {})
    }

    pub fn string_height(&self, s: &str) -> u16 {
        if s.is_empty() {
            0
        } else {
            self.metrics.height
        }
    }

    /// Paint row `line` of `s` into `buf` with `color`, leaving unset bits
    /// alone. Returns the string width in pixels.
    pub fn fill_pixel_line(&self, s: &str, line: u16, buf: &mut [[u8; 2]], color: [u8; 2]) -> u16 {
        let line = i32::from(line);
        let min_yo = i32::from(self.metrics.min_y_offset);
        let bitmap = self.font.bitmap;

        self.layout(s, |glyph, left| {
            let first_row = i32::from(glyph.y_offset) - min_yo;
            let last_row = first_row + i32::from(glyph.height) - 1;
            if line < first_row || line > last_row {
                return;
            }
            let w = usize::from(glyph.width);
            let start = usize::from(glyph.bitmap_offset);
            let mut bits = BitCursor::new(
                bitmap.get(start..).unwrap_or(&[]),
                (line - first_row) as usize * w,
            );
            for col in 0..w {
                if !bits.next_bit() {
                    continue;
                }
                let x = left + col as i32;
                if let Some(px) = usize::try_from(x).ok().and_then(|i| buf.get_mut(i)) {
                    *px = color;
                }
            }
        })
    }

    // Walk the glyphs of `s`, handing each one and its left edge to `place`.
    // Returns the total width: a negative x_offset on the first glyph shifts
    // everything right, and ink past the last advance is added at the end.
    // That tail is `max(0, x_offset + width - x_advance)`, the ink's right
    // edge measured from the cursor.
    fn layout(&self, s: &str, mut place: impl FnMut(&Glyph, i32)) -> u16 {
        let mut cursor: i32 = 0;
        let mut first = true;
        let mut overhang = 0;

        for c in s.chars() {
            let Some(glyph) = self.font.glyph(c) else { continue };
            let xo = i32::from(glyph.x_offset);
            if first && xo < 0 {
                cursor = -xo;
            }
            first = false;

            place(glyph, cursor + xo);

            let right = xo + i32::from(glyph.width);
            let advance = i32::from(glyph.x_advance);
            overhang = (right - advance).max(0);
            cursor += advance;
        }

        (cursor + overhang).clamp(0, i32::from(u16::MAX)) as u16
    }
}

impl<'f, DI> Ili9341<'f, DI>
where
    DI: WriteOnlyDataCommand,
{
    /// Make `font` current. Metrics are analyzed on the first use of a font
    /// and reused afterwards.
    pub fn set_font(&mut self, font: &'f Font<'f>) {
        let active = ActiveFont::new(font);
        log_debug!(
            "font 0x{:02X}..0x{:02X}: {}x{} box",
            font.first,
            font.last,
            active.metrics().width,
            active.metrics().height
        );
        self.font = Some(active);
    }

    pub fn clear_font(&mut self) {
        self.font = None;
    }

    pub fn font(&self) -> Option<&ActiveFont<'f>> {
        self.font.as_ref()
    }

    pub fn string_width(&self, s: &str) -> u16 {
        self.font.as_ref().map_or(0, |f| f.string_width(s))
    }

    pub fn string_height(&self, s: &str) -> u16 {
        self.font.as_ref().map_or(0, |f| f.string_height(s))
    }

    pub fn max_font_width(&self) -> u16 {
        self.font.as_ref().map_or(0, |f| f.metrics().width)
    }

    pub fn max_font_height(&self) -> u16 {
        self.font.as_ref().map_or(0, |f| f.metrics().height)
    }

    /// Y of text line `n`; negative `n` counts up from the screen bottom.
    pub fn line(&self, n: i32) -> i32 {
        let y = n.saturating_mul(i32::from(self.max_font_height()));
        if y < 0 {
            y.saturating_add(i32::from(self.screen_height()))
        } else {
            y
        }
    }

    /// Render `s` with its top-left corner at local `(x, y)`, fg on bg.
    pub fn print(&mut self, x: i32, y: i32, s: &str) -> Result<(), Ili9341Error> {
        let Some(font) = self.font else {
            log_warn!("print: no font set");
            return Err(Ili9341Error::NoFont);
        };

        let width = font.string_width(s);
        let height = font.string_height(s);
        if width == 0 || height == 0 {
            return Ok(());
        }

        let mut row: Vec<[u8; 2]> = Vec::new();
        row.try_reserve_exact(usize::from(width)).map_err(|_| {
            log_error!("print: no memory for a {} pixel row", width);
            Ili9341Error::OutOfMemory
        })?;
        let (fg, bg) = (self.window.fg_wire(), self.window.bg_wire());
        row.resize(usize::from(width), bg);

        for line in 0..height {
            let ly = y.saturating_add(i32::from(line));
            if self.window.is_below(ly) {
                break;
            }
            row.fill(bg);
            let painted = font.fill_pixel_line(s, line, &mut row, fg);
            if painted != width {
                log_debug!("print: row {} is {} px, expected {}", line, painted, width);
            }
            self.send_pixels(x, ly, u32::from(width), 1, bytemuck::cast_slice(&row))?;
        }
        Ok(())
    }
}
