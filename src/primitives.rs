// Geometry on top of the pixel streamer.
//
// Every shape is decomposed into horizontal or vertical runs and each run is
// one `fill_area` call (one address window, one RAMWR). Coordinates are local
// to the active window and may be negative; clipping happens per run.
//
// Public entry points take `i32`/`u32`; all shape arithmetic runs in `i64` so
// extreme inputs are truncated by the clip instead of overflowing.

use core::mem::swap;

use display_interface::WriteOnlyDataCommand;

use crate::ili9341::{Ili9341, Ili9341Error};

/// Corner selectors for the quarter-circle outline helper.
pub const CORNER_TOP_LEFT: u8 = 0x1;
pub const CORNER_TOP_RIGHT: u8 = 0x2;
pub const CORNER_BOTTOM_RIGHT: u8 = 0x4;
pub const CORNER_BOTTOM_LEFT: u8 = 0x8;

/// Half selectors for the filled quadrant helper.
pub const HALF_RIGHT: u8 = 0x1;
pub const HALF_LEFT: u8 = 0x2;

/// Circle and corner radii are clamped to this. Larger circles are walked one
/// step per pixel of radius, so the bound keeps every call finite.
pub const RADIUS_LIMIT: u32 = 1 << 17;

// Local coordinates beyond +-FAR are outside every window (GRAM addresses are
// 16-bit), so clamping to it never changes what is drawn.
const FAR: i64 = 1 << 20;

#[inline]
fn local(v: i64) -> i32 {
    v.clamp(-FAR, FAR) as i32
}

// Length of the inclusive run a..=b (order free).
#[inline]
fn run_len(a: i32, b: i32) -> u32 {
    (i64::from(a) - i64::from(b)).unsigned_abs().min(u64::from(u32::MAX - 1)) as u32 + 1
}

impl<'f, DI> Ili9341<'f, DI>
where
    DI: WriteOnlyDataCommand,
{
    pub fn draw_pixel(&mut self, x: i32, y: i32) -> Result<(), Ili9341Error> {
        let Some(area) = self.window.clip(x, y, 1, 1) else {
            return Ok(());
        };
        let fg = self.window.fg_wire();
        self.set_address_window(area)?;
        self.write_pixels(&fg)
    }

    #[inline]
    fn plot(&mut self, x: i64, y: i64) -> Result<(), Ili9341Error> {
        self.draw_pixel(local(x), local(y))
    }

    // Inclusive horizontal run xa..=xb on row y.
    fn hspan(&mut self, xa: i64, xb: i64, y: i64) -> Result<(), Ili9341Error> {
        let (xa, xb) = (local(xa), local(xb));
        let fg = self.window.fg_wire();
        self.fill_area(xa.min(xb), local(y), run_len(xa, xb), 1, fg)
    }

    // Inclusive vertical run ya..=yb in column x.
    fn vspan(&mut self, x: i64, ya: i64, yb: i64) -> Result<(), Ili9341Error> {
        let (ya, yb) = (local(ya), local(yb));
        let fg = self.window.fg_wire();
        self.fill_area(local(x), ya.min(yb), 1, run_len(ya, yb), fg)
    }

    // `len` pixels right from (x, y); nothing when `len <= 0`.
    fn hrun(&mut self, x: i64, y: i64, len: i64) -> Result<(), Ili9341Error> {
        if len <= 0 {
            return Ok(());
        }
        self.hspan(x, x + len - 1, y)
    }

    // `len` pixels down from (x, y); nothing when `len <= 0`.
    fn vrun(&mut self, x: i64, y: i64, len: i64) -> Result<(), Ili9341Error> {
        if len <= 0 {
            return Ok(());
        }
        self.vspan(x, y, y + len - 1)
    }

    // Solid `w` x `h` block; nothing when either side is `<= 0`.
    fn block(&mut self, x: i64, y: i64, w: i64, h: i64) -> Result<(), Ili9341Error> {
        if w <= 0 || h <= 0 {
            return Ok(());
        }
        let (xa, xb) = (local(x), local(x + w - 1));
        let (ya, yb) = (local(y), local(y + h - 1));
        let fg = self.window.fg_wire();
        self.fill_area(xa, ya, run_len(xa, xb), run_len(ya, yb), fg)
    }

    // Does the box cx-r..=cx+r, cy-r..=cy+r+below miss the window entirely?
    fn misses_window(&self, cx: i64, cy: i64, r: i64, below: i64) -> bool {
        let w = i64::from(self.window.width());
        let h = i64::from(self.window.height());
        cx + r < 0 || cy + r + below.max(0) < 0 || cx - r >= w || cy - r >= h
    }

    /// Line from `(x0, y0)` to `(x1, y1)`, both endpoints drawn.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> Result<(), Ili9341Error> {
        let (x0, y0, x1, y1) = (i64::from(x0), i64::from(y0), i64::from(x1), i64::from(y1));
        if y0 == y1 {
            return self.hspan(x0, x1, y0);
        }
        if x0 == x1 {
            return self.vspan(x0, y0, y1);
        }
        self.bresenham(x0, y0, x1, y1)
    }

    // Bresenham along the major axis. Pixels that share a minor coordinate
    // are collected into one run and flushed when the minor axis steps.
    // Only the part of the major axis inside the window is walked; the error
    // term at its first step is computed directly.
    fn bresenham(
        &mut self,
        mut x0: i64,
        mut y0: i64,
        mut x1: i64,
        mut y1: i64,
    ) -> Result<(), Ili9341Error> {
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            swap(&mut x0, &mut y0);
            swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            swap(&mut x0, &mut x1);
            swap(&mut y0, &mut y1);
        }

        let extent = i64::from(if steep { self.window.height() } else { self.window.width() });
        let start = x0.max(0);
        let end = x1.min(extent - 1);
        if start > end {
            return Ok(());
        }

        let dx = x1 - x0;
        let dy = (y1 - y0).abs();
        let ystep = if y0 < y1 { 1 } else { -1 };

        // After n steps the error stays in 0..dx, which fixes the number of
        // minor steps taken so far.
        let n = i128::from(start - x0);
        let (dx128, dy128) = (i128::from(dx), i128::from(dy));
        let minor_steps = if n == 0 {
            0
        } else {
            (n * dy128 - dx128 / 2 + dx128 - 1).div_euclid(dx128).max(0)
        };
        let mut err = (dx128 / 2 - n * dy128 + minor_steps * dx128) as i64;
        let mut minor = y0 + ystep * minor_steps as i64;
        let mut run_start = start;

        for x in start..=end {
            err -= dy;
            if err < 0 {
                self.major_run(steep, run_start, x, minor)?;
                minor += ystep;
                err += dx;
                run_start = x + 1;
            }
        }
        if run_start <= end {
            self.major_run(steep, run_start, end, minor)?;
        }
        Ok(())
    }

    #[inline]
    fn major_run(&mut self, steep: bool, from: i64, to: i64, minor: i64) -> Result<(), Ili9341Error> {
        if steep {
            self.vspan(minor, from, to)
        } else {
            self.hspan(from, to, minor)
        }
    }

    /// Outline of a `w` x `h` rectangle.
    pub fn draw_rect(&mut self, x: i32, y: i32, w: u32, h: u32) -> Result<(), Ili9341Error> {
        if w == 0 || h == 0 {
            return Ok(());
        }
        let (x0, y0) = (i64::from(x), i64::from(y));
        let x1 = x0 + i64::from(w) - 1;
        let y1 = y0 + i64::from(h) - 1;
        self.hspan(x0, x1, y0)?;
        self.hspan(x0, x1, y1)?;
        self.vspan(x0, y0, y1)?;
        self.vspan(x1, y0, y1)
    }

    /// Circle outline. `r` is clamped to [`RADIUS_LIMIT`].
    pub fn draw_circle(&mut self, x0: i32, y0: i32, r: i32) -> Result<(), Ili9341Error> {
        if r < 0 {
            return Ok(());
        }
        let (x0, y0) = (i64::from(x0), i64::from(y0));
        let r = i64::from(r).min(i64::from(RADIUS_LIMIT));
        if self.misses_window(x0, y0, r, 0) {
            return Ok(());
        }

        self.plot(x0, y0 + r)?;
        self.plot(x0, y0 - r)?;
        self.plot(x0 + r, y0)?;
        self.plot(x0 - r, y0)?;

        let mut f = 1 - r;
        let mut ddf_x = 1;
        let mut ddf_y = -2 * r;
        let mut x = 0;
        let mut y = r;

        while x < y {
            if f >= 0 {
                y -= 1;
                ddf_y += 2;
                f += ddf_y;
            }
            x += 1;
            ddf_x += 2;
            f += ddf_x;

            self.plot(x0 + x, y0 + y)?;
            self.plot(x0 - x, y0 + y)?;
            self.plot(x0 + x, y0 - y)?;
            self.plot(x0 - x, y0 - y)?;
            self.plot(x0 + y, y0 + x)?;
            self.plot(x0 - y, y0 + x)?;
            self.plot(x0 + y, y0 - x)?;
            self.plot(x0 - y, y0 - x)?;
        }
        Ok(())
    }

    // Quarter outlines selected by `corners` (CORNER_*). Axis extrema are
    // left to the caller.
    fn draw_circle_helper(
        &mut self,
        x0: i64,
        y0: i64,
        r: i64,
        corners: u8,
    ) -> Result<(), Ili9341Error> {
        if self.misses_window(x0, y0, r, 0) {
            return Ok(());
        }
        let mut f = 1 - r;
        let mut ddf_x = 1;
        let mut ddf_y = -2 * r;
        let mut x = 0;
        let mut y = r;

        while x < y {
            if f >= 0 {
                y -= 1;
                ddf_y += 2;
                f += ddf_y;
            }
            x += 1;
            ddf_x += 2;
            f += ddf_x;

            if corners & CORNER_BOTTOM_RIGHT != 0 {
                self.plot(x0 + x, y0 + y)?;
                self.plot(x0 + y, y0 + x)?;
            }
            if corners & CORNER_TOP_RIGHT != 0 {
                self.plot(x0 + x, y0 - y)?;
                self.plot(x0 + y, y0 - x)?;
            }
            if corners & CORNER_BOTTOM_LEFT != 0 {
                self.plot(x0 - y, y0 + x)?;
                self.plot(x0 - x, y0 + y)?;
            }
            if corners & CORNER_TOP_LEFT != 0 {
                self.plot(x0 - y, y0 - x)?;
                self.plot(x0 - x, y0 - y)?;
            }
        }
        Ok(())
    }

    /// Filled disc. `r` is clamped to [`RADIUS_LIMIT`].
    pub fn fill_circle(&mut self, x0: i32, y0: i32, r: i32) -> Result<(), Ili9341Error> {
        if r < 0 {
            return Ok(());
        }
        let (x0, y0) = (i64::from(x0), i64::from(y0));
        let r = i64::from(r).min(i64::from(RADIUS_LIMIT));
        if self.misses_window(x0, y0, r, 0) {
            return Ok(());
        }
        self.vspan(x0, y0 - r, y0 + r)?;
        self.fill_circle_helper(x0, y0, r, HALF_RIGHT | HALF_LEFT, 0)
    }

    // Vertical spans for the halves in `halves` (HALF_*). `delta` stretches
    // every span downwards, which turns two half discs into a round rect.
    fn fill_circle_helper(
        &mut self,
        x0: i64,
        y0: i64,
        r: i64,
        halves: u8,
        delta: i64,
    ) -> Result<(), Ili9341Error> {
        if self.misses_window(x0, y0, r, delta) {
            return Ok(());
        }
        let mut f = 1 - r;
        let mut ddf_x = 1;
        let mut ddf_y = -2 * r;
        let mut x = 0;
        let mut y = r;
        // last column already covered by an outer span
        let mut ylm = x0 - r;

        while x < y {
            if f >= 0 {
                if halves & HALF_RIGHT != 0 {
                    self.vrun(x0 + y, y0 - x, 2 * x + 1 + delta)?;
                }
                if halves & HALF_LEFT != 0 {
                    self.vrun(x0 - y, y0 - x, 2 * x + 1 + delta)?;
                }
                ylm = x0 - y;
                y -= 1;
                ddf_y += 2;
                f += ddf_y;
            }
            x += 1;
            ddf_x += 2;
            f += ddf_x;

            if x0 - x > ylm {
                if halves & HALF_RIGHT != 0 {
                    self.vrun(x0 + x, y0 - y, 2 * y + 1 + delta)?;
                }
                if halves & HALF_LEFT != 0 {
                    self.vrun(x0 - x, y0 - y, 2 * y + 1 + delta)?;
                }
            }
        }
        Ok(())
    }

    /// Rounded rectangle outline. `r` is clamped to half the shorter side
    /// and to [`RADIUS_LIMIT`].
    pub fn draw_round_rect(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        r: u32,
    ) -> Result<(), Ili9341Error> {
        if w == 0 || h == 0 {
            return Ok(());
        }
        let r = i64::from(r.min(w.min(h) / 2).min(RADIUS_LIMIT));
        let (x, y, w, h) = (i64::from(x), i64::from(y), i64::from(w), i64::from(h));

        // straight edges, corners excluded
        self.hrun(x + r, y, w - 2 * r)?;
        self.hrun(x + r, y + h - 1, w - 2 * r)?;
        self.vrun(x, y + r, h - 2 * r)?;
        self.vrun(x + w - 1, y + r, h - 2 * r)?;

        self.draw_circle_helper(x + r, y + r, r, CORNER_TOP_LEFT)?;
        self.draw_circle_helper(x + w - r - 1, y + r, r, CORNER_TOP_RIGHT)?;
        self.draw_circle_helper(x + w - r - 1, y + h - r - 1, r, CORNER_BOTTOM_RIGHT)?;
        self.draw_circle_helper(x + r, y + h - r - 1, r, CORNER_BOTTOM_LEFT)
    }

    pub fn fill_round_rect(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        r: u32,
    ) -> Result<(), Ili9341Error> {
        if w == 0 || h == 0 {
            return Ok(());
        }
        let r = i64::from(r.min(w.min(h) / 2).min(RADIUS_LIMIT));
        let (x, y, w, h) = (i64::from(x), i64::from(y), i64::from(w), i64::from(h));

        self.block(x + r, y, w - 2 * r, h)?;
        self.fill_circle_helper(x + w - r - 1, y + r, r, HALF_RIGHT, h - 2 * r - 1)?;
        self.fill_circle_helper(x + r, y + r, r, HALF_LEFT, h - 2 * r - 1)
    }

    pub fn draw_triangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<(), Ili9341Error> {
        self.draw_line(x0, y0, x1, y1)?;
        self.draw_line(x1, y1, x2, y2)?;
        self.draw_line(x2, y2, x0, y0)
    }

    /// Scanline triangle fill. Coverage does not depend on vertex order.
    pub fn fill_triangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<(), Ili9341Error> {
        let (mut x0, mut y0) = (i64::from(x0), i64::from(y0));
        let (mut x1, mut y1) = (i64::from(x1), i64::from(y1));
        let (mut x2, mut y2) = (i64::from(x2), i64::from(y2));

        // y0 <= y1 <= y2
        if y0 > y1 {
            swap(&mut y0, &mut y1);
            swap(&mut x0, &mut x1);
        }
        if y1 > y2 {
            swap(&mut y2, &mut y1);
            swap(&mut x2, &mut x1);
        }
        if y0 > y1 {
            swap(&mut y0, &mut y1);
            swap(&mut x0, &mut x1);
        }

        if y0 == y2 {
            let a = x0.min(x1).min(x2);
            let b = x0.max(x1).max(x2);
            return self.hspan(a, b, y0);
        }

        // only rows inside the window are stepped
        let top = y0.max(0);
        let bottom = y2.min(i64::from(self.window.height()) - 1);
        if top > bottom {
            return Ok(());
        }

        let mut long = EdgeStep::starting_at(x0, x2 - x0, y2 - y0, top - y0);
        let mut y = top;

        // The middle scanline belongs to the upper part only for a flat bottom.
        let last = if y1 == y2 { y1 } else { y1 - 1 };
        if y1 > y0 && y <= last {
            let mut upper = EdgeStep::starting_at(x0, x1 - x0, y1 - y0, y - y0);
            let end = last.min(bottom);
            while y <= end {
                let (a, b) = (upper.x(), long.x());
                upper.step();
                long.step();
                self.hspan(a, b, y)?;
                y += 1;
            }
        }

        if y <= bottom {
            let mut lower = EdgeStep::starting_at(x1, x2 - x1, y2 - y1, y - y1);
            while y <= bottom {
                let (a, b) = (lower.x(), long.x());
                lower.step();
                long.step();
                self.hspan(a, b, y)?;
                y += 1;
            }
        }
        Ok(())
    }
}

/// Walks `origin + dx * t / dy` (truncated toward zero) for t = 0, 1, 2, ...
/// with one division up front and none per step. `dy` must be positive.
struct EdgeStep {
    origin: i64,
    sign: i64,
    whole: i64,
    rem: i64,
    quot: i64,
    frac: i64,
    dy: i64,
}

impl EdgeStep {
    #[cfg(test)]
    fn new(origin: i64, dx: i64, dy: i64) -> Self {
        Self::starting_at(origin, dx, dy, 0)
    }

    fn starting_at(origin: i64, dx: i64, dy: i64, t: i64) -> Self {
        debug_assert!(dy > 0 && t >= 0);
        let adx = dx.abs();
        let start = i128::from(adx) * i128::from(t);
        let dy128 = i128::from(dy);
        Self {
            origin,
            sign: dx.signum(),
            whole: (start / dy128) as i64,
            rem: (start % dy128) as i64,
            quot: adx / dy,
            frac: adx % dy,
            dy,
        }
    }

    #[inline]
    fn x(&self) -> i64 {
        self.origin + self.sign * self.whole
    }

    #[inline]
    fn step(&mut self) {
        self.whole += self.quot;
        self.rem += self.frac;
        if self.rem >= self.dy {
            self.whole += 1;
            self.rem -= self.dy;
        }
    }
}
