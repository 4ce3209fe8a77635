//! Active window and clip math.
//!
//! All drawing coordinates are local to the window: `(0, 0)` is the window's
//! top-left corner. A request is offset by the window origin and truncated to
//! the window bounds before anything reaches the bus.

use crate::color::{self, to_wire};

/// Inclusive rectangle in absolute panel coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Area {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl Area {
    #[inline]
    pub fn width(&self) -> u32 {
        u32::from(self.x1) - u32::from(self.x0) + 1
    }

    #[inline]
    pub fn height(&self) -> u32 {
        u32::from(self.y1) - u32::from(self.y0) + 1
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width() as usize) * (self.height() as usize)
    }
}

/// Offset + clip rectangle and the current colors (stored in wire order).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    x0: u16,
    y0: u16,
    x1: u16,
    y1: u16,
    fg: [u8; 2],
    bg: [u8; 2],
}

impl Window {
    pub fn new(x0: u16, y0: u16, x1: u16, y1: u16) -> Self {
        let mut window = Self {
            x0: 0,
            y0: 0,
            x1: 0,
            y1: 0,
            fg: to_wire(color::WHITE),
            bg: to_wire(color::BLACK),
        };
        window.set_bounds(x0, y0, x1, y1);
        window
    }

    /// Window covering a whole `width` x `height` screen.
    pub fn full(width: u16, height: u16) -> Self {
        Self::new(0, 0, width.saturating_sub(1), height.saturating_sub(1))
    }

    /// Replace the bounds, swapping coordinates so that `x0 <= x1, y0 <= y1`.
    pub fn set_bounds(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) {
        let (x0, x1) = if x0 > x1 { (x1, x0) } else { (x0, x1) };
        let (y0, y1) = if y0 > y1 { (y1, y0) } else { (y0, y1) };
        self.x0 = x0;
        self.y0 = y0;
        self.x1 = x1;
        self.y1 = y1;
    }

    pub fn bounds(&self) -> Area {
        Area { x0: self.x0, y0: self.y0, x1: self.x1, y1: self.y1 }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.bounds().width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.bounds().height()
    }

    pub fn set_fg(&mut self, color: u16) {
        self.fg = to_wire(color);
    }

    pub fn set_bg(&mut self, color: u16) {
        self.bg = to_wire(color);
    }

    #[inline]
    pub fn fg(&self) -> u16 {
        color::from_wire(self.fg)
    }

    #[inline]
    pub fn bg(&self) -> u16 {
        color::from_wire(self.bg)
    }

    #[inline]
    pub fn fg_wire(&self) -> [u8; 2] {
        self.fg
    }

    #[inline]
    pub fn bg_wire(&self) -> [u8; 2] {
        self.bg
    }

    /// Clip a local `w` x `h` rectangle at `(x, y)` against the window.
    ///
    /// Returns the visible part in absolute panel coordinates, or `None` when
    /// nothing is left (zero size, or entirely outside).
    pub fn clip(&self, x: i32, y: i32, w: u32, h: u32) -> Option<Area> {
        let (x0, x1) = clip_axis(x, w, self.x0, self.x1)?;
        let (y0, y1) = clip_axis(y, h, self.y0, self.y1)?;
        Some(Area { x0, y0, x1, y1 })
    }

    /// Is the local row `y` at or past the window's bottom edge?
    #[inline]
    pub fn is_below(&self, y: i32) -> bool {
        i64::from(y) >= i64::from(self.height())
    }
}

fn clip_axis(pos: i32, len: u32, origin: u16, end: u16) -> Option<(u16, u16)> {
    if len == 0 {
        return None;
    }
    let extent = i64::from(end) - i64::from(origin) + 1;
    let lo = i64::from(pos).max(0);
    let hi = (i64::from(pos) + i64::from(len) - 1).min(extent - 1);
    if lo > hi {
        return None;
    }
    let origin = i64::from(origin);
    Some(((origin + lo) as u16, (origin + hi) as u16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_normalized() {
        let w = Window::new(100, 80, 10, 20);
        assert_eq!(w.bounds(), Area { x0: 10, y0: 20, x1: 100, y1: 80 });
        assert_eq!(w.width(), 91);
        assert_eq!(w.height(), 61);
    }

    #[test]
    fn colors_keep_other_fields() {
        let mut w = Window::full(240, 320);
        w.set_fg(color::RED);
        w.set_bg(color::BLUE);
        assert_eq!(w.fg_wire(), [0xF8, 0x00]);
        assert_eq!(w.bg(), color::BLUE);
        assert_eq!(w.bounds(), Area { x0: 0, y0: 0, x1: 239, y1: 319 });
    }

    #[test]
    fn clip_offsets_by_origin() {
        let w = Window::new(10, 20, 59, 69);
        assert_eq!(w.clip(0, 0, 5, 5), Some(Area { x0: 10, y0: 20, x1: 14, y1: 24 }));
    }

    #[test]
    fn clip_truncates_extent() {
        let w = Window::new(10, 20, 59, 69);
        // 50x50 window, request runs 10 past the right and bottom edges
        assert_eq!(w.clip(40, 45, 20, 15), Some(Area { x0: 50, y0: 65, x1: 59, y1: 69 }));
        // negative origins lose their leading part
        assert_eq!(w.clip(-3, -1, 5, 2), Some(Area { x0: 10, y0: 20, x1: 11, y1: 20 }));
    }

    #[test]
    fn clip_rejects_outside_and_empty() {
        let w = Window::new(10, 20, 59, 69);
        assert_eq!(w.clip(50, 0, 5, 5), None);
        assert_eq!(w.clip(0, 50, 5, 5), None);
        assert_eq!(w.clip(-5, 0, 5, 5), None);
        assert_eq!(w.clip(0, 0, 0, 5), None);
        assert_eq!(w.clip(0, 0, 5, 0), None);
    }

    #[test]
    fn below_tracks_window_height() {
        let w = Window::new(0, 100, 9, 109);
        assert!(!w.is_below(9));
        assert!(w.is_below(10));
    }
}
