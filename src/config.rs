//! Run-time panel configuration.
//!
//! Board wiring is compile-time (see `wiring.rs`); everything the renderer
//! needs to know about the glass itself lives in [`PanelConfig`].

/// Native (unrotated) ILI9341 resolution.
pub const ILI9341_WIDTH: u16 = 240;
pub const ILI9341_HEIGHT: u16 = 320;

pub const SPI_DEFAULT_FREQ_HZ: u32 = 20_000_000;

// MADCTL bits
pub const MADCTL_MY: u8 = 0x80;
pub const MADCTL_MX: u8 = 0x40;
pub const MADCTL_MV: u8 = 0x20;
pub const MADCTL_BGR: u8 = 0x08;

// Portrait, BGR panel
const MADCTL_BASE: u8 = MADCTL_MX | MADCTL_BGR;

/// Scan direction flags, applied on top of the portrait default.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Orientation {
    pub flip_x: bool,
    pub flip_y: bool,
    pub switch_xy: bool,
}

impl Orientation {
    pub const PORTRAIT: Self = Self { flip_x: false, flip_y: false, switch_xy: false };
    pub const LANDSCAPE: Self = Self { flip_x: true, flip_y: false, switch_xy: true };
    pub const PORTRAIT_FLIP: Self = Self { flip_x: true, flip_y: true, switch_xy: false };
    pub const LANDSCAPE_FLIP: Self = Self { flip_x: false, flip_y: true, switch_xy: true };

    /// MADCTL register value for these flags.
    pub const fn madctl(self) -> u8 {
        let mut madctl = MADCTL_BASE;
        if self.flip_x {
            madctl &= !MADCTL_MX;
        }
        if self.flip_y {
            madctl |= MADCTL_MY;
        }
        if self.switch_xy {
            madctl |= MADCTL_MV;
        }
        madctl
    }

    /// Logical (width, height) for a panel of the given native size.
    pub const fn logical_size(self, native_width: u16, native_height: u16) -> (u16, u16) {
        if self.switch_xy {
            (native_height, native_width)
        } else {
            (native_width, native_height)
        }
    }
}

/// The four 90-degree rotations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    Portrait,
    Landscape,
    PortraitFlip,
    LandscapeFlip,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Portrait,
        Rotation::Landscape,
        Rotation::PortraitFlip,
        Rotation::LandscapeFlip,
    ];

    pub const fn orientation(self) -> Orientation {
        match self {
            Rotation::Portrait => Orientation::PORTRAIT,
            Rotation::Landscape => Orientation::LANDSCAPE,
            Rotation::PortraitFlip => Orientation::PORTRAIT_FLIP,
            Rotation::LandscapeFlip => Orientation::LANDSCAPE_FLIP,
        }
    }

    // Stable index, used to step through the rotations
    pub fn as_u8(self) -> u8 {
        match self {
            Rotation::Portrait => 0,
            Rotation::Landscape => 1,
            Rotation::PortraitFlip => 2,
            Rotation::LandscapeFlip => 3,
        }
    }

    pub fn from_u8(n: u8) -> Self {
        match n & 0x03 {
            1 => Rotation::Landscape,
            2 => Rotation::PortraitFlip,
            3 => Rotation::LandscapeFlip,
            _ => Rotation::Portrait,
        }
    }
}

/// Panel geometry and bus settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PanelConfig {
    pub width: u16,
    pub height: u16,
    pub orientation: Orientation,
    pub inverted: bool,
    pub spi_frequency_hz: u32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: ILI9341_WIDTH,
            height: ILI9341_HEIGHT,
            orientation: Orientation::LANDSCAPE,
            inverted: false,
            spi_frequency_hz: SPI_DEFAULT_FREQ_HZ,
        }
    }
}

impl PanelConfig {
    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_rotation(self, rotation: Rotation) -> Self {
        self.with_orientation(rotation.orientation())
    }

    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    pub fn with_frequency(mut self, hz: u32) -> Self {
        self.spi_frequency_hz = hz;
        self
    }

    /// Logical (width, height) after the configured orientation.
    pub fn logical_size(&self) -> (u16, u16) {
        self.orientation.logical_size(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotations_match_reference_madctl() {
        assert_eq!(Rotation::Portrait.orientation().madctl(), 0x48);
        assert_eq!(Rotation::Landscape.orientation().madctl(), 0x28);
        assert_eq!(Rotation::PortraitFlip.orientation().madctl(), 0x88);
        assert_eq!(Rotation::LandscapeFlip.orientation().madctl(), 0xE8);
    }

    #[test]
    fn switch_xy_swaps_size() {
        let cfg = PanelConfig::default();
        assert_eq!(cfg.logical_size(), (320, 240));
        let cfg = cfg.with_rotation(Rotation::PortraitFlip);
        assert_eq!(cfg.logical_size(), (240, 320));
    }

    #[test]
    fn rotation_u8_round_trips() {
        for r in Rotation::ALL {
            assert_eq!(Rotation::from_u8(r.as_u8()), r);
        }
    }
}
