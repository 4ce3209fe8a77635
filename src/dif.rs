//! DIF: a bare RGB565 image container.
//!
//! ```text
//! 0..3    "DIF"
//! 3       version (1)
//! 4..8    width,  u32 big-endian
//! 8..12   height, u32 big-endian
//! 12..16  reserved, must be 0
//! 16..    width * height big-endian RGB565 samples, row-major
//! ```
//!
//! Images are streamed to the panel one row at a time, so only a single row
//! is ever held in RAM.

use alloc::vec::Vec;
use core::fmt::Debug;

use display_interface::WriteOnlyDataCommand;

use crate::color::{color565, to_wire};
use crate::ili9341::{Ili9341, Ili9341Error};

pub const DIF_MAGIC: [u8; 3] = *b"DIF";
pub const DIF_VERSION: u8 = 1;
pub const DIF_HEADER_LEN: usize = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DifError {
    BadMagic([u8; 3]),
    BadVersion(u8),
    BadReserved(u32),
    /// Width or height above 65535. GRAM addresses are 16-bit, so such
    /// images are refused at the header instead of clipped row by row.
    TooLarge { width: u32, height: u32 },
    /// Input ended early.
    ShortRead { expected: usize, got: usize },
    /// The source reported an error.
    Read,
    /// Encoder got a pixel slice that does not match the dimensions.
    PixelCount { expected: usize, actual: usize },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DifHeader {
    pub width: u32,
    pub height: u32,
}

impl DifHeader {
    pub fn new(width: u32, height: u32) -> Result<Self, DifError> {
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(DifError::TooLarge { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn parse(bytes: &[u8; DIF_HEADER_LEN]) -> Result<Self, DifError> {
        let magic = [bytes[0], bytes[1], bytes[2]];
        if magic != DIF_MAGIC {
            return Err(DifError::BadMagic(magic));
        }
        if bytes[3] != DIF_VERSION {
            return Err(DifError::BadVersion(bytes[3]));
        }
        let word = |at: usize| u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        let reserved = word(12);
        if reserved != 0 {
            return Err(DifError::BadReserved(reserved));
        }
        Self::new(word(4), word(8))
    }

    pub fn to_bytes(&self) -> [u8; DIF_HEADER_LEN] {
        let mut out = [0u8; DIF_HEADER_LEN];
        out[..3].copy_from_slice(&DIF_MAGIC);
        out[3] = DIF_VERSION;
        out[4..8].copy_from_slice(&self.width.to_be_bytes());
        out[8..12].copy_from_slice(&self.height.to_be_bytes());
        out
    }

    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.width as usize * 2
    }

    #[inline]
    pub fn data_len(&self) -> usize {
        self.row_bytes() * self.height as usize
    }
}

/// Byte source for [`Ili9341::draw_dif`]: a file, flash region, socket...
pub trait ImageSource {
    type Error: Debug;

    /// Read up to `buf.len()` bytes. `Ok(0)` means end of input.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

impl ImageSource for &[u8] {
    type Error = core::convert::Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.len());
        let (head, tail) = self.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = tail;
        Ok(n)
    }
}

/// Fill `buf` completely or fail.
pub fn read_exact<S: ImageSource>(source: &mut S, buf: &mut [u8]) -> Result<(), DifError> {
    let mut got = 0;
    while got < buf.len() {
        match source.read(&mut buf[got..]) {
            Ok(0) => return Err(DifError::ShortRead { expected: buf.len(), got }),
            Ok(n) => got += n,
            Err(e) => {
                log_error!("dif: read failed: {:?}", e);
                return Err(DifError::Read);
            }
        }
    }
    Ok(())
}

/// Read and validate a header.
pub fn read_header<S: ImageSource>(source: &mut S) -> Result<DifHeader, DifError> {
    let mut raw = [0u8; DIF_HEADER_LEN];
    read_exact(source, &mut raw)?;
    DifHeader::parse(&raw)
}

/// Encode packed RGB565 pixels (row-major) as a DIF image.
pub fn encode_rgb565(width: u32, height: u32, pixels: &[u16]) -> Result<Vec<u8>, DifError> {
    let header = DifHeader::new(width, height)?;
    let expected = width as usize * height as usize;
    if pixels.len() != expected {
        return Err(DifError::PixelCount { expected, actual: pixels.len() });
    }
    let mut out = Vec::with_capacity(DIF_HEADER_LEN + header.data_len());
    out.extend_from_slice(&header.to_bytes());
    for &px in pixels {
        out.extend_from_slice(&to_wire(px));
    }
    Ok(out)
}

/// Encode 8-bit RGB triplets (row-major), truncating to RGB565.
pub fn encode_rgb888(width: u32, height: u32, rgb: &[u8]) -> Result<Vec<u8>, DifError> {
    let header = DifHeader::new(width, height)?;
    let expected = width as usize * height as usize;
    if rgb.len() != expected * 3 {
        return Err(DifError::PixelCount { expected, actual: rgb.len() / 3 });
    }
    let mut out = Vec::with_capacity(DIF_HEADER_LEN + header.data_len());
    out.extend_from_slice(&header.to_bytes());
    for px in rgb.chunks_exact(3) {
        out.extend_from_slice(&to_wire(color565(px[0], px[1], px[2])));
    }
    Ok(out)
}

impl<'f, DI> Ili9341<'f, DI>
where
    DI: WriteOnlyDataCommand,
{
    /// Stream a DIF image from `source` with its top-left corner at local
    /// `(x, y)`. Rows past the window bottom are not read.
    ///
    /// A short read stops the image; rows already sent stay on screen.
    pub fn draw_dif<S: ImageSource>(
        &mut self,
        x: i32,
        y: i32,
        source: &mut S,
    ) -> Result<(), Ili9341Error> {
        let header = read_header(source).map_err(|e| {
            log_error!("dif: bad header: {:?}", e);
            e
        })?;
        log_debug!("dif: {}x{} at ({}, {})", header.width, header.height, x, y);

        if header.width == 0 || header.height == 0 {
            return Ok(());
        }

        let mut row: Vec<u8> = Vec::new();
        row.try_reserve_exact(header.row_bytes()).map_err(|_| {
            log_error!("dif: no memory for a {} byte row", header.row_bytes());
            Ili9341Error::OutOfMemory
        })?;
        row.resize(header.row_bytes(), 0);

        for r in 0..header.height {
            let ry = y.saturating_add(r as i32);
            if self.window.is_below(ry) {
                break;
            }
            read_exact(source, &mut row).map_err(|e| {
                log_error!("dif: row {} of {}: {:?}", r, header.height, e);
                e
            })?;
            self.send_pixels(x, ry, header.width, 1, &row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLUE, GREEN, RED, WHITE};
    use crate::commands::RAMWR;
    use crate::config::{Orientation, PanelConfig};
    use crate::testing::{Frame, MockPanel};

    fn panel() -> Ili9341<'static, MockPanel> {
        let config = PanelConfig::default()
            .with_size(32, 32)
            .with_orientation(Orientation::PORTRAIT);
        Ili9341::new(MockPanel::new(32, 32), config)
    }

    // Hands out at most `step` bytes per read.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl ImageSource for Trickle<'_> {
        type Error = ();

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            let n = buf.len().min(self.step).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    struct Broken;

    impl ImageSource for Broken {
        type Error = &'static str;

        fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
            Err("card removed")
        }
    }

    #[test]
    fn header_layout() {
        let h = DifHeader::new(0x0102, 0x0304).unwrap();
        let bytes = h.to_bytes();
        assert_eq!(&bytes, b"DIF\x01\x00\x00\x01\x02\x00\x00\x03\x04\x00\x00\x00\x00");
        assert_eq!(DifHeader::parse(&bytes), Ok(h));
    }

    #[test]
    fn header_rejects_deviations() {
        let good = DifHeader::new(4, 4).unwrap().to_bytes();

        let mut bad = good;
        bad[0] = b'G';
        assert_eq!(DifHeader::parse(&bad), Err(DifError::BadMagic(*b"GIF")));

        let mut bad = good;
        bad[3] = 2;
        assert_eq!(DifHeader::parse(&bad), Err(DifError::BadVersion(2)));

        let mut bad = good;
        bad[15] = 1;
        assert_eq!(DifHeader::parse(&bad), Err(DifError::BadReserved(1)));

        let mut bad = good;
        bad[5] = 1;
        assert!(matches!(DifHeader::parse(&bad), Err(DifError::TooLarge { .. })));
    }

    #[test]
    fn encoders_agree() {
        let packed = encode_rgb565(2, 1, &[RED, WHITE]).unwrap();
        let rgb = encode_rgb888(2, 1, &[255, 0, 0, 255, 255, 255]).unwrap();
        assert_eq!(packed, rgb);
        assert_eq!(&packed[16..], &[0xF8, 0x00, 0xFF, 0xFF]);
        assert!(matches!(
            encode_rgb565(2, 2, &[RED]),
            Err(DifError::PixelCount { expected: 4, actual: 1 })
        ));
    }

    #[test]
    fn rows_are_forwarded_verbatim() {
        let pixels = [RED, GREEN, BLUE, WHITE, BLUE, GREEN];
        let image = encode_rgb565(3, 2, &pixels).unwrap();

        let mut tft = panel();
        let mut source = Trickle { data: &image, step: 5 };
        tft.draw_dif(4, 7, &mut source).unwrap();
        assert!(source.data.is_empty());

        let bus = tft.interface();
        let rows: Vec<&Vec<u8>> = bus
            .frames
            .iter()
            .filter_map(|f| match f {
                Frame::Data(d) if d.len() == 6 => Some(d),
                _ => None,
            })
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].as_slice(), &image[16..22]);
        assert_eq!(rows[1].as_slice(), &image[22..28]);
        assert_eq!(bus.pixel(4, 7), Some(RED));
        assert_eq!(bus.pixel(6, 8), Some(GREEN));
    }

    #[test]
    fn short_read_keeps_finished_rows() {
        let image = encode_rgb565(2, 3, &[RED; 6]).unwrap();
        let truncated = &image[..16 + 4 + 3];

        let mut tft = panel();
        let mut source: &[u8] = truncated;
        let err = tft.draw_dif(0, 0, &mut source).unwrap_err();
        assert!(matches!(
            err,
            Ili9341Error::Image(DifError::ShortRead { expected: 4, got: 3 })
        ));
        assert_eq!(tft.interface().count_command(RAMWR), 1);
    }

    #[test]
    fn rows_below_window_are_not_read() {
        let image = encode_rgb565(2, 10, &[BLUE; 20]).unwrap();
        let mut tft = panel();
        tft.set_window(0, 0, 31, 3);
        let mut source: &[u8] = &image;
        tft.draw_dif(0, 1, &mut source).unwrap();
        assert_eq!(tft.interface().count_command(RAMWR), 3);
        // 7 rows of 4 bytes left unread
        assert_eq!(source.len(), 7 * 4);
    }

    #[test]
    fn oversized_image_is_refused_before_any_row() {
        let mut bytes = DifHeader { width: 70_000, height: 1 }.to_bytes().to_vec();
        bytes.extend_from_slice(&[0xAB; 64]);
        let mut tft = panel();
        let mut source: &[u8] = &bytes;
        let err = tft.draw_dif(0, 0, &mut source).unwrap_err();
        assert!(matches!(
            err,
            Ili9341Error::Image(DifError::TooLarge { width: 70_000, height: 1 })
        ));
        assert!(tft.interface().frames.is_empty());
        // the pixel data was never touched
        assert_eq!(source.len(), 64);
    }

    #[test]
    fn source_errors_are_reported() {
        let mut tft = panel();
        let err = tft.draw_dif(0, 0, &mut Broken).unwrap_err();
        assert!(matches!(err, Ili9341Error::Image(DifError::Read)));
        assert!(tft.interface().frames.is_empty());
    }
}
