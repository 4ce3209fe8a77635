// Built-in fonts.

use crate::font::{Font, Glyph};

// 3x5 digits, ':' '.' '-' for clocks and counters. Everything else in
// ' '..':' is a blank 4 px cell.
#[rustfmt::skip]
static TINY_DIGITS_BITMAP: [u8; 23] = [
    0xE0,             // '-'
    0x80,             // '.'
    0xF6, 0xDE,       // '0'
    0x59, 0x2E,       // '1'
    0xE7, 0xCE,       // '2'
    0xE7, 0x9E,       // '3'
    0xB7, 0x92,       // '4'
    0xF3, 0x9E,       // '5'
    0xF3, 0xDE,       // '6'
    0xE4, 0x92,       // '7'
    0xF7, 0xDE,       // '8'
    0xF7, 0x9E,       // '9'
    0xA0,             // ':'
];

const BLANK: Glyph = Glyph::new(0, 0, 0, 4, 0, 0);

const fn digit(n: u16) -> Glyph {
    Glyph::new(2 + 2 * n, 3, 5, 4, 0, -5)
}

#[rustfmt::skip]
static TINY_DIGITS_GLYPHS: [Glyph; 27] = [
    BLANK,                          // 0x20 ' '
    BLANK, BLANK, BLANK, BLANK,     // 0x21 - 0x24
    BLANK, BLANK, BLANK, BLANK,     // 0x25 - 0x28
    BLANK, BLANK, BLANK, BLANK,     // 0x29 - 0x2C
    Glyph::new(0, 3, 1, 4, 0, -3),  // 0x2D '-'
    Glyph::new(1, 1, 1, 2, 0, -1),  // 0x2E '.'
    BLANK,                          // 0x2F '/'
    digit(0), digit(1), digit(2), digit(3), digit(4),
    digit(5), digit(6), digit(7), digit(8), digit(9),
    Glyph::new(22, 1, 3, 2, 0, -4), // 0x3A ':'
];

pub static TINY_DIGITS: Font<'static> =
    Font::new(&TINY_DIGITS_BITMAP, &TINY_DIGITS_GLYPHS, 0x20, 0x3A, 6);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{ActiveFont, FontMetrics};

    #[test]
    fn tiny_digits_metrics() {
        assert_eq!(
            TINY_DIGITS.analyze(),
            FontMetrics { height: 5, width: 4, min_x_offset: 0, min_y_offset: -5 }
        );
    }

    #[test]
    fn one_is_centered() {
        let font = ActiveFont::new(&TINY_DIGITS);
        let rows: Vec<[bool; 3]> = (0..5)
            .map(|line| {
                let mut row = [[0u8; 2]; 4];
                font.fill_pixel_line("1", line, &mut row, [1, 1]);
                [row[0][0] == 1, row[1][0] == 1, row[2][0] == 1]
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                [false, true, false],
                [true, true, false],
                [false, true, false],
                [false, true, false],
                [true, true, true],
            ]
        );
    }

    #[test]
    fn punctuation_sits_on_the_baseline() {
        let font = ActiveFont::new(&TINY_DIGITS);
        let lit = |s: &str, line| {
            let mut row = [[0u8; 2]; 4];
            font.fill_pixel_line(s, line, &mut row, [1, 1]);
            row.iter().filter(|p| p[0] == 1).count()
        };
        assert_eq!(lit(".", 4), 1);
        assert_eq!(lit(".", 3), 0);
        assert_eq!(lit("-", 2), 3);
        assert_eq!((0..5).map(|l| lit(":", l)).collect::<Vec<_>>(), vec![0, 1, 0, 1, 0]);
        assert_eq!(font.string_width("12:34"), 4 * 4 + 2);
    }
}
