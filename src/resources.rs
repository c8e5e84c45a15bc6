//! Bundled resources: the two fonts and the logo bitmap.
//!
//! Fonts map onto `embedded-graphics` mono fonts; images are 1 bit per
//! pixel, MSB first, rows padded to whole bytes.

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_5X8};
use embedded_graphics::mono_font::MonoFont;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontResource {
    /// Large digits for the time.
    Clock,
    /// Small text for the battery and connection lines.
    Status,
}

impl FontResource {
    pub fn mono_font(self) -> &'static MonoFont<'static> {
        match self {
            FontResource::Clock => &FONT_10X20,
            FontResource::Status => &FONT_5X8,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageResource {
    Logo,
}

impl ImageResource {
    pub fn bitmap(self) -> &'static MonoBitmap {
        match self {
            ImageResource::Logo => &LOGO,
        }
    }
}

/// 1bpp image stored in flash.
#[derive(Debug)]
pub struct MonoBitmap {
    pub width: u16,
    pub height: u16,
    pub data: &'static [u8],
}

impl MonoBitmap {
    fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Whether the pixel at (`x`, `y`) is set. Out of range reads as clear.
    pub fn pixel(&self, x: u16, y: u16) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = y as usize * self.stride() + x as usize / 8;
        self.data
            .get(byte)
            .is_some_and(|b| b & (0x80 >> (x % 8)) != 0)
    }

    /// All pixels, row-major, as `(x, y, set)`.
    pub fn pixels(&self) -> impl Iterator<Item = (u16, u16, bool)> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| (x, y, self.pixel(x, y))))
    }
}

/// 16×16 watch dial.
pub static LOGO: MonoBitmap = MonoBitmap {
    width: 16,
    height: 16,
    data: &[
        0b00000011, 0b11000000,
        0b00000011, 0b11000000,
        0b00001111, 0b11110000,
        0b00011000, 0b00011000,
        0b00110001, 0b10001100,
        0b01100001, 0b10000110,
        0b01000001, 0b10000010,
        0b01000001, 0b10000010,
        0b01000001, 0b11110010,
        0b01000000, 0b00000010,
        0b01100000, 0b00000110,
        0b00110000, 0b00001100,
        0b00011000, 0b00011000,
        0b00001111, 0b11110000,
        0b00000011, 0b11000000,
        0b00000011, 0b11000000,
    ],
};
