use std::fmt;

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Target paint color in device RGB order
///
/// Always holds valid 8-bit channels; integer input outside `[0, 255]` is
/// rejected on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[i64; 3]", into = "[u8; 3]")]
pub struct PaintColor([u8; 3]);

impl PaintColor {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self([red, green, blue])
    }

    pub const fn rgb(self) -> Rgb<u8> {
        Rgb(self.0)
    }

    /// Parses `#rrggbb` or `rrggbb`.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidParameter` - When the string is not six hex digits
    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        let digits = hex.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(Error::InvalidParameter(format!(
                "expected a #rrggbb color, got {hex:?}"
            )));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| {
                Error::InvalidParameter(format!("expected a #rrggbb color, got {hex:?}"))
            })
        };
        Ok(Self([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
    }

    /// Formats the color as `#rrggbb`.
    pub fn to_hex(self) -> String {
        let [red, green, blue] = self.0;
        format!("#{red:02x}{green:02x}{blue:02x}")
    }
}

impl From<Rgb<u8>> for PaintColor {
    fn from(Rgb(channels): Rgb<u8>) -> Self {
        Self(channels)
    }
}

impl From<PaintColor> for [u8; 3] {
    fn from(color: PaintColor) -> Self {
        color.0
    }
}

impl TryFrom<[i64; 3]> for PaintColor {
    type Error = Error;

    fn try_from(channels: [i64; 3]) -> Result<Self, Self::Error> {
        let mut rgb = [0u8; 3];
        for (channel, (&value, slot)) in channels.iter().zip(rgb.iter_mut()).enumerate() {
            *slot = u8::try_from(value).map_err(|_| Error::InvalidColor { channel, value })?;
        }
        Ok(Self(rgb))
    }
}

impl TryFrom<[i32; 3]> for PaintColor {
    type Error = Error;

    fn try_from(channels: [i32; 3]) -> Result<Self, Self::Error> {
        Self::try_from(channels.map(i64::from))
    }
}

impl fmt::Display for PaintColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
