use image::Luma;
use imageproc::definitions::Image;
use imageproc::map::map_colors2;

use crate::error::Error;

/// Boolean region mask with the same dimensions as the image it describes
///
/// Backed by a `Luma<u8>` buffer holding only `0` (unset) or
/// [`Mask::SET`], so a mask can be handed to `image`/`imageproc` consumers or
/// persisted as a grayscale image without conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    buffer: Image<Luma<u8>>,
}

impl Mask {
    /// Luma value stored for set pixels
    pub const SET: u8 = 255;

    /// Creates a mask with no pixel set.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: Image::new(width, height),
        }
    }

    /// Creates a mask with every pixel set.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            buffer: Image::from_pixel(width, height, Luma([Self::SET])),
        }
    }

    /// Creates a mask by evaluating `f` at every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        Self {
            buffer: Image::from_fn(width, height, |x, y| Luma([encode(f(x, y))])),
        }
    }

    /// Creates a mask from row-major booleans.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidParameter` - When `bits.len()` is not `width * height`
    pub fn from_bools(width: u32, height: u32, bits: &[bool]) -> Result<Self, Error> {
        let expected = width as usize * height as usize;
        if bits.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "mask of {width}x{height} needs {expected} values, got {}",
                bits.len()
            )));
        }

        let raw = bits.iter().map(|&bit| encode(bit)).collect();
        Image::from_raw(width, height, raw)
            .map(|buffer| Self { buffer })
            .ok_or_else(|| Error::InvalidParameter("mask buffer creation failed".to_string()))
    }

    /// Creates a mask from a grayscale image; any nonzero value counts as set.
    pub fn from_luma(image: &Image<Luma<u8>>) -> Self {
        Self::from_fn(image.width(), image.height(), |x, y| {
            image.get_pixel(x, y)[0] != 0
        })
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Returns whether the pixel at `(x, y)` is set.
    ///
    /// # Panics
    ///
    /// If `(x, y)` is out of bounds.
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.buffer.get_pixel(x, y)[0] != 0
    }

    /// Sets or clears the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// If `(x, y)` is out of bounds.
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        self.buffer.put_pixel(x, y, Luma([encode(value)]));
    }

    /// Row-major iterator over the pixel states.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.buffer.as_raw().iter().map(|&value| value != 0)
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.iter().filter(|&set| set).count()
    }

    /// Returns `true` when no pixel is set.
    pub fn is_empty(&self) -> bool {
        self.iter().all(|set| !set)
    }

    /// Pixel-wise logical OR of two masks.
    ///
    /// # Errors
    ///
    /// * `Error::DimensionMismatch` - When the masks differ in size
    pub fn union(&self, other: &Self) -> Result<Self, Error> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::DimensionMismatch {
                index: 0,
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }

        let buffer = map_colors2(&self.buffer, &other.buffer, |Luma([a]), Luma([b])| {
            Luma([encode(a != 0 || b != 0)])
        });
        Ok(Self { buffer })
    }

    /// In-place variant of [`Mask::union`].
    pub fn union_mut(&mut self, other: &Self) -> Result<&mut Self, Error> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::DimensionMismatch {
                index: 0,
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }

        self.buffer
            .pixels_mut()
            .zip(other.buffer.pixels())
            .for_each(|(pixel, Luma([other]))| {
                let Luma([value]) = *pixel;
                *pixel = Luma([encode(value != 0 || *other != 0)]);
            });

        Ok(self)
    }

    /// Grayscale view of the mask (`0` / [`Mask::SET`]).
    pub fn as_luma(&self) -> &Image<Luma<u8>> {
        &self.buffer
    }

    pub fn into_luma(self) -> Image<Luma<u8>> {
        self.buffer
    }
}

#[inline]
const fn encode(set: bool) -> u8 {
    if set {
        Mask::SET
    } else {
        0
    }
}
