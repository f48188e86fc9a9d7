//! Conversion between device RGB and CIE L\*a\*b\*
//!
//! Perceptual comparisons (bucket clustering) happen in Lab; compositing
//! happens in device RGB. Lab rasters are stored as `Image<Rgb<f32>>` whose
//! three channels hold `[L*, a*, b*]` under the D65 white point, so they can
//! flow through the same `image`/`imageproc` machinery as RGB rasters.

use image::{ImageBuffer, Rgb};
use imageproc::definitions::Image;
use palette::{FromColor, Lab, Srgb};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::utils::round_to_u8;

/// Lab raster with channels `[L*, a*, b*]`
pub type LabImage = Image<Rgb<f32>>;

/// Trait converting an 8-bit RGB raster into Lab
pub trait ToLab {
    /// Converts every pixel to CIE L\*a\*b\* (D65).
    ///
    /// The output has exactly the input's dimensions.
    fn to_lab(&self) -> LabImage;
}

impl ToLab for Image<Rgb<u8>> {
    fn to_lab(&self) -> LabImage {
        to_lab(self)
    }
}

/// Converts an 8-bit RGB raster to a Lab raster.
///
/// With the `rayon` feature the per-pixel conversion runs in parallel.
pub fn to_lab(image: &Image<Rgb<u8>>) -> LabImage {
    let (width, height) = image.dimensions();

    #[cfg(feature = "rayon")]
    let raw: Vec<f32> = image
        .as_raw()
        .par_chunks_exact(3)
        .flat_map_iter(|rgb| lab_channels(rgb_to_lab(Rgb([rgb[0], rgb[1], rgb[2]]))))
        .collect();

    #[cfg(not(feature = "rayon"))]
    let raw: Vec<f32> = image
        .pixels()
        .flat_map(|&pixel| lab_channels(rgb_to_lab(pixel)))
        .collect();

    // Three channels in, three channels out, so the length always matches.
    ImageBuffer::from_raw(width, height, raw).unwrap_or_else(|| ImageBuffer::new(width, height))
}

/// Converts a single 8-bit RGB color to Lab.
#[inline]
pub fn rgb_to_lab(Rgb([red, green, blue]): Rgb<u8>) -> Lab {
    let srgb = Srgb::new(
        f32::from(red) / 255.0,
        f32::from(green) / 255.0,
        f32::from(blue) / 255.0,
    );
    Lab::from_color(srgb)
}

/// Converts a Lab color back to 8-bit RGB, clamping out-of-gamut values.
pub fn lab_to_rgb(lab: Lab) -> Rgb<u8> {
    let srgb: Srgb<f32> = Srgb::from_color(lab);
    Rgb([
        round_to_u8(srgb.red * 255.0),
        round_to_u8(srgb.green * 255.0),
        round_to_u8(srgb.blue * 255.0),
    ])
}

/// Reads a Lab raster pixel back as a `palette` color.
#[inline]
pub fn lab_pixel(Rgb([l, a, b]): Rgb<f32>) -> Lab {
    Lab::new(l, a, b)
}

/// Builds a `palette` color from channel means.
#[inline]
pub fn lab_from_channels([l, a, b]: [f64; 3]) -> Lab {
    Lab::new(l as f32, a as f32, b as f32)
}

#[inline]
fn lab_channels(lab: Lab) -> [f32; 3] {
    [lab.l, lab.a, lab.b]
}
