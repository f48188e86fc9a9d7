//! Internal utility functions for wall-recolor.
//!
//! This module contains validation and accumulation helpers shared by the
//! clusterer and the recolorer.

use image::{Pixel, Primitive, Rgb};
use imageproc::definitions::{Clamp, Image};

use crate::error::Error;
use crate::recolor::mask::Mask;

/// Clamps a floating-point value to the range of a primitive type.
///
/// # Arguments
///
/// * `value` - The floating-point value to clamp
///
/// # Returns
///
/// The clamped value as the target primitive type
#[inline]
pub fn clamp_f32_to_primitive<T: Primitive + Clamp<f32>>(value: f32) -> T {
    T::clamp(value)
}

/// Rounds and clamps a channel value into `u8`.
///
/// `imageproc`'s `Clamp` truncates, so rounding happens first.
#[inline]
pub fn round_to_u8(value: f32) -> u8 {
    clamp_f32_to_primitive::<u8>(value.round())
}

/// Validates that an image has non-zero dimensions.
///
/// # Arguments
///
/// * `width` - The width of the image
/// * `height` - The height of the image
///
/// # Returns
///
/// `Ok(())` if the dimensions are valid, otherwise `Error::EmptyImage`
pub fn validate_non_empty_image(width: u32, height: u32) -> Result<(), Error> {
    if width == 0 || height == 0 {
        Err(Error::EmptyImage)
    } else {
        Ok(())
    }
}

/// Validates that every mask has the image's dimensions.
///
/// The first offending mask is reported with its index.
pub fn validate_mask_dimensions(image_size: (u32, u32), masks: &[Mask]) -> Result<(), Error> {
    masks
        .iter()
        .enumerate()
        .find(|(_, mask)| mask.dimensions() != image_size)
        .map_or(Ok(()), |(index, mask)| {
            Err(Error::DimensionMismatch {
                index,
                expected: image_size,
                actual: mask.dimensions(),
            })
        })
}

/// Averages the three channels of `image` over the pixels set in `mask`.
///
/// Sums are accumulated in `f64`. Returns `None` when the mask has no set
/// pixel. Dimensions are assumed to have been validated by the caller.
pub fn masked_mean<S>(image: &Image<Rgb<S>>, mask: &Mask) -> Option<[f64; 3]>
where
    Rgb<S>: Pixel<Subpixel = S>,
    S: Primitive + Into<f64>,
{
    let (sum, count) = image
        .pixels()
        .zip(mask.iter())
        .filter(|(_, set)| *set)
        .fold(([0.0f64; 3], 0usize), |(mut sum, count), (pixel, _)| {
            let Rgb([c0, c1, c2]) = *pixel;
            sum[0] += c0.into();
            sum[1] += c1.into();
            sum[2] += c2.into();
            (sum, count + 1)
        });

    if count == 0 {
        return None;
    }

    let n = count as f64;
    Some([sum[0] / n, sum[1] / n, sum[2] / n])
}
