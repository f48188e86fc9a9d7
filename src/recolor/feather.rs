//! Soft alpha mattes for zone compositing
//!
//! A binary zone mask composited as-is leaves a hard seam where the new paint
//! meets untouched pixels. The mask is therefore blurred with a Gaussian and
//! the blurred intensities are rescaled linearly from an input range (default
//! `[100, 150]` on the 0..=255 scale) to `[0, 1]`. Pixels well inside the
//! zone end at alpha 1, pixels well outside at 0, and the band around the
//! boundary ramps between them.

use image::Luma;
use imageproc::definitions::Image;
use imageproc::filter::gaussian_blur_f32;

use crate::config::{validate_blur_sigma, AlphaRange};
use crate::error::RecolorResult;
use crate::recolor::mask::Mask;

/// Builds the feathered alpha matte of a zone.
///
/// The blur runs on an `f32` copy of the mask (`0.0` / `255.0`) so a fully set
/// neighbourhood stays at exactly 255 and maps to alpha 1. Image borders
/// replicate the edge pixels.
///
/// # Errors
///
/// * `Error::InvalidParameter` - When `sigma` is not positive or `range` is empty
pub fn feather_mask(
    mask: &Mask,
    sigma: f32,
    range: AlphaRange,
) -> RecolorResult<Image<Luma<f32>>> {
    validate_blur_sigma(sigma)?;
    range.validate()?;

    let (width, height) = mask.dimensions();
    if mask.is_empty() || width == 0 || height == 0 {
        return Ok(Image::new(width, height));
    }

    let intensity: Image<Luma<f32>> = Image::from_fn(width, height, |x, y| {
        Luma([if mask.get(x, y) { f32::from(Mask::SET) } else { 0.0 }])
    });

    let mut alpha = gaussian_blur_f32(&intensity, sigma);
    alpha
        .pixels_mut()
        .for_each(|Luma([value])| *value = range.rescale(*value));
    Ok(alpha)
}
