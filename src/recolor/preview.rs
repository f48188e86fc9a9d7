//! Debug rendering of zones over the photo

use image::{Luma, Rgb};
use imageproc::definitions::Image;
use imageproc::map::map_colors2;
use palette::{FromColor, Hsv, Srgb};

use crate::error::{Error, RecolorResult};
use crate::recolor::mask::Mask;
use crate::utils::{round_to_u8, validate_mask_dimensions};

/// Hue step between consecutive zones (golden angle), in degrees
const HUE_STEP: f32 = 137.507_77;

/// Distinct, saturated tint for the zone at `index`.
pub fn zone_tint(index: usize) -> Rgb<u8> {
    let hue = (index as f32 * HUE_STEP) % 360.0;
    let hsv: Hsv = Hsv::new(hue, 0.85, 1.0);
    let srgb: Srgb<f32> = Srgb::from_color(hsv);
    let srgb: Srgb<u8> = srgb.into_format();
    Rgb([srgb.red, srgb.green, srgb.blue])
}

/// Tints each zone of `image` with its own color.
///
/// Zones are painted in order, so a pixel covered by several zones shows the
/// last one blended over the earlier ones. `opacity` is the tint weight.
///
/// # Errors
///
/// * `Error::InvalidParameter` - When `opacity` is outside `[0, 1]`
/// * `Error::DimensionMismatch` - When a zone's size differs from the image
pub fn overlay_zones(
    image: &Image<Rgb<u8>>,
    zones: &[Mask],
    opacity: f32,
) -> RecolorResult<Image<Rgb<u8>>> {
    if !(0.0..=1.0).contains(&opacity) {
        return Err(Error::InvalidParameter(format!(
            "overlay opacity must be in [0, 1], got {opacity}"
        )));
    }
    validate_mask_dimensions(image.dimensions(), zones)?;

    Ok(zones
        .iter()
        .enumerate()
        .fold(image.clone(), |current, (index, zone)| {
            let Rgb(tint) = zone_tint(index);
            map_colors2(&current, zone.as_luma(), |Rgb(pixel), Luma([m])| {
                if m == 0 {
                    return Rgb(pixel);
                }
                Rgb([0, 1, 2].map(|c| {
                    let base = f32::from(pixel[c]);
                    round_to_u8(base.mul_add(1.0 - opacity, f32::from(tint[c]) * opacity))
                }))
            })
        }))
}
