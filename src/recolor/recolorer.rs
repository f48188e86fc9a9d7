//! Sequential color-shift compositing
//!
//! Each zone is recolored by shifting the whole image by the difference
//! between the target color and the zone's current mean color, then blending
//! the shifted image in through the zone's feathered alpha matte:
//!
//! ```text
//! shifted = clip(current + (target - mean(current | zone)))
//! next    = clip(current * (1 - α) + shifted * α)
//! ```
//!
//! A uniform shift keeps the relative shading and texture of the wall. Zones
//! are processed in bucket order and each one measures its mean on the output
//! of the previous one, so overlapping boundaries converge instead of every
//! zone working from the original photo. The loop must stay sequential.

use image::{Luma, Rgb};
use imageproc::definitions::Image;
use itertools::izip;
use log::debug;

use crate::config::{validate_blur_sigma, AlphaRange, RecolorConfig};
use crate::error::RecolorResult;
use crate::recolor::feather::feather_mask;
use crate::recolor::mask::Mask;
use crate::recolor::paint::PaintColor;
use crate::utils::{masked_mean, round_to_u8, validate_mask_dimensions};

/// Feathering parameters shared by every zone of one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feathering {
    pub sigma: f32,
    pub range: AlphaRange,
}

impl Feathering {
    /// # Errors
    ///
    /// * `Error::InvalidParameter` - When `sigma` is not positive or `range` is empty
    pub fn validate(&self) -> RecolorResult<()> {
        validate_blur_sigma(self.sigma)?;
        self.range.validate()
    }
}

impl From<&RecolorConfig> for Feathering {
    fn from(config: &RecolorConfig) -> Self {
        Self {
            sigma: config.blur_sigma,
            range: config.alpha_range,
        }
    }
}

/// Recolors `zones` one after the other.
///
/// Each step takes the previous step's image and returns a new one; the input
/// image is never modified. An empty zone list returns a copy of the input.
///
/// # Errors
///
/// * `Error::InvalidParameter` - When `feathering` is invalid
/// * `Error::DimensionMismatch` - When a zone's size differs from the image,
///   checked for every zone before any recoloring
pub fn recolor_zones(
    image: &Image<Rgb<u8>>,
    zones: &[Mask],
    target: PaintColor,
    feathering: Feathering,
) -> RecolorResult<Image<Rgb<u8>>> {
    feathering.validate()?;
    validate_mask_dimensions(image.dimensions(), zones)?;

    zones
        .iter()
        .enumerate()
        .try_fold(image.clone(), |current, (index, zone)| {
            debug!("recoloring zone {index} ({} pixels)", zone.count());
            recolor_zone(&current, zone, target, feathering)
        })
}

/// Recolors a single zone and returns the composited image.
///
/// # Errors
///
/// * `Error::InvalidParameter` - When `feathering` is invalid
/// * `Error::DimensionMismatch` - When the zone's size differs from the image
pub fn recolor_zone(
    current: &Image<Rgb<u8>>,
    zone: &Mask,
    target: PaintColor,
    feathering: Feathering,
) -> RecolorResult<Image<Rgb<u8>>> {
    validate_mask_dimensions(current.dimensions(), std::slice::from_ref(zone))?;

    let mean = masked_mean(current, zone).unwrap_or([0.0; 3]);
    let delta = color_delta(target, mean);
    debug!(
        "zone mean {:.2?}, shifting by {:.2?} towards {target}",
        mean, delta
    );

    let alpha = feather_mask(zone, feathering.sigma, feathering.range)?;
    Ok(composite(current, delta, &alpha))
}

/// Per-channel `target - mean`, broadcast later to every pixel.
#[inline]
pub fn color_delta(target: PaintColor, mean: [f64; 3]) -> [f32; 3] {
    let Rgb(channels) = target.rgb();
    [
        (f64::from(channels[0]) - mean[0]) as f32,
        (f64::from(channels[1]) - mean[1]) as f32,
        (f64::from(channels[2]) - mean[2]) as f32,
    ]
}

/// Blends `current` with its `delta`-shifted copy through `alpha`.
///
/// The shifted channel is clipped to `[0, 255]` before blending and the blend
/// is rounded and clipped again.
pub fn composite(
    current: &Image<Rgb<u8>>,
    delta: [f32; 3],
    alpha: &Image<Luma<f32>>,
) -> Image<Rgb<u8>> {
    let mut output = current.clone();

    for (out, source, Luma([a])) in izip!(output.pixels_mut(), current.pixels(), alpha.pixels()) {
        let a = *a;
        if a <= 0.0 {
            continue;
        }

        let Rgb(channels) = *source;
        *out = Rgb([0, 1, 2].map(|c| {
            let original = f32::from(channels[c]);
            let shifted = (original + delta[c]).clamp(0.0, 255.0);
            round_to_u8(original.mul_add(1.0 - a, shifted * a))
        }));
    }

    output
}
