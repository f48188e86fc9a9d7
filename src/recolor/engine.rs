//! Entry point of the recoloring engine
//!
//! ```no_run
//! use wall_recolor::{Image, Mask, PaintColor, RecolorConfig, RecolorZones};
//! use image::Rgb;
//!
//! # fn example() -> Result<(), wall_recolor::Error> {
//! let photo: Image<Rgb<u8>> = Image::new(640, 480);
//! let masks = vec![Mask::full(640, 480)];
//! let paint = PaintColor::from_hex("#97bee2")?;
//!
//! let output = photo.recolor_zones(&masks, paint, &RecolorConfig::default())?;
//! assert_eq!(output.merged_masks.len(), 1);
//! # Ok(())
//! # }
//! ```

use image::Rgb;
use imageproc::definitions::Image;
use log::debug;

use crate::config::RecolorConfig;
use crate::error::RecolorResult;
use crate::recolor::bucket::{create_buckets, Buckets};
use crate::recolor::mask::Mask;
use crate::recolor::merge::merge_masks;
use crate::recolor::paint::PaintColor;
use crate::recolor::recolorer::{recolor_zones, Feathering};

/// Result of one recoloring call
#[derive(Debug, Clone, PartialEq)]
pub struct RecolorOutput {
    /// Recolored image, same size and encoding as the input
    pub image: Image<Rgb<u8>>,
    /// One merged mask per zone, in recoloring order
    pub merged_masks: Vec<Mask>,
}

/// Buckets and merged masks of an image, before any recoloring
#[derive(Debug, Clone, PartialEq)]
pub struct Zones {
    pub buckets: Buckets,
    pub merged_masks: Vec<Mask>,
}

/// Recoloring engine holding a validated configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecolorEngine {
    config: RecolorConfig,
}

impl Default for RecolorEngine {
    fn default() -> Self {
        Self {
            config: RecolorConfig::default(),
        }
    }
}

impl RecolorEngine {
    /// # Errors
    ///
    /// * `Error::InvalidParameter` - When the configuration is invalid
    pub fn new(config: RecolorConfig) -> RecolorResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &RecolorConfig {
        &self.config
    }

    /// Clusters the masks into zones without touching the image.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - When masks are given for an empty image
    /// * `Error::DimensionMismatch` - When a mask's size differs from the image
    pub fn partition(&self, image: &Image<Rgb<u8>>, masks: &[Mask]) -> RecolorResult<Zones> {
        let buckets = create_buckets(image, masks, self.config.threshold)?;
        let merged_masks = merge_masks(&buckets, masks)?;
        Ok(Zones {
            buckets,
            merged_masks,
        })
    }

    /// Recolors every zone found in `masks` to `target`.
    ///
    /// An empty mask list returns the image unchanged with no merged masks.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - When masks are given for an empty image
    /// * `Error::DimensionMismatch` - When a mask's size differs from the image
    pub fn recolor(
        &self,
        image: &Image<Rgb<u8>>,
        masks: &[Mask],
        target: PaintColor,
    ) -> RecolorResult<RecolorOutput> {
        if masks.is_empty() {
            debug!("no masks supplied; returning the image unchanged");
            return Ok(RecolorOutput {
                image: image.clone(),
                merged_masks: Vec::new(),
            });
        }

        let zones = self.partition(image, masks)?;
        self.recolor_partitioned(image, zones.merged_masks, target)
    }

    /// Recolors the same image once per target color.
    ///
    /// Clustering and merging run once; each target then gets its own
    /// sequential zone pass starting from the original image.
    ///
    /// # Errors
    ///
    /// Same as [`RecolorEngine::recolor`].
    pub fn recolor_many(
        &self,
        image: &Image<Rgb<u8>>,
        masks: &[Mask],
        targets: &[PaintColor],
    ) -> RecolorResult<Vec<RecolorOutput>> {
        if masks.is_empty() {
            return Ok(targets
                .iter()
                .map(|_| RecolorOutput {
                    image: image.clone(),
                    merged_masks: Vec::new(),
                })
                .collect());
        }

        let zones = self.partition(image, masks)?;
        targets
            .iter()
            .map(|&target| self.recolor_partitioned(image, zones.merged_masks.clone(), target))
            .collect()
    }

    pub(crate) fn recolor_partitioned(
        &self,
        image: &Image<Rgb<u8>>,
        merged_masks: Vec<Mask>,
        target: PaintColor,
    ) -> RecolorResult<RecolorOutput> {
        debug!("recoloring {} zones to {target}", merged_masks.len());
        let image = recolor_zones(
            image,
            &merged_masks,
            target,
            Feathering::from(&self.config),
        )?;
        Ok(RecolorOutput {
            image,
            merged_masks,
        })
    }
}

/// Trait recoloring the zones of an RGB photo
pub trait RecolorZones {
    /// Clusters `masks` into zones and recolors them to `target`.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidParameter` - When `config` is invalid
    /// * `Error::EmptyImage` - When masks are given for an empty image
    /// * `Error::DimensionMismatch` - When a mask's size differs from the image
    fn recolor_zones(
        &self,
        masks: &[Mask],
        target: PaintColor,
        config: &RecolorConfig,
    ) -> RecolorResult<RecolorOutput>;
}

impl RecolorZones for Image<Rgb<u8>> {
    fn recolor_zones(
        &self,
        masks: &[Mask],
        target: PaintColor,
        config: &RecolorConfig,
    ) -> RecolorResult<RecolorOutput> {
        recolor(self, masks, target, config)
    }
}

/// Clusters `masks` into zones and recolors them to `target`.
///
/// # Errors
///
/// * `Error::InvalidParameter` - When `config` is invalid
/// * `Error::EmptyImage` - When masks are given for an empty image
/// * `Error::DimensionMismatch` - When a mask's size differs from the image
pub fn recolor(
    image: &Image<Rgb<u8>>,
    masks: &[Mask],
    target: PaintColor,
    config: &RecolorConfig,
) -> RecolorResult<RecolorOutput> {
    RecolorEngine::new(*config)?.recolor(image, masks, target)
}
