//! Segmentation seam and the end-to-end recoloring pipeline
//!
//! Region masks come from an external detector/segmenter (text-prompted box
//! detection followed by mask prediction). The engine only needs the
//! capability "image + caption + thresholds → ordered boolean masks", which
//! is what [`SegmentationProvider`] describes. A provider is built once by the
//! caller, typically at process start since model weights are expensive to
//! load, and lent to each [`RecolorPipeline`].

use image::Rgb;
use imageproc::definitions::Image;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::RecolorConfig;
use crate::error::{Error, RecolorResult};
use crate::recolor::engine::{RecolorEngine, RecolorOutput, Zones};
use crate::recolor::mask::Mask;
use crate::recolor::paint::PaintColor;

/// Text prompt and confidence thresholds handed to the segmenter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationQuery {
    /// Object to find, e.g. `"wall"`
    pub caption: String,
    /// Minimum box confidence
    pub box_threshold: f32,
    /// Minimum caption-token confidence
    pub text_threshold: f32,
}

impl Default for SegmentationQuery {
    fn default() -> Self {
        Self {
            caption: "wall".to_string(),
            box_threshold: 0.30,
            text_threshold: 0.35,
        }
    }
}

/// Source of region masks for a photo
pub trait SegmentationProvider {
    /// Returns the masks found for `query`, in the provider's order.
    ///
    /// Every mask must have the image's dimensions; the pipeline checks this
    /// before using them.
    ///
    /// # Errors
    ///
    /// Implementations report failures as `Error::Segmentation`.
    fn segment(&self, image: &Image<Rgb<u8>>, query: &SegmentationQuery)
        -> RecolorResult<Vec<Mask>>;
}

impl<P: SegmentationProvider + ?Sized> SegmentationProvider for &P {
    fn segment(
        &self,
        image: &Image<Rgb<u8>>,
        query: &SegmentationQuery,
    ) -> RecolorResult<Vec<Mask>> {
        (**self).segment(image, query)
    }
}

/// Output of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Buckets and merged masks shared by every target color
    pub zones: Zones,
    /// One recolored image per requested color, in request order
    pub recolored: Vec<(PaintColor, Image<Rgb<u8>>)>,
}

/// Segment → bucket → merge → recolor, with an injected provider
#[derive(Debug, Clone)]
pub struct RecolorPipeline<'p, P: ?Sized> {
    provider: &'p P,
    engine: RecolorEngine,
    query: SegmentationQuery,
}

impl<'p, P> RecolorPipeline<'p, P>
where
    P: SegmentationProvider + ?Sized,
{
    /// # Errors
    ///
    /// * `Error::InvalidParameter` - When `config` is invalid
    pub fn new(provider: &'p P, config: RecolorConfig) -> RecolorResult<Self> {
        Ok(Self {
            provider,
            engine: RecolorEngine::new(config)?,
            query: SegmentationQuery::default(),
        })
    }

    #[must_use]
    pub fn with_query(mut self, query: SegmentationQuery) -> Self {
        self.query = query;
        self
    }

    pub const fn engine(&self) -> &RecolorEngine {
        &self.engine
    }

    pub const fn query(&self) -> &SegmentationQuery {
        &self.query
    }

    /// Segments `image` once and recolors it for every color in `targets`.
    ///
    /// # Errors
    ///
    /// * `Error::Segmentation` - When the provider fails
    /// * `Error::DimensionMismatch` - When the provider returns a mask of the wrong size
    /// * `Error::EmptyImage` - When the image is empty and masks were found
    pub fn run(
        &self,
        image: &Image<Rgb<u8>>,
        targets: &[PaintColor],
    ) -> RecolorResult<PipelineOutput> {
        let masks = self.provider.segment(image, &self.query)?;
        info!(
            "segmentation returned {} masks for {:?}",
            masks.len(),
            self.query.caption
        );

        let zones = self.engine.partition(image, &masks)?;
        debug!("{} zones to recolor", zones.merged_masks.len());

        let recolored = targets
            .iter()
            .map(|&target| {
                let output = self
                    .engine
                    .recolor_partitioned(image, zones.merged_masks.clone(), target)?;
                Ok((target, output.image))
            })
            .collect::<RecolorResult<Vec<_>>>()?;

        Ok(PipelineOutput { zones, recolored })
    }

    /// Segments and recolors for a single color.
    ///
    /// # Errors
    ///
    /// Same as [`RecolorPipeline::run`].
    pub fn run_single(
        &self,
        image: &Image<Rgb<u8>>,
        target: PaintColor,
    ) -> RecolorResult<RecolorOutput> {
        let masks = self.provider.segment(image, &self.query)?;
        self.engine.recolor(image, &masks, target)
    }
}

/// Wraps a provider-side failure message.
pub fn segmentation_error(message: impl Into<String>) -> Error {
    Error::Segmentation(message.into())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::test_utils::create_uniform_rgb_image;

    struct FixedMasks {
        masks: Vec<Mask>,
        calls: Cell<usize>,
    }

    impl SegmentationProvider for FixedMasks {
        fn segment(
            &self,
            _image: &Image<Rgb<u8>>,
            query: &SegmentationQuery,
        ) -> RecolorResult<Vec<Mask>> {
            assert_eq!(query.caption, "wall");
            self.calls.set(self.calls.get() + 1);
            Ok(self.masks.clone())
        }
    }

    struct Failing;

    impl SegmentationProvider for Failing {
        fn segment(
            &self,
            _image: &Image<Rgb<u8>>,
            _query: &SegmentationQuery,
        ) -> RecolorResult<Vec<Mask>> {
            Err(segmentation_error("model not loaded"))
        }
    }

    #[test]
    fn default_query_targets_walls() {
        let query = SegmentationQuery::default();
        assert_eq!(query.caption, "wall");
        assert_eq!(query.box_threshold, 0.30);
        assert_eq!(query.text_threshold, 0.35);
    }

    #[test]
    fn run_segments_once_for_all_targets() {
        let provider = FixedMasks {
            masks: vec![Mask::full(5, 5)],
            calls: Cell::new(0),
        };
        let pipeline = RecolorPipeline::new(&provider, RecolorConfig::default()).unwrap();
        let image = create_uniform_rgb_image(5, 5, Rgb([50, 50, 50]));
        let targets = [PaintColor::new(10, 20, 30), PaintColor::new(200, 210, 220)];

        let output = pipeline.run(&image, &targets).unwrap();

        assert_eq!(provider.calls.get(), 1);
        assert_eq!(output.zones.merged_masks, vec![Mask::full(5, 5)]);
        assert_eq!(output.recolored.len(), 2);
        assert_eq!(output.recolored[1].0, targets[1]);
        assert!(output.recolored[1]
            .1
            .pixels()
            .all(|p| *p == Rgb([200, 210, 220])));
    }

    #[test]
    fn provider_errors_propagate() {
        let pipeline = RecolorPipeline::new(&Failing, RecolorConfig::default()).unwrap();
        let image = create_uniform_rgb_image(2, 2, Rgb([0, 0, 0]));

        assert_eq!(
            pipeline.run_single(&image, PaintColor::new(1, 1, 1)),
            Err(Error::Segmentation("model not loaded".to_string()))
        );
    }

    #[test]
    fn pipeline_works_with_trait_objects() {
        let provider = FixedMasks {
            masks: vec![],
            calls: Cell::new(0),
        };
        let dynamic: &dyn SegmentationProvider = &provider;
        let pipeline = RecolorPipeline::new(dynamic, RecolorConfig::default()).unwrap();
        let image = create_uniform_rgb_image(3, 3, Rgb([7, 7, 7]));

        let output = pipeline.run_single(&image, PaintColor::new(255, 255, 255)).unwrap();
        assert_eq!(output.image, image);
        assert!(output.merged_masks.is_empty());
    }
}
