mod config;
mod error;
mod recolor;
mod utils;

#[cfg(test)]
mod test_utils;

use image::{ImageBuffer, Pixel};

pub use config::{
    AlphaRange, RecolorConfig, DEFAULT_ALPHA_RANGE, DEFAULT_BLUR_SIGMA, DEFAULT_THRESHOLD,
};
pub use error::{Error, RecolorResult};
pub use recolor::bucket::{create_buckets, Bucket, BucketId, Buckets};
pub use recolor::color_difference::ciede2000;
pub use recolor::convert_color::{lab_pixel, lab_to_rgb, rgb_to_lab, to_lab, LabImage, ToLab};
pub use recolor::engine::{recolor, RecolorEngine, RecolorOutput, RecolorZones, Zones};
pub use recolor::feather::feather_mask;
pub use recolor::mask::Mask;
pub use recolor::merge::merge_masks;
pub use recolor::paint::PaintColor;
pub use recolor::preview::{overlay_zones, zone_tint};
pub use recolor::recolorer::{recolor_zones, Feathering};
pub use recolor::segmentation::{
    segmentation_error, PipelineOutput, RecolorPipeline, SegmentationProvider, SegmentationQuery,
};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
