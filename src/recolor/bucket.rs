//! Online clustering of masks into paint zones
//!
//! Segmentation returns many overlapping masks for one wall, typically one
//! per lighting condition. Each mask is summarized by its mean Lab color and
//! assigned, in arrival order, to the bucket whose running average is nearest
//! in ΔE00. A mask farther than the threshold from every bucket opens a new
//! one.
//!
//! The pass is greedy and order-sensitive: the same masks in another order can
//! produce another partition. Bucket creation order is the order zones are
//! later recolored in.
//!
//! The threshold is in true CIEDE2000 units over Lab with L* in `0..=100`, not
//! over the 8-bit scaled Lab encoding common in image libraries, so a given
//! threshold separates walls differently than it would on scaled values.

use std::fmt;

use image::Rgb;
use imageproc::definitions::Image;
use log::{debug, trace, warn};
use palette::Lab;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::error::{Error, RecolorResult};
use crate::recolor::color_difference::ciede2000;
use crate::recolor::convert_color::{lab_from_channels, to_lab, LabImage};
use crate::recolor::mask::Mask;
use crate::utils::{masked_mean, validate_mask_dimensions, validate_non_empty_image};

/// Identifier of a bucket; assigned from 1 upwards in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketId(u32);

impl BucketId {
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A group of masks judged to cover the same physical surface
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    id: BucketId,
    average: Lab,
    members: Vec<usize>,
    degenerate: bool,
}

impl Bucket {
    pub const fn id(&self) -> BucketId {
        self.id
    }

    /// Running average color of the bucket.
    pub const fn average(&self) -> Lab {
        self.average
    }

    /// Member mask indices in the order they joined.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// `true` for the singleton bucket of a mask with no set pixel.
    pub const fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}

/// Ordered collection of buckets produced by one clustering pass
#[derive(Debug, Clone, PartialEq)]
pub struct Buckets {
    threshold: f32,
    buckets: Vec<Bucket>,
}

impl Buckets {
    /// Creates an empty collection that merges masks within `threshold` ΔE00.
    pub const fn new(threshold: f32) -> Self {
        Self {
            threshold,
            buckets: Vec::new(),
        }
    }

    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Buckets in creation (id) order.
    pub fn iter(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter()
    }

    pub fn get(&self, id: BucketId) -> Option<&Bucket> {
        (id.0 as usize)
            .checked_sub(1)
            .and_then(|index| self.buckets.get(index))
    }

    /// Bucket holding `mask_index`, if it has been assigned.
    pub fn bucket_of(&self, mask_index: usize) -> Option<BucketId> {
        self.buckets
            .iter()
            .find(|bucket| bucket.members.contains(&mask_index))
            .map(Bucket::id)
    }

    /// Assigns one mask, given its mean color, and returns its bucket.
    ///
    /// `None` marks a mask without set pixels: it gets its own degenerate
    /// bucket and is never used as a merge target. Otherwise the mask joins
    /// the nearest non-degenerate bucket (ties go to the lowest id) when that
    /// bucket is within the threshold; the bucket average becomes the plain
    /// two-point mean of the old average and the new color, so recent masks
    /// weigh more than earlier ones.
    ///
    /// # Errors
    ///
    /// * `Error::MaskAlreadyAssigned` - When `mask_index` already belongs to a bucket
    pub fn assign(&mut self, mask_index: usize, mean: Option<Lab>) -> RecolorResult<BucketId> {
        if let Some(bucket) = self.bucket_of(mask_index) {
            return Err(Error::MaskAlreadyAssigned {
                index: mask_index,
                bucket: bucket.get(),
            });
        }

        let Some(color) = mean else {
            warn!("mask {mask_index} has no set pixels; keeping it in its own bucket");
            return Ok(self.open(mask_index, Lab::new(0.0, 0.0, 0.0), true));
        };

        let nearest = self
            .buckets
            .iter()
            .enumerate()
            .filter(|(_, bucket)| !bucket.degenerate)
            .map(|(index, bucket)| {
                let distance = ciede2000(&bucket.average, &color);
                trace!("mask {mask_index} to bucket {}: ΔE00 {distance:.3}", bucket.id);
                (index, distance)
            })
            .fold(None, |best: Option<(usize, f32)>, (index, distance)| match best {
                Some((_, best_distance)) if best_distance <= distance => best,
                _ => Some((index, distance)),
            });

        match nearest {
            Some((index, distance)) if distance <= self.threshold => {
                let bucket = &mut self.buckets[index];
                bucket.average = midpoint(&bucket.average, &color);
                bucket.members.push(mask_index);
                debug!(
                    "mask {mask_index} joins bucket {} (ΔE00 {distance:.3})",
                    bucket.id
                );
                Ok(bucket.id)
            }
            Some((_, distance)) => {
                debug!(
                    "mask {mask_index} is {distance:.3} from the nearest bucket, above {}",
                    self.threshold
                );
                Ok(self.open(mask_index, color, false))
            }
            None => Ok(self.open(mask_index, color, false)),
        }
    }

    fn open(&mut self, mask_index: usize, average: Lab, degenerate: bool) -> BucketId {
        let id = BucketId(self.buckets.len() as u32 + 1);
        self.buckets.push(Bucket {
            id,
            average,
            members: vec![mask_index],
            degenerate,
        });
        debug!("mask {mask_index} opens bucket {id}");
        id
    }
}

impl<'a> IntoIterator for &'a Buckets {
    type Item = &'a Bucket;
    type IntoIter = std::slice::Iter<'a, Bucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

/// Clusters `masks` over `image` into buckets.
///
/// # Errors
///
/// * `Error::EmptyImage` - When masks are given for an image with a zero dimension
/// * `Error::DimensionMismatch` - When a mask's size differs from the image
pub fn create_buckets(
    image: &Image<Rgb<u8>>,
    masks: &[Mask],
    threshold: f32,
) -> RecolorResult<Buckets> {
    let mut buckets = Buckets::new(threshold);
    if masks.is_empty() {
        return Ok(buckets);
    }

    let (width, height) = image.dimensions();
    validate_non_empty_image(width, height)?;
    validate_mask_dimensions((width, height), masks)?;

    let means = mask_means(&to_lab(image), masks);
    for (index, mean) in means.into_iter().enumerate() {
        buckets.assign(index, mean)?;
    }

    debug!(
        "clustered {} masks into {} buckets",
        masks.len(),
        buckets.len()
    );
    Ok(buckets)
}

/// Mean Lab color under each mask, `None` for masks with no set pixel.
///
/// Means are independent of each other, so the `rayon` feature computes them
/// in parallel; the assignment pass that consumes them stays sequential.
pub fn mask_means(lab: &LabImage, masks: &[Mask]) -> Vec<Option<Lab>> {
    let mean = |mask: &Mask| masked_mean(lab, mask).map(lab_from_channels);

    #[cfg(feature = "rayon")]
    let means = masks.par_iter().map(mean).collect();

    #[cfg(not(feature = "rayon"))]
    let means = masks.iter().map(mean).collect();

    means
}

fn midpoint(first: &Lab, second: &Lab) -> Lab {
    Lab::new(
        (first.l + second.l) / 2.0,
        (first.a + second.a) / 2.0,
        (first.b + second.b) / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::recolor::convert_color::rgb_to_lab;

    fn lab(l: f32, a: f32, b: f32) -> Lab {
        Lab::new(l, a, b)
    }

    #[test]
    fn first_mask_opens_bucket_one() {
        let mut buckets = Buckets::new(30.0);
        let id = buckets.assign(0, Some(lab(50.0, 10.0, 10.0))).unwrap();

        assert_eq!(id.get(), 1);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets.get(id).unwrap().members(), &[0]);
        assert_eq!(buckets.get(id).unwrap().average(), lab(50.0, 10.0, 10.0));
    }

    #[test]
    fn close_colors_share_bucket_with_two_point_average() {
        let mut buckets = Buckets::new(30.0);
        buckets.assign(0, Some(lab(50.0, 0.0, 0.0))).unwrap();
        buckets.assign(1, Some(lab(60.0, 0.0, 0.0))).unwrap();
        buckets.assign(2, Some(lab(70.0, 0.0, 0.0))).unwrap();

        assert_eq!(buckets.len(), 1);
        let bucket = buckets.iter().next().unwrap();
        assert_eq!(bucket.members(), &[0, 1, 2]);
        // ((50 + 60) / 2 + 70) / 2, not the count-weighted 60
        assert_eq!(bucket.average().l, 62.5);
    }

    #[test]
    fn far_colors_open_new_buckets() {
        let mut buckets = Buckets::new(30.0);
        let first = buckets.assign(0, Some(rgb_to_lab(Rgb([255, 0, 0])))).unwrap();
        let second = buckets.assign(1, Some(rgb_to_lab(Rgb([0, 0, 255])))).unwrap();

        assert_ne!(first, second);
        assert_eq!(second.get(), 2);
    }

    #[test]
    fn merges_into_nearest_bucket_not_last_scanned() {
        let mut buckets = Buckets::new(30.0);
        buckets.assign(0, Some(lab(40.0, 0.0, 0.0))).unwrap();
        buckets.assign(1, Some(lab(85.0, 0.0, 0.0))).unwrap();
        assert_eq!(buckets.len(), 2);

        // Nearest is bucket 1, while bucket 2 is scanned last
        let id = buckets.assign(2, Some(lab(45.0, 0.0, 0.0))).unwrap();
        assert_eq!(id.get(), 1);
        assert_eq!(buckets.get(BucketId(1)).unwrap().members(), &[0, 2]);
        assert_eq!(buckets.get(BucketId(1)).unwrap().average().l, 42.5);
        assert_eq!(buckets.get(BucketId(2)).unwrap().members(), &[1]);
        assert_eq!(buckets.get(BucketId(2)).unwrap().average().l, 85.0);
    }

    #[test]
    fn ties_go_to_lowest_bucket_id() {
        let mut buckets = Buckets::new(25.0);
        buckets.assign(0, Some(lab(30.0, 0.0, 0.0))).unwrap();
        buckets.assign(1, Some(lab(70.0, 0.0, 0.0))).unwrap();
        assert_eq!(buckets.len(), 2);

        // L = 50 is equidistant from both buckets
        let id = buckets.assign(2, Some(lab(50.0, 0.0, 0.0))).unwrap();
        assert_eq!(id.get(), 1);
    }

    #[test]
    fn threshold_is_inclusive() {
        let first = lab(50.0, 0.0, 0.0);
        let second = lab(60.0, 0.0, 0.0);
        let distance = ciede2000(&first, &second);

        let mut buckets = Buckets::new(distance);
        buckets.assign(0, Some(first)).unwrap();
        buckets.assign(1, Some(second)).unwrap();
        assert_eq!(buckets.len(), 1);
    }

    #[test]
    fn degenerate_masks_stay_singletons() {
        let mut buckets = Buckets::new(30.0);
        let empty = buckets.assign(0, None).unwrap();
        // Black is at distance 0 from the degenerate bucket's neutral average
        let black = buckets.assign(1, Some(lab(0.0, 0.0, 0.0))).unwrap();

        assert_ne!(empty, black);
        assert!(buckets.get(empty).unwrap().is_degenerate());
        assert_eq!(buckets.get(empty).unwrap().members(), &[0]);
        assert!(!buckets.get(black).unwrap().is_degenerate());
    }

    #[test]
    fn bucket_lookup() {
        let mut buckets = Buckets::new(30.0);
        buckets.assign(0, Some(lab(50.0, 0.0, 0.0))).unwrap();
        buckets.assign(1, Some(lab(52.0, 0.0, 0.0))).unwrap();

        assert_eq!(buckets.bucket_of(1), Some(BucketId(1)));
        assert_eq!(buckets.bucket_of(7), None);
        assert!(buckets.get(BucketId(0)).is_none());
        assert!(buckets.get(BucketId(2)).is_none());
    }

    #[test]
    fn create_buckets_groups_similar_regions() {
        // Left half light gray, right half red
        let image: Image<Rgb<u8>> = Image::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgb([180, 180, 180])
            } else {
                Rgb([200, 20, 20])
            }
        });
        let masks = vec![
            Mask::from_fn(4, 2, |x, y| x == 0 && y == 0),
            Mask::from_fn(4, 2, |x, _| x == 3),
            Mask::from_fn(4, 2, |x, y| x == 1 && y == 1),
        ];

        let buckets = create_buckets(&image, &masks, 30.0).unwrap();
        let members: Vec<_> = buckets.iter().map(|b| b.members().to_vec()).collect();
        assert_eq!(members, vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn create_buckets_rejects_mismatched_masks() {
        let image: Image<Rgb<u8>> = Image::new(4, 4);
        let masks = vec![Mask::full(4, 4), Mask::full(2, 2)];

        assert_eq!(
            create_buckets(&image, &masks, 30.0),
            Err(Error::DimensionMismatch {
                index: 1,
                expected: (4, 4),
                actual: (2, 2),
            })
        );
    }

    #[test]
    fn create_buckets_without_masks_is_empty() {
        let image: Image<Rgb<u8>> = Image::new(0, 0);
        let buckets = create_buckets(&image, &[], 30.0).unwrap();
        assert!(buckets.is_empty());
    }

    #[test]
    fn assigning_a_mask_twice_is_rejected() {
        let mut buckets = Buckets::new(30.0);
        buckets.assign(0, Some(lab(50.0, 0.0, 0.0))).unwrap();
        buckets.assign(1, None).unwrap();

        assert_eq!(
            buckets.assign(0, Some(lab(52.0, 0.0, 0.0))),
            Err(Error::MaskAlreadyAssigned {
                index: 0,
                bucket: 1
            })
        );
        assert_eq!(
            buckets.assign(1, None),
            Err(Error::MaskAlreadyAssigned {
                index: 1,
                bucket: 2
            })
        );

        // Rejected calls leave the buckets untouched
        assert_eq!(buckets.len(), 2);
        let first = buckets.iter().next().unwrap();
        assert_eq!(first.members(), &[0]);
        assert_eq!(first.average(), lab(50.0, 0.0, 0.0));
    }

    #[test]
    fn threshold_uses_unscaled_lightness() {
        // ΔL* of 25 between neutrals is about 24.6 ΔE00; on an 8-bit scaled
        // L channel the same gap would read as roughly 64
        let mut buckets = Buckets::new(30.0);
        let dark = buckets.assign(0, Some(lab(40.0, 0.0, 0.0))).unwrap();
        let light = buckets.assign(1, Some(lab(65.0, 0.0, 0.0))).unwrap();

        assert_eq!(dark, light);
        assert_eq!(buckets.get(dark).unwrap().average().l, 52.5);
    }
}
