use crate::error::{Error, RecolorResult};
use crate::recolor::bucket::{Bucket, Buckets};
use crate::recolor::mask::Mask;

/// Collapses each bucket into one zone mask.
///
/// Returns one mask per bucket, in bucket id order, each being the pixel-wise
/// OR of the bucket's member masks. Pure: merging the same buckets again
/// yields the same masks.
///
/// # Errors
///
/// * `Error::MaskIndexOutOfRange` - When a bucket references a missing mask
/// * `Error::DimensionMismatch` - When member masks differ in size
pub fn merge_masks(buckets: &Buckets, masks: &[Mask]) -> RecolorResult<Vec<Mask>> {
    buckets
        .iter()
        .map(|bucket| merge_bucket(bucket, masks))
        .collect()
}

/// Union of the masks listed in one bucket.
pub fn merge_bucket(bucket: &Bucket, masks: &[Mask]) -> RecolorResult<Mask> {
    let lookup = |index: usize| {
        masks.get(index).ok_or(Error::MaskIndexOutOfRange {
            index,
            len: masks.len(),
        })
    };

    let (&first, rest) = bucket
        .members()
        .split_first()
        .ok_or_else(|| Error::InvalidParameter(format!("bucket {} has no members", bucket.id())))?;

    let mut merged = lookup(first)?.clone();
    for &index in rest {
        merged.union_mut(lookup(index)?).map_err(|err| match err {
            Error::DimensionMismatch {
                expected, actual, ..
            } => Error::DimensionMismatch {
                index,
                expected,
                actual,
            },
            other => other,
        })?;
    }
    Ok(merged)
}
