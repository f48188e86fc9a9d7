//! CIEDE2000 color difference
//!
//! ΔE00 weights lightness, chroma and hue differences unevenly and follows
//! perceived similarity much more closely than a Euclidean distance in Lab or
//! RGB. The clusterer relies on that to tell "same wall under different light"
//! apart from "different surface".
//!
//! ## References
//!
//! [1] Sharma, G., Wu, W., & Dalal, E. N. "The CIEDE2000 color-difference formula:
//!     Implementation notes, supplementary test data, and mathematical observations."
//!     Color Research & Application, 2005.

use palette::color_difference::Ciede2000;
use palette::Lab;

/// Computes the CIEDE2000 difference between two Lab colors.
///
/// Symmetric, non-negative and zero for identical inputs, with the reference
/// weighting factors `kL = kC = kH = 1`.
#[inline]
pub fn ciede2000(lab1: &Lab, lab2: &Lab) -> f32 {
    lab1.difference(*lab2)
}
