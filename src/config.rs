//! Tunable parameters of the recoloring engine.
//!
//! Configuration can be built programmatically or loaded from JSON; missing
//! fields fall back to the defaults:
//!
//! ```no_run
//! use wall_recolor::RecolorConfig;
//!
//! let config = RecolorConfig::from_json_str(r#"{ "threshold": 25.0 }"#)?;
//! assert_eq!(config.blur_sigma, 3.0);
//!
//! let config = RecolorConfig::default().with_blur_sigma(2.0);
//! # Ok::<(), wall_recolor::Error>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Maximum ΔE00 between a mask and a bucket for the mask to join it
pub const DEFAULT_THRESHOLD: f32 = 30.0;

/// Standard deviation of the Gaussian used to feather zone masks
pub const DEFAULT_BLUR_SIGMA: f32 = 3.0;

/// Blurred mask intensities mapped to alpha 0 and 1
pub const DEFAULT_ALPHA_RANGE: AlphaRange = AlphaRange {
    low: 100.0,
    high: 150.0,
};

/// Input intensity range rescaled linearly to alpha `[0, 1]`
///
/// Blurred mask values (0..=255) at or below `low` give alpha 0, values at or
/// above `high` give alpha 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlphaRange {
    pub low: f32,
    pub high: f32,
}

impl AlphaRange {
    pub const fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    /// Maps an intensity to `[0, 1]`, clamping outside the range.
    #[inline]
    pub fn rescale(&self, value: f32) -> f32 {
        ((value - self.low) / (self.high - self.low)).clamp(0.0, 1.0)
    }

    /// # Errors
    ///
    /// * `Error::InvalidParameter` - When a bound is not finite or `low >= high`
    pub fn validate(&self) -> Result<(), Error> {
        if !self.low.is_finite() || !self.high.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "alpha range must be finite, got [{}, {}]",
                self.low, self.high
            )));
        }
        if self.low >= self.high {
            return Err(Error::InvalidParameter(format!(
                "alpha range low ({}) must be below high ({})",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

impl Default for AlphaRange {
    fn default() -> Self {
        DEFAULT_ALPHA_RANGE
    }
}

/// Parameters of one recoloring call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecolorConfig {
    /// Bucket merge threshold in ΔE00 units
    pub threshold: f32,

    /// Gaussian sigma used to feather zone edges
    pub blur_sigma: f32,

    /// Blurred intensity range mapped to alpha `[0, 1]`
    pub alpha_range: AlphaRange,
}

impl Default for RecolorConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            blur_sigma: DEFAULT_BLUR_SIGMA,
            alpha_range: DEFAULT_ALPHA_RANGE,
        }
    }
}

impl RecolorConfig {
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_blur_sigma(mut self, blur_sigma: f32) -> Self {
        self.blur_sigma = blur_sigma;
        self
    }

    #[must_use]
    pub const fn with_alpha_range(mut self, alpha_range: AlphaRange) -> Self {
        self.alpha_range = alpha_range;
        self
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// * `Error::Config` - When the document is not valid JSON for this type
    /// * `Error::InvalidParameter` - When a value is out of range
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidParameter` - For a negative or non-finite threshold,
    ///   a non-positive or non-finite sigma, or an empty alpha range
    pub fn validate(&self) -> Result<(), Error> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "threshold must be a finite non-negative ΔE00, got {}",
                self.threshold
            )));
        }
        validate_blur_sigma(self.blur_sigma)?;
        self.alpha_range.validate()
    }
}

/// Checks that a Gaussian sigma is finite and positive.
///
/// # Errors
///
/// * `Error::InvalidParameter` - For a non-positive or non-finite sigma
pub fn validate_blur_sigma(sigma: f32) -> Result<(), Error> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "blur sigma must be > 0, got {sigma}"
        )));
    }
    Ok(())
}
