use thiserror::Error;

/// Result type used across the recoloring engine
pub type RecolorResult<T> = Result<T, Error>;

/// Error type for mask bucketing and recoloring operations
///
/// An empty mask list and masks without any set pixel are not errors;
/// both are handled as no-ops by the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A mask does not have the same dimensions as the image
    ///
    /// Raised before any clustering starts.
    #[error("Mask {index} dimensions do not match the image: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Position of the offending mask in the input list
        index: usize,
        /// Image dimensions (width, height)
        expected: (u32, u32),
        /// Mask dimensions (width, height)
        actual: (u32, u32),
    },

    /// A target color component is outside `[0, 255]`
    #[error("Color channel {channel} has value {value}, expected 0..=255")]
    InvalidColor { channel: usize, value: i64 },

    /// The image has a zero width or height
    #[error("Image dimensions must be non-zero")]
    EmptyImage,

    /// A bucket references a mask that was not supplied
    #[error("Mask index {index} is out of range for {len} masks")]
    MaskIndexOutOfRange { index: usize, len: usize },

    /// A mask index was assigned to a bucket twice
    #[error("Mask {index} is already assigned to bucket {bucket}")]
    MaskAlreadyAssigned { index: usize, bucket: u32 },

    /// Invalid parameter provided to the operation
    ///
    /// This error is returned when a parameter value is invalid
    /// or outside the acceptable range for the operation.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A configuration document could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The segmentation provider failed to produce masks
    #[error("Segmentation failed: {0}")]
    Segmentation(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
