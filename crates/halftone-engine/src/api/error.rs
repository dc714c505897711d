//! Unified error type for the halftone-engine public API.
//!
//! Every operation of the engine reports failures synchronously through
//! [`EngineError`]. Nothing is retried internally and no partial result is
//! ever returned alongside an error.

use thiserror::Error;

use crate::raster::Channel;

/// Errors produced by separation, screening and compositing.
///
/// # Example
///
/// ```
/// use halftone_engine::{EngineError, ScreenParameters};
///
/// // 300 LPI at 300 DPI is above the Nyquist bound (DPI / 2).
/// let err = ScreenParameters::new(300.0, 300.0).validate().unwrap_err();
/// assert!(matches!(err, EngineError::InvalidScreenParameters(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Malformed or empty input raster.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Non-monotonic curve or out-of-range separation policy.
    #[error("invalid separation profile: {0}")]
    InvalidProfile(String),

    /// Aliasing violation, bad angle, or bad method settings.
    #[error("invalid screen parameters: {0}")]
    InvalidScreenParameters(String),

    /// Channel planes that should share dimensions do not.
    #[error(
        "dimension mismatch: {channel} plane is {found_width}x{found_height}, \
         expected {expected_width}x{expected_height}"
    )]
    DimensionMismatch {
        /// The plane that disagrees with the reference plane.
        channel: Channel,
        /// Reference width.
        expected_width: usize,
        /// Reference height.
        expected_height: usize,
        /// Width of the offending plane.
        found_width: usize,
        /// Height of the offending plane.
        found_height: usize,
    },

    /// The job was cancelled through its [`CancelToken`](crate::CancelToken).
    #[error("processing cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_image_message() {
        let err = EngineError::InvalidImage("zero width".to_string());
        assert_eq!(err.to_string(), "invalid image: zero width");
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = EngineError::DimensionMismatch {
            channel: Channel::White,
            expected_width: 10,
            expected_height: 20,
            found_width: 10,
            found_height: 19,
        };
        assert_eq!(
            err.to_string(),
            "dimension mismatch: white plane is 10x19, expected 10x20"
        );
    }

    #[test]
    fn test_cancelled_message() {
        assert_eq!(EngineError::Cancelled.to_string(), "processing cancelled");
    }
}
