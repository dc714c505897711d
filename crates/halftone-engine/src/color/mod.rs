//! Color types used by separation and preview.
//!
//! - [`Srgb`]: display colours for the preview backdrop and ink swatches.
//! - [`Cmyk`]: per-pixel process-ink coverages produced by the separator.
//!
//! # Example
//!
//! ```
//! use halftone_engine::{Cmyk, Srgb};
//!
//! let orange = Srgb::from_u8(255, 128, 0);
//! let gray = Cmyk::gray_component(orange.to_array());
//! assert_eq!(gray, 0.0);
//! ```

mod cmyk;
mod srgb;

pub use cmyk::Cmyk;
pub use srgb::{ParseColorError, Srgb};

/// Rec. 601 luma of an RGB triple in `0.0..=1.0`.
#[inline]
pub fn luminance(rgb: [f32; 3]) -> f32 {
    0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2]
}
