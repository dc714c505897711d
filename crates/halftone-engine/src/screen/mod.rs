//! Halftone screening of continuous-tone coverage planes.
//!
//! # Methods
//!
//! - **Ordered** (AM): rotated clustered dots, one angle per channel. See
//!   [`RotatedScreen`].
//! - **Error diffusion** (FM): Floyd–Steinberg by default, seven other
//!   kernels selectable through [`DiffusionKernel`].
//! - **Stochastic** (FM): a hashed, rank-normalised threshold tile.
//! - **Hybrid**: error diffusion in highlights and shadows, ordered dots in
//!   the midtones.
//!
//! Every method produces values from the level set `k / (levels - 1)`; with
//! the default two levels the output is binary. Planes carrying a DPI that
//! differs from the target are resampled first.
//!
//! # Example
//!
//! ```
//! use halftone_engine::{screen, Channel, ChannelPlane, ScreenParameters};
//!
//! let plane = ChannelPlane::filled(Channel::Black, 100, 100, 0.5);
//! let params = ScreenParameters::new(300.0, 60.0);
//! let screened = screen(plane, &params).unwrap();
//! assert!(screened.is_binary());
//! assert!((screened.coverage() - 0.5).abs() < 0.02);
//! ```

mod diffusion;
mod hybrid;
pub mod kernel;
mod ordered;
mod params;
mod quantize;
mod resample;
mod stochastic;
mod threshold;

pub use params::{DiffusionKernel, DotShape, Noise, ScreenMethod, ScreenParameters};
pub use quantize::quantize;
pub use resample::{resample, resample_to_dpi, target_size, MAX_PLANE_PIXELS};
pub use stochastic::stochastic_threshold;
pub use threshold::{cell_position, screen_threshold, RotatedScreen};

use crate::api::{CancelToken, EngineError};
use crate::raster::ChannelPlane;

/// Screen one plane.
///
/// # Errors
///
/// - [`EngineError::InvalidScreenParameters`] when `params` fail validation
///   or resampling to `params.dpi` would exceed [`MAX_PLANE_PIXELS`].
/// - [`EngineError::InvalidImage`] for a zero-sized plane.
pub fn screen(plane: ChannelPlane, params: &ScreenParameters) -> Result<ChannelPlane, EngineError> {
    screen_with(plane, params, &CancelToken::new())
}

/// [`screen`] with cooperative cancellation.
pub fn screen_with(
    plane: ChannelPlane,
    params: &ScreenParameters,
    cancel: &CancelToken,
) -> Result<ChannelPlane, EngineError> {
    params.validate()?;
    if plane.width() == 0 || plane.height() == 0 {
        return Err(EngineError::InvalidImage(format!(
            "{} plane has zero dimension ({}x{})",
            plane.channel(),
            plane.width(),
            plane.height()
        )));
    }
    cancel.check()?;

    let plane = resample_to_dpi(plane, params.dpi)?;
    let data = match params.method {
        ScreenMethod::Ordered => ordered::screen_ordered(&plane, params, cancel)?,
        ScreenMethod::ErrorDiffusion { kernel } => {
            diffusion::diffuse(&plane, kernel.kernel(), params, cancel)?
        }
        ScreenMethod::Stochastic => ordered::screen_stochastic(&plane, params, cancel)?,
        ScreenMethod::Hybrid {
            highlight,
            shadow,
            kernel,
        } => hybrid::screen_hybrid(&plane, params, highlight, shadow, kernel, cancel)?,
    };

    let screened = ChannelPlane::from_raw(
        plane.channel(),
        plane.width(),
        plane.height(),
        Some(params.dpi),
        data,
    );
    tracing::debug!(
        channel = %screened.channel(),
        method = %params.method,
        width = screened.width(),
        height = screened.height(),
        coverage = screened.coverage(),
        "screened plane"
    );
    Ok(screened)
}
