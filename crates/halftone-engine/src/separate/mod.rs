//! Colour separation of an RGB(A) raster into C, M, Y, K and W coverage
//! planes.
//!
//! - [`ToneCurve`]: monotonic piecewise-linear curves for black generation
//!   and under-colour removal.
//! - [`SeparationProfile`] and [`WhitePolicy`]: caller-supplied settings.
//! - [`separate`]: the separation itself.

mod curve;
mod profile;
mod separator;

pub use curve::ToneCurve;
pub use profile::{SeparationProfile, WhitePolicy};
pub use separator::{separate, separate_with};
