#![allow(clippy::needless_range_loop, clippy::manual_range_contains)]

//! halftone-engine: CMYK + White separation and screening for DTF printing
//!
//! Direct-to-film printers lay down cyan, magenta, yellow and black on a
//! transparent film and back them with a white underbase. This crate turns
//! an RGB(A) raster into the five screened ink films plus an RGB proof.
//!
//! # Quick Start
//!
//! The [`HalftoneEngine`] builder is the primary entry point:
//!
//! ```
//! use halftone_engine::{
//!     Channel, HalftoneEngine, PixelFormat, RasterImage, ScreenParameters, SeparationProfile,
//!     WhitePolicy,
//! };
//!
//! let profile = SeparationProfile::new().white(WhitePolicy::Knockout);
//! let params = ScreenParameters::new(300.0, 60.0);
//! let engine = HalftoneEngine::new(profile, params).unwrap();
//!
//! let image = RasterImage::new(2, 1, PixelFormat::Rgb8, vec![255, 0, 0, 0, 0, 255]).unwrap();
//! let result = engine.process(&image).unwrap();
//!
//! assert!(result.plane(Channel::Cyan).is_binary());
//! assert_eq!(result.get_by_name("white").unwrap().width(), 2);
//! ```
//!
//! # Pipeline
//!
//! 1. **Separation** ([`separate`]): per pixel, black is generated from the
//!    gray component through a [`ToneCurve`], under-colour removal takes the
//!    matching amount out of C/M/Y, optional dot-gain compensation and total
//!    ink limiting follow, and a [`WhitePolicy`] derives the underbase.
//!    Alpha scales all five inks.
//! 2. **Screening** ([`screen`]): each plane is resampled to the output DPI
//!    and converted into dots by one of the [`ScreenMethod`]s. The five
//!    channels are screened concurrently.
//! 3. **Compositing** ([`compose`]): plane sizes are checked and an RGB
//!    preview is rendered from the screened films.
//!
//! The stages are also usable on their own.
//!
//! # Screen angles
//!
//! Clustered-dot screens use one angle per ink so that the dot rows of
//! different inks do not interfere. Defaults are C 15°, M 75°, Y 0°, K 45°
//! and W 30°.
//!
//! # Concurrency
//!
//! Separation and threshold screens run row-parallel on the rayon pool;
//! error diffusion is sequential within a plane. Long jobs can be stopped
//! through a [`CancelToken`]; a cancelled job returns
//! [`EngineError::Cancelled`] and nothing else.

pub mod api;
pub mod color;
pub mod output;
pub mod raster;
pub mod screen;
pub mod separate;


pub use api::{CancelToken, EngineError, HalftoneEngine, Stage};
pub use color::{Cmyk, ParseColorError, Srgb};
pub use output::{compose, compose_with, ideal_inks, PreviewOptions, ProcessingResult};
pub use raster::{Channel, ChannelPlane, ChannelSet, PixelFormat, RasterImage};
pub use screen::{
    cell_position, screen, screen_threshold, screen_with, DiffusionKernel, DotShape, Noise,
    RotatedScreen, ScreenMethod, ScreenParameters,
};
pub use separate::{separate, separate_with, SeparationProfile, ToneCurve, WhitePolicy};
