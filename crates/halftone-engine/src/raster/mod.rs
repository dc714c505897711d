//! Raster containers: the input/preview [`RasterImage`] and per-ink
//! [`ChannelPlane`]s grouped in a [`ChannelSet`].

mod image;
mod plane;

pub use image::{PixelFormat, RasterImage};
pub use plane::{Channel, ChannelPlane, ChannelSet};
