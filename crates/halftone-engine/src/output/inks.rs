//! Ink colours for the on-screen proof.

use crate::color::Srgb;
use crate::raster::{Channel, ChannelSet};

/// Textbook process inks: each ink absorbs exactly its complementary
/// primary, white ink is pure white.
pub fn ideal_inks() -> ChannelSet<Srgb> {
    ChannelSet::from_fn(|channel| match channel {
        Channel::Cyan => Srgb::new(0.0, 1.0, 1.0),
        Channel::Magenta => Srgb::new(1.0, 0.0, 1.0),
        Channel::Yellow => Srgb::new(1.0, 1.0, 0.0),
        Channel::Black => Srgb::BLACK,
        Channel::White => Srgb::WHITE,
    })
}

/// Transmission of an ink layer at `coverage`: `1 - coverage * (1 - ink)`
/// per component.
#[inline]
pub(crate) fn ink_filter(ink: [f32; 3], coverage: f32) -> [f32; 3] {
    ink.map(|c| 1.0 - coverage * (1.0 - c))
}
