//! Channel compositor: checks plane geometry and renders the preview.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::inks::{ideal_inks, ink_filter};
use super::ProcessingResult;
use crate::api::EngineError;
use crate::color::Srgb;
use crate::raster::{ChannelPlane, ChannelSet, PixelFormat, RasterImage};

/// How the preview simulates the print.
///
/// The substrate is the white ink colour where white prints and the
/// `backdrop` (film or garment) elsewhere; each process ink then filters the
/// substrate by `1 - coverage * (1 - ink)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewOptions {
    pub backdrop: Srgb,
    pub inks: ChannelSet<Srgb>,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            backdrop: Srgb::WHITE,
            inks: ideal_inks(),
        }
    }
}

impl PreviewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Garment or film colour seen where no white prints.
    pub fn backdrop(mut self, color: Srgb) -> Self {
        self.backdrop = color;
        self
    }

    /// Measured ink colours.
    pub fn inks(mut self, inks: ChannelSet<Srgb>) -> Self {
        self.inks = inks;
        self
    }
}

/// Assemble screened planes into a [`ProcessingResult`] with a default
/// preview (ideal inks on white).
///
/// # Errors
///
/// [`EngineError::DimensionMismatch`] unless all five planes share one size.
pub fn compose(planes: ChannelSet<ChannelPlane>) -> Result<ProcessingResult, EngineError> {
    compose_with(planes, &PreviewOptions::default())
}

/// [`compose`] with explicit preview options.
pub fn compose_with(
    planes: ChannelSet<ChannelPlane>,
    options: &PreviewOptions,
) -> Result<ProcessingResult, EngineError> {
    let (width, height) = planes.check_dimensions()?;
    let preview = render_preview(&planes, width, height, options)?;
    Ok(ProcessingResult::new(planes, preview))
}

fn render_preview(
    planes: &ChannelSet<ChannelPlane>,
    width: usize,
    height: usize,
    options: &PreviewOptions,
) -> Result<RasterImage, EngineError> {
    let backdrop = options.backdrop.to_array();
    let white_ink = options.inks.white.to_array();
    let process = [
        (&planes.cyan, options.inks.cyan.to_array()),
        (&planes.magenta, options.inks.magenta.to_array()),
        (&planes.yellow, options.inks.yellow.to_array()),
        (&planes.black, options.inks.black.to_array()),
    ];

    let mut data = vec![0u8; width * height * 3];
    data.par_chunks_mut(width * 3)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(3).enumerate() {
                let i = y * width + x;
                let w = planes.white.data()[i];
                let mut rgb = [0.0f32; 3];
                for c in 0..3 {
                    rgb[c] = w * white_ink[c] + (1.0 - w) * backdrop[c];
                }
                for (plane, ink) in &process {
                    let filter = ink_filter(*ink, plane.data()[i]);
                    for c in 0..3 {
                        rgb[c] *= filter[c];
                    }
                }
                let bytes = Srgb::new(rgb[0], rgb[1], rgb[2]).to_bytes();
                px.copy_from_slice(&bytes);
            }
        });

    let preview = RasterImage::new(width, height, PixelFormat::Rgb8, data)?;
    match planes.cyan.dpi() {
        Some(dpi) => preview.with_dpi(dpi),
        None => Ok(preview),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Channel;

    fn planes(c: f32, m: f32, y: f32, k: f32, w: f32) -> ChannelSet<ChannelPlane> {
        let values = ChannelSet::from_array([c, m, y, k, w]);
        ChannelSet::from_fn(|ch| ChannelPlane::filled(ch, 2, 2, values[ch]))
    }

    #[test]
    fn test_preview_inverts_ideal_separation() {
        let result = compose(planes(1.0, 0.0, 0.0, 0.0, 1.0)).unwrap();
        assert_eq!(result.preview().pixel_rgba(0, 0), [0, 255, 255, 255]);

        let result = compose(planes(0.0, 0.0, 0.0, 1.0, 1.0)).unwrap();
        assert_eq!(result.preview().pixel_rgba(1, 1), [0, 0, 0, 255]);

        let result = compose(planes(0.0, 0.0, 0.0, 0.0, 0.0)).unwrap();
        assert_eq!(result.preview().pixel_rgba(1, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_backdrop_shows_without_white() {
        let options = PreviewOptions::new().backdrop(Srgb::from_u8(0, 0, 128));
        let no_white = compose_with(planes(0.0, 0.0, 0.0, 0.0, 0.0), &options).unwrap();
        assert_eq!(no_white.preview().pixel_rgba(0, 0), [0, 0, 128, 255]);

        let with_white = compose_with(planes(0.0, 0.0, 0.0, 0.0, 1.0), &options).unwrap();
        assert_eq!(with_white.preview().pixel_rgba(0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut set = planes(0.0, 0.0, 0.0, 0.0, 0.0);
        set.magenta = ChannelPlane::filled(Channel::Magenta, 3, 2, 0.0);
        let err = compose(set).unwrap_err();
        assert!(matches!(
            err,
            EngineError::DimensionMismatch {
                channel: Channel::Magenta,
                expected_width: 2,
                found_width: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_lookup_by_name() {
        let result = compose(planes(0.0, 1.0, 0.0, 0.0, 0.0)).unwrap();
        assert_eq!(result.get_by_name("magenta").unwrap().get(0, 0), 1.0);
        assert_eq!(result.get_by_name("Magenta").unwrap().channel(), Channel::Magenta);
        assert!(result.get_by_name("preview").is_none());
        assert_eq!(result.dpi(), None);
    }
}
