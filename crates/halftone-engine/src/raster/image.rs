//! Input and preview raster.

use crate::api::EngineError;

/// Pixel layout of a [`RasterImage`] buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One byte per pixel, gray level.
    Gray8,
    /// Three bytes per pixel, R G B.
    Rgb8,
    /// Four bytes per pixel, R G B A (straight alpha).
    Rgba8,
}

impl PixelFormat {
    /// Bytes per pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// An 8-bit raster with an optional source resolution.
///
/// Immutable once constructed; the engine only ever borrows it.
///
/// ```
/// use halftone_engine::{PixelFormat, RasterImage};
///
/// let image = RasterImage::new(2, 1, PixelFormat::Rgb8, vec![255, 0, 0, 0, 0, 255])
///     .unwrap()
///     .with_dpi(300.0)
///     .unwrap();
/// assert_eq!(image.pixel_rgba(1, 0), [0, 0, 255, 255]);
/// assert_eq!(image.dpi(), Some(300.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    format: PixelFormat,
    data: Vec<u8>,
    dpi: Option<f64>,
}

impl RasterImage {
    /// Wrap a pixel buffer.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidImage`] if the buffer length is not
    /// `width * height * format.channels()`.
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, EngineError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(format.channels()))
            .ok_or_else(|| {
                EngineError::InvalidImage(format!("{width}x{height} overflows buffer size"))
            })?;
        if data.len() != expected {
            return Err(EngineError::InvalidImage(format!(
                "buffer has {} bytes, expected {expected} for {width}x{height} {format:?}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            data,
            dpi: None,
        })
    }

    /// Attach a source resolution.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidImage`] unless `dpi` is positive and finite.
    pub fn with_dpi(mut self, dpi: f64) -> Result<Self, EngineError> {
        if !(dpi.is_finite() && dpi > 0.0) {
            return Err(EngineError::InvalidImage(format!(
                "resolution must be a positive number, got {dpi}"
            )));
        }
        self.dpi = Some(dpi);
        Ok(self)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn dpi(&self) -> Option<f64> {
        self.dpi
    }

    /// Raw pixel bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Whether the raster has no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel at `(x, y)` widened to RGBA.
    #[inline]
    pub fn pixel_rgba(&self, x: usize, y: usize) -> [u8; 4] {
        let n = self.format.channels();
        let i = (y * self.width + x) * n;
        let p = &self.data[i..i + n];
        match self.format {
            PixelFormat::Gray8 => [p[0], p[0], p[0], 255],
            PixelFormat::Rgb8 => [p[0], p[1], p[2], 255],
            PixelFormat::Rgba8 => [p[0], p[1], p[2], p[3]],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_length_checked() {
        assert!(RasterImage::new(2, 2, PixelFormat::Rgba8, vec![0; 16]).is_ok());
        let err = RasterImage::new(2, 2, PixelFormat::Rgb8, vec![0; 11]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidImage(_)));
    }

    #[test]
    fn test_zero_sized_image_is_constructible_but_empty() {
        let image = RasterImage::new(0, 5, PixelFormat::Gray8, vec![]).unwrap();
        assert!(image.is_empty());
    }

    #[test]
    fn test_dpi_validation() {
        let image = RasterImage::new(1, 1, PixelFormat::Gray8, vec![0]).unwrap();
        assert!(image.clone().with_dpi(0.0).is_err());
        assert!(image.clone().with_dpi(f64::NAN).is_err());
        assert_eq!(image.with_dpi(72.0).unwrap().dpi(), Some(72.0));
    }

    #[test]
    fn test_pixel_rgba_widening() {
        let gray = RasterImage::new(1, 1, PixelFormat::Gray8, vec![7]).unwrap();
        assert_eq!(gray.pixel_rgba(0, 0), [7, 7, 7, 255]);

        let rgba = RasterImage::new(1, 1, PixelFormat::Rgba8, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(rgba.pixel_rgba(0, 0), [1, 2, 3, 4]);
    }
}
