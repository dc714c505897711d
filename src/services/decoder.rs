use std::path::Path;

use halftone_engine::{PixelFormat, RasterImage};
use image::DynamicImage;

use crate::error::JobError;

/// Decode an image file into an RGBA raster.
///
/// Any format the `image` crate reads is accepted; palette, gray and 16-bit
/// inputs are flattened to 8-bit RGBA. `source_dpi` tags the raster so the
/// screener resamples it to the output resolution.
pub fn decode_file(path: &Path, source_dpi: Option<f64>) -> Result<RasterImage, JobError> {
    let decoded = image::open(path).map_err(|source| JobError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let raster = from_dynamic(decoded, source_dpi)?;
    tracing::debug!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        dpi = ?raster.dpi(),
        "Decoded input image"
    );
    Ok(raster)
}

pub fn from_dynamic(image: DynamicImage, source_dpi: Option<f64>) -> Result<RasterImage, JobError> {
    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();
    let raster = RasterImage::new(
        width as usize,
        height as usize,
        PixelFormat::Rgba8,
        rgba.into_raw(),
    )?;
    match source_dpi {
        Some(dpi) => Ok(raster.with_dpi(dpi)?),
        None => Ok(raster),
    }
}
