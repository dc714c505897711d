//! File export of a finished job: one 8-bit TIFF per ink and a PNG preview.
//!
//! TIFF samples are coverage * 255, so 255 means full ink. Each file carries
//! the screening resolution in its resolution tags.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use halftone_engine::{Channel, ChannelPlane, ProcessingResult, RasterImage};
use tiff::encoder::compression::{Compression, Lzw, Uncompressed};
use tiff::encoder::{colortype, Rational, TiffEncoder};
use tiff::tags::ResolutionUnit;

use crate::error::JobError;
use crate::models::TiffCompression;

/// Resolution tags store DPI as a fraction over this denominator.
const RESOLUTION_DENOMINATOR: u32 = 100;

const METERS_PER_INCH: f64 = 0.0254;

/// Path of the TIFF written for `channel`.
pub fn channel_path(dir: &Path, name: &str, channel: Channel) -> PathBuf {
    dir.join(format!("{name}_{channel}.tiff"))
}

pub fn preview_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}_preview.png"))
}

/// Write all five separations and the preview into `dir`.
///
/// Returns the written paths in channel order, preview last.
pub fn export(
    result: &ProcessingResult,
    dir: &Path,
    name: &str,
    compression: TiffCompression,
) -> Result<Vec<PathBuf>, JobError> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(Channel::ALL.len() + 1);
    for channel in Channel::ALL {
        let path = channel_path(dir, name, channel);
        let plane = result.plane(channel);
        match compression {
            TiffCompression::Lzw => write_tiff(&path, plane, Lzw::default())?,
            TiffCompression::None => write_tiff(&path, plane, Uncompressed)?,
        }
        written.push(path);
    }

    let path = preview_path(dir, name);
    write_png(&path, result.preview())?;
    written.push(path);

    tracing::info!(dir = %dir.display(), files = written.len(), "Exported separations");
    Ok(written)
}

fn dimensions(width: usize, height: usize) -> Result<(u32, u32), JobError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(JobError::ImageTooLarge { width, height }),
    }
}

fn write_tiff<C: Compression>(
    path: &Path,
    plane: &ChannelPlane,
    compression: C,
) -> Result<(), JobError> {
    let (width, height) = dimensions(plane.width(), plane.height())?;
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = TiffEncoder::new(file)?;
    let mut image =
        encoder.new_image_with_compression::<colortype::Gray8, _>(width, height, compression)?;
    if let Some(dpi) = plane.dpi() {
        let n = (dpi * RESOLUTION_DENOMINATOR as f64).round() as u32;
        image.resolution(
            ResolutionUnit::Inch,
            Rational {
                n,
                d: RESOLUTION_DENOMINATOR,
            },
        );
    }
    image.write_data(&plane.to_gray8())?;
    tracing::debug!(path = %path.display(), coverage = plane.coverage(), "Wrote TIFF");
    Ok(())
}

fn write_png(path: &Path, preview: &RasterImage) -> Result<(), JobError> {
    let (width, height) = dimensions(preview.width(), preview.height())?;
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(file, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Fast);
    if let Some(dpi) = preview.dpi() {
        let ppm = (dpi / METERS_PER_INCH).round() as u32;
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
    }
    let mut writer = encoder.write_header()?;
    writer.write_image_data(preview.data())?;
    writer.finish()?;
    Ok(())
}
