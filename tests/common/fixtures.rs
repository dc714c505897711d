//! Test fixtures: small input images written to temporary directories.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};

/// Channel names in export order.
pub const CHANNEL_NAMES: [&str; 5] = ["cyan", "magenta", "yellow", "black", "white"];

/// Write a solid-colour PNG and return its path.
pub fn solid_png(dir: &Path, name: &str, size: u32, rgba: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(size, size, Rgba(rgba))
        .save(&path)
        .expect("Should write fixture PNG");
    path
}

/// A logo-like image: dark square on a transparent background with a thin
/// red outline.
pub fn logo_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let image = RgbaImage::from_fn(48, 32, |x, y| {
        if (8..40).contains(&x) && (6..26).contains(&y) {
            if x == 8 || x == 39 || y == 6 || y == 25 {
                Rgba([220, 20, 20, 255])
            } else {
                Rgba([30, 30, 60, 255])
            }
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    image.save(&path).expect("Should write fixture PNG");
    path
}

/// Expected export file names for `name`.
pub fn expected_files(dir: &Path, name: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = CHANNEL_NAMES
        .iter()
        .map(|c| dir.join(format!("{name}_{c}.tiff")))
        .collect();
    files.push(dir.join(format!("{name}_preview.png")));
    files
}
