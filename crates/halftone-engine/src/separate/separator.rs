//! RGB(A) to CMYK+W separation.
//!
//! Per pixel, with R, G, B in `0.0..=1.0`:
//!
//! 1. gray component `K0 = 1 - max(R, G, B)`;
//! 2. black generation `K = bg(K0)`;
//! 3. under-colour removal `u = min(ucr(K), K0)`, then `C = (1 - R - u) / (1 - u)`
//!    (same for M, Y), with C = M = Y = 0 when `u` reaches 1; without
//!    rescaling the removal is the plain `C = 1 - R - u`;
//! 4. optional dot-gain pre-compensation on C, M, Y, K;
//! 5. optional total ink limit, scaling C, M, Y, K together;
//! 6. white from the [`WhitePolicy`];
//! 7. every coverage multiplied by alpha.
//!
//! With both curves at identity step 3 reduces to the textbook
//! `C = (1 - R - K) / (1 - K)`.

use rayon::prelude::*;

use super::{SeparationProfile, ToneCurve, WhitePolicy};
use crate::api::{CancelToken, EngineError, ROW_BATCH};
use crate::color::{luminance, Cmyk};
use crate::raster::{Channel, ChannelPlane, ChannelSet, RasterImage};

/// `u` at or above this is treated as full removal.
const FULL_REMOVAL: f32 = 1.0 - 1e-6;

/// Resolved per-job inputs of the pixel transform.
struct PixelTransform<'a> {
    black_generation: &'a ToneCurve,
    under_color_removal: &'a ToneCurve,
    rescale: bool,
    dot_gain: Option<ToneCurve>,
    ink_limit: Option<f32>,
    white: WhitePolicy,
}

impl<'a> PixelTransform<'a> {
    fn new(profile: &'a SeparationProfile) -> Result<Self, EngineError> {
        Ok(Self {
            black_generation: profile.black_generation_curve(),
            under_color_removal: profile.under_color_removal_curve(),
            rescale: profile.rescales_after_removal(),
            dot_gain: profile.dot_gain_curve()?,
            ink_limit: profile.ink_limit(),
            white: profile.white_policy(),
        })
    }

    /// Coverages `[C, M, Y, K, W]` for one pixel.
    ///
    /// `on_edge` is only consulted by [`WhitePolicy::EdgeEnhanced`].
    fn apply(&self, rgb: [f32; 3], alpha: f32, on_edge: bool) -> [f32; 5] {
        let [r, g, b] = rgb;
        let gray = Cmyk::gray_component(rgb);
        let k = self.black_generation.apply(gray);
        let u = self.under_color_removal.apply(k).min(gray);

        let mut ink = if !self.rescale {
            Cmyk::new(1.0 - r - u, 1.0 - g - u, 1.0 - b - u, k)
        } else if u >= FULL_REMOVAL {
            Cmyk::new(0.0, 0.0, 0.0, k)
        } else {
            let remove = |primary: f32| (1.0 - primary - u) / (1.0 - u);
            Cmyk::new(remove(r), remove(g), remove(b), k)
        }
        .clamped();

        if let Some(curve) = &self.dot_gain {
            ink = ink.map(|v| curve.apply(v));
        }
        if let Some(limit) = self.ink_limit {
            let total = ink.sum();
            if total > limit {
                ink = ink.scale(limit / total);
            }
        }

        let mean = (r + g + b) / 3.0;
        let white = match self.white {
            WhitePolicy::Full => 1.0,
            WhitePolicy::Knockout => 1.0 - ink.max(),
            WhitePolicy::None => 0.0,
            WhitePolicy::Underbase { threshold } => solid(mean < threshold),
            WhitePolicy::Density => 1.0 - mean,
            WhitePolicy::EdgeEnhanced { threshold, .. } => solid(mean < threshold || on_edge),
        };

        let [c, m, y, k] = ink.to_array();
        [c, m, y, k, white].map(|v| (v * alpha).clamp(0.0, 1.0))
    }
}

#[inline]
fn solid(on: bool) -> f32 {
    if on {
        1.0
    } else {
        0.0
    }
}

#[inline]
fn normalised_pixel(image: &RasterImage, x: usize, y: usize) -> ([f32; 3], f32) {
    let [r, g, b, a] = image.pixel_rgba(x, y);
    (
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0],
        a as f32 / 255.0,
    )
}

/// Split `image` into five coverage planes.
///
/// # Errors
///
/// - [`EngineError::InvalidImage`] for a zero-sized image.
/// - [`EngineError::InvalidProfile`] when `profile` fails validation.
pub fn separate(
    image: &RasterImage,
    profile: &SeparationProfile,
) -> Result<ChannelSet<ChannelPlane>, EngineError> {
    separate_with(image, profile, &CancelToken::new())
}

/// [`separate`] with cooperative cancellation.
///
/// Rows are processed in parallel batches; `cancel` is polled before each
/// batch.
pub fn separate_with(
    image: &RasterImage,
    profile: &SeparationProfile,
    cancel: &CancelToken,
) -> Result<ChannelSet<ChannelPlane>, EngineError> {
    if image.is_empty() {
        return Err(EngineError::InvalidImage(format!(
            "image has zero dimension ({}x{})",
            image.width(),
            image.height()
        )));
    }
    profile.validate()?;
    cancel.check()?;

    let width = image.width();
    let height = image.height();
    let transform = PixelTransform::new(profile)?;

    let edges = match profile.white_policy() {
        WhitePolicy::EdgeEnhanced { edge_threshold, .. } => {
            Some(edge_mask(image, edge_threshold, cancel)?)
        }
        _ => None,
    };
    debug_assert_eq!(edges.is_some(), profile.white_policy().needs_neighbourhood());

    let mut pixels = vec![[0.0f32; 5]; width * height];
    pixels
        .par_chunks_mut(width * ROW_BATCH)
        .enumerate()
        .try_for_each(|(batch, chunk)| -> Result<(), EngineError> {
            cancel.check()?;
            let first_row = batch * ROW_BATCH;
            for (i, out) in chunk.iter_mut().enumerate() {
                let x = i % width;
                let y = first_row + i / width;
                let (rgb, alpha) = normalised_pixel(image, x, y);
                let on_edge = edges.as_ref().is_some_and(|m| m[y * width + x]);
                *out = transform.apply(rgb, alpha, on_edge);
            }
            Ok(())
        })?;

    let planes = ChannelSet::from_fn(|channel| {
        let index = usize::from(channel);
        let data = pixels.iter().map(|p| p[index]).collect();
        ChannelPlane::from_raw(channel, width, height, image.dpi(), data)
    });

    tracing::debug!(
        width,
        height,
        white = ?profile.white_policy(),
        black = planes[Channel::Black].coverage(),
        "separated image"
    );
    Ok(planes)
}

/// One-pixel-dilated Sobel edge mask of luminance.
///
/// Gradient magnitude is divided by 4 so a full black/white step reads as
/// 1.0; borders replicate the outermost pixels.
fn edge_mask(
    image: &RasterImage,
    edge_threshold: f32,
    cancel: &CancelToken,
) -> Result<Vec<bool>, EngineError> {
    let width = image.width();
    let height = image.height();

    let luma: Vec<f32> = (0..width * height)
        .into_par_iter()
        .map(|i| luminance(normalised_pixel(image, i % width, i / width).0))
        .collect();
    cancel.check()?;

    let at = |x: isize, y: isize| -> f32 {
        let x = x.clamp(0, width as isize - 1) as usize;
        let y = y.clamp(0, height as isize - 1) as usize;
        luma[y * width + x]
    };

    let mut raw = vec![false; width * height];
    raw.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as isize;
            for (x, out) in row.iter_mut().enumerate() {
                let x = x as isize;
                let gx = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1));
                let gy = (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2.0 * at(x, y - 1) + at(x + 1, y - 1));
                let magnitude = (gx * gx + gy * gy).sqrt() / 4.0;
                *out = magnitude > edge_threshold;
            }
        });
    cancel.check()?;

    // 3x3 dilation
    let mut dilated = vec![false; width * height];
    dilated
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let y0 = y.saturating_sub(1);
            let y1 = (y + 1).min(height - 1);
            for (x, out) in row.iter_mut().enumerate() {
                let x0 = x.saturating_sub(1);
                let x1 = (x + 1).min(width - 1);
                *out = (y0..=y1).any(|yy| raw[yy * width + x0..=yy * width + x1].contains(&true));
            }
        });

    Ok(dilated)
}
