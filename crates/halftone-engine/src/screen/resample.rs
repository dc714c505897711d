//! Separable resampling of coverage planes to the output resolution.
//!
//! Each axis gets its own weight table: area averaging when the axis
//! shrinks, bilinear interpolation when it grows, a straight copy when the
//! size is unchanged.

use rayon::prelude::*;

use crate::api::EngineError;
use crate::raster::ChannelPlane;

/// Source taps and weights for one output sample.
type Taps = Vec<(usize, f32)>;

/// Largest plane the resampler will produce (2^30 samples, 4 GiB of `f32`).
pub const MAX_PLANE_PIXELS: usize = 1 << 30;

/// Output size for a plane of `width x height` at `src_dpi` rendered at
/// `dpi`, at least 1x1.
///
/// # Errors
///
/// [`EngineError::InvalidScreenParameters`] when the ratio is not finite or
/// the result exceeds [`MAX_PLANE_PIXELS`].
pub fn target_size(
    width: usize,
    height: usize,
    src_dpi: f64,
    dpi: f64,
) -> Result<(usize, usize), EngineError> {
    let scale = dpi / src_dpi;
    let too_large = || {
        EngineError::InvalidScreenParameters(format!(
            "resampling {width}x{height} from {src_dpi} to {dpi} DPI exceeds \
             {MAX_PLANE_PIXELS} pixels"
        ))
    };
    if !(scale.is_finite() && scale > 0.0) {
        return Err(too_large());
    }
    let scaled = |n: usize| -> Result<usize, EngineError> {
        let v = (n as f64 * scale).round().max(1.0);
        if v > MAX_PLANE_PIXELS as f64 {
            return Err(too_large());
        }
        Ok(v as usize)
    };
    let size = (scaled(width)?, scaled(height)?);
    match size.0.checked_mul(size.1) {
        Some(pixels) if pixels <= MAX_PLANE_PIXELS => Ok(size),
        _ => Err(too_large()),
    }
}

/// Bring `plane` to `dpi`.
///
/// Planes without a resolution are taken to be at `dpi` already. The
/// returned plane always carries `Some(dpi)`.
pub fn resample_to_dpi(plane: ChannelPlane, dpi: f64) -> Result<ChannelPlane, EngineError> {
    let Some(src_dpi) = plane.dpi() else {
        return Ok(plane.with_dpi(Some(dpi)));
    };
    let (width, height) = target_size(plane.width(), plane.height(), src_dpi, dpi)?;
    if (width, height) == (plane.width(), plane.height()) {
        return Ok(plane.with_dpi(Some(dpi)));
    }
    tracing::debug!(
        channel = %plane.channel(),
        from_width = plane.width(),
        from_height = plane.height(),
        width,
        height,
        "resampling plane"
    );
    Ok(resample(&plane, width, height).with_dpi(Some(dpi)))
}

/// Resample `plane` to exactly `width x height`.
pub fn resample(plane: &ChannelPlane, width: usize, height: usize) -> ChannelPlane {
    let src_w = plane.width();
    let src_h = plane.height();
    let x_taps = axis_taps(src_w, width);
    let y_taps = axis_taps(src_h, height);

    // Horizontal pass: src_h rows of `width`.
    let mut horizontal = vec![0.0f32; src_h * width];
    horizontal
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, out)| {
            let row = plane.row(y);
            for (o, taps) in out.iter_mut().zip(&x_taps) {
                *o = taps.iter().map(|&(i, w)| row[i] * w).sum();
            }
        });

    // Vertical pass.
    let mut data = vec![0.0f32; width * height];
    data.par_chunks_mut(width)
        .zip(y_taps.par_iter())
        .for_each(|(out, taps)| {
            for (x, o) in out.iter_mut().enumerate() {
                let v: f32 = taps
                    .iter()
                    .map(|&(sy, w)| horizontal[sy * width + x] * w)
                    .sum();
                *o = v.clamp(0.0, 1.0);
            }
        });

    ChannelPlane::from_raw(plane.channel(), width, height, plane.dpi(), data)
}

fn axis_taps(src: usize, dst: usize) -> Vec<Taps> {
    if src == dst {
        (0..dst).map(|i| vec![(i, 1.0)]).collect()
    } else if dst < src {
        area_taps(src, dst)
    } else {
        bilinear_taps(src, dst)
    }
}

/// Each output sample averages the source interval it covers.
fn area_taps(src: usize, dst: usize) -> Vec<Taps> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|i| {
            let start = i as f64 * scale;
            let end = start + scale;
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src);
            (first..last)
                .filter_map(|s| {
                    let overlap = (end.min(s as f64 + 1.0) - start.max(s as f64)).max(0.0);
                    (overlap > 0.0).then(|| (s, (overlap / scale) as f32))
                })
                .collect()
        })
        .collect()
}

/// Pixel-centre aligned linear interpolation, edges clamped.
fn bilinear_taps(src: usize, dst: usize) -> Vec<Taps> {
    let scale = src as f64 / dst as f64;
    let max = (src - 1) as f64;
    (0..dst)
        .map(|i| {
            let pos = ((i as f64 + 0.5) * scale - 0.5).clamp(0.0, max);
            let i0 = pos.floor() as usize;
            let i1 = (i0 + 1).min(src - 1);
            let t = (pos - i0 as f64) as f32;
            if i1 == i0 || t == 0.0 {
                vec![(i0, 1.0)]
            } else {
                vec![(i0, 1.0 - t), (i1, t)]
            }
        })
        .collect()
}
