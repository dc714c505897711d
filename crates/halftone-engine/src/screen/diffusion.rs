//! Error diffusion (FM) screening.
//!
//! Strictly sequential within a plane: every pixel depends on the error left
//! by the pixels before it. Parallelism comes from screening the five
//! channels concurrently.

use super::kernel::Kernel;
use super::quantize::{quantize, RowJitter};
use super::ScreenParameters;
use crate::api::{CancelToken, EngineError, ROW_BATCH};
use crate::raster::ChannelPlane;

/// Sliding window of error rows.
///
/// Holds only the rows the kernel can reach (`max_dy + 1`), not a
/// full-image buffer. `rows[0]` is the current row.
#[derive(Debug)]
pub(crate) struct ErrorBuffer {
    rows: Vec<Vec<f32>>,
    width: usize,
}

impl ErrorBuffer {
    pub(crate) fn new(width: usize, row_depth: usize) -> Self {
        Self {
            rows: vec![vec![0.0; width]; row_depth],
            width,
        }
    }

    /// Error accumulated so far for column `x` of the current row.
    #[inline]
    pub(crate) fn get_accumulated(&self, x: usize) -> f32 {
        self.rows[0][x]
    }

    /// Add error to column `x`, `row_offset` rows below the current one.
    /// Targets outside the window are skipped.
    #[inline]
    pub(crate) fn add_error(&mut self, x: usize, row_offset: usize, error: f32) {
        if x < self.width && row_offset < self.rows.len() {
            self.rows[row_offset][x] += error;
        }
    }

    /// Drop the current row and open a zeroed one at the bottom.
    pub(crate) fn advance_row(&mut self) {
        self.rows.rotate_left(1);
        if let Some(last) = self.rows.last_mut() {
            last.fill(0.0);
        }
    }
}

/// Diffuse `plane` with `kernel`.
///
/// Accumulated values are clamped to `[-error_clamp, 1 + error_clamp]`.
/// With noise enabled the jitter moves the quantisation threshold only; the
/// diffused error is always measured against the un-jittered value.
pub(crate) fn diffuse(
    plane: &ChannelPlane,
    kernel: &Kernel,
    params: &ScreenParameters,
    cancel: &CancelToken,
) -> Result<Vec<f32>, EngineError> {
    let width = plane.width();
    let height = plane.height();
    let mut output = vec![0.0f32; width * height];
    let mut errors = ErrorBuffer::new(width, kernel.max_dy + 1);
    let divisor = kernel.divisor as f32;
    let clamp = params.error_clamp;

    for y in 0..height {
        if y % ROW_BATCH == 0 {
            cancel.check()?;
        }
        let reverse = params.serpentine && y % 2 == 1;
        let mut jitter = RowJitter::new(params.noise, plane.channel(), y);
        let row = plane.row(y);

        for i in 0..width {
            let x = if reverse { width - 1 - i } else { i };
            let value = (row[x] + errors.get_accumulated(x)).clamp(-clamp, 1.0 + clamp);
            let level = quantize(value, jitter.apply(0.5), params.levels);
            output[y * width + x] = level;

            let error = value - level;
            if error == 0.0 {
                continue;
            }
            for &(dx, dy, weight) in kernel.entries {
                let dx = if reverse { -dx } else { dx };
                let nx = x as i64 + dx as i64;
                if nx < 0 || y + dy >= height {
                    continue;
                }
                errors.add_error(nx as usize, dy, error * weight as f32 / divisor);
            }
        }
        errors.advance_row();
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Channel;
    use crate::screen::{kernel, ScreenParameters};

    fn params() -> ScreenParameters {
        ScreenParameters::new(300.0, 60.0)
    }

    #[test]
    fn test_error_buffer_rotation() {
        let mut buf = ErrorBuffer::new(3, 2);
        buf.add_error(1, 0, 0.25);
        buf.add_error(2, 1, 0.5);
        buf.add_error(5, 0, 1.0);
        buf.add_error(0, 2, 1.0);
        assert_eq!(buf.get_accumulated(1), 0.25);
        buf.advance_row();
        assert_eq!(buf.get_accumulated(1), 0.0);
        assert_eq!(buf.get_accumulated(2), 0.5);
        buf.advance_row();
        assert_eq!(buf.get_accumulated(2), 0.0);
    }

    #[test]
    fn test_mean_is_preserved() {
        let plane = ChannelPlane::filled(Channel::Cyan, 64, 64, 0.3);
        let out = diffuse(&plane, &kernel::FLOYD_STEINBERG, &params(), &CancelToken::new())
            .unwrap();
        let mean = out.iter().sum::<f32>() / out.len() as f32;
        assert!((mean - 0.3).abs() < 0.02, "mean {mean}");
        assert!(out.iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_serpentine_changes_pattern_not_tone() {
        let plane = ChannelPlane::filled(Channel::Cyan, 32, 32, 0.37);
        let cancel = CancelToken::new();
        let a = diffuse(&plane, &kernel::FLOYD_STEINBERG, &params(), &cancel).unwrap();
        let b = diffuse(
            &plane,
            &kernel::FLOYD_STEINBERG,
            &params().serpentine(false),
            &cancel,
        )
        .unwrap();
        assert_ne!(a, b);
        let mean = |v: &[f32]| v.iter().sum::<f32>() / v.len() as f32;
        assert!((mean(&a) - mean(&b)).abs() < 0.02);
    }

    #[test]
    fn test_single_pixel() {
        let plane = ChannelPlane::filled(Channel::Black, 1, 1, 0.7);
        let out = diffuse(&plane, &kernel::JARVIS_JUDICE_NINKE, &params(), &CancelToken::new())
            .unwrap();
        assert_eq!(out, vec![1.0]);
    }

    #[test]
    fn test_multilevel_output() {
        let plane = ChannelPlane::filled(Channel::Yellow, 16, 16, 0.5);
        let out = diffuse(
            &plane,
            &kernel::SIERRA_LITE,
            &params().levels(3),
            &CancelToken::new(),
        )
        .unwrap();
        // 0.5 sits exactly on the middle level.
        assert!(out.iter().all(|&v| v == 0.5));
    }
}
