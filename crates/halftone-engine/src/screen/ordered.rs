//! Threshold-array screening: rotated clustered dots and the stochastic tile.

use rayon::prelude::*;

use super::quantize::{quantize, RowJitter};
use super::{stochastic_threshold, RotatedScreen, ScreenParameters};
use crate::api::{CancelToken, EngineError, ROW_BATCH};
use crate::raster::ChannelPlane;

/// Rotated AM screen at the plane channel's angle.
pub(crate) fn screen_ordered(
    plane: &ChannelPlane,
    params: &ScreenParameters,
    cancel: &CancelToken,
) -> Result<Vec<f32>, EngineError> {
    let angle = params.angles[plane.channel()];
    let screen = RotatedScreen::new(angle, params.cell_size(), params.dot_shape);
    threshold_rows(plane, params, cancel, |x, y| screen.threshold(x, y))
}

/// Dispersed-dot screen from the hashed tile.
pub(crate) fn screen_stochastic(
    plane: &ChannelPlane,
    params: &ScreenParameters,
    cancel: &CancelToken,
) -> Result<Vec<f32>, EngineError> {
    threshold_rows(plane, params, cancel, stochastic_threshold)
}

/// Quantise every pixel against `threshold(x, y)`, rows in parallel.
fn threshold_rows<F>(
    plane: &ChannelPlane,
    params: &ScreenParameters,
    cancel: &CancelToken,
    threshold: F,
) -> Result<Vec<f32>, EngineError>
where
    F: Fn(usize, usize) -> f32 + Sync,
{
    let width = plane.width();
    let mut output = vec![0.0f32; width * plane.height()];
    output
        .par_chunks_mut(width)
        .enumerate()
        .try_for_each(|(y, out)| -> Result<(), EngineError> {
            if y % ROW_BATCH == 0 {
                cancel.check()?;
            }
            let mut jitter = RowJitter::new(params.noise, plane.channel(), y);
            for (x, (o, &tone)) in out.iter_mut().zip(plane.row(y)).enumerate() {
                *o = quantize(tone, jitter.apply(threshold(x, y)), params.levels);
            }
            Ok(())
        })?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Channel;

    fn mean(v: &[f32]) -> f32 {
        v.iter().sum::<f32>() / v.len() as f32
    }

    #[test]
    fn test_ordered_tracks_tone() {
        let params = ScreenParameters::new(300.0, 60.0);
        let plane = ChannelPlane::filled(Channel::Magenta, 100, 100, 0.3);
        let out = screen_ordered(&plane, &params, &CancelToken::new()).unwrap();
        assert!((mean(&out) - 0.3).abs() < 0.02, "mean {}", mean(&out));
    }

    #[test]
    fn test_channels_use_their_own_angle() {
        let params = ScreenParameters::new(300.0, 60.0);
        let cancel = CancelToken::new();
        let cyan = ChannelPlane::filled(Channel::Cyan, 40, 40, 0.5);
        let black = ChannelPlane::filled(Channel::Black, 40, 40, 0.5);
        let a = screen_ordered(&cyan, &params, &cancel).unwrap();
        let b = screen_ordered(&black, &params, &cancel).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_stochastic_tracks_tone() {
        let params = ScreenParameters::new(300.0, 60.0);
        let plane = ChannelPlane::filled(Channel::Yellow, 64, 64, 0.25);
        let out = screen_stochastic(&plane, &params, &CancelToken::new()).unwrap();
        assert!((mean(&out) - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_noise_is_seed_dependent() {
        let plane = ChannelPlane::filled(Channel::Cyan, 32, 32, 0.5);
        let cancel = CancelToken::new();
        let base = ScreenParameters::new(300.0, 60.0);
        let a = screen_ordered(&plane, &base.clone().noise(0.2, 1), &cancel).unwrap();
        let b = screen_ordered(&plane, &base.clone().noise(0.2, 1), &cancel).unwrap();
        let c = screen_ordered(&plane, &base.noise(0.2, 2), &cancel).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
