//! Hybrid AM/FM screening.
//!
//! Clustered dots hold up poorly at the extremes: tiny highlight dots do not
//! transfer and shadow holes fill in. The hybrid screen switches to error
//! diffusion there and keeps the rotated screen for midtones.

use super::diffusion::diffuse;
use super::ordered::screen_ordered;
use super::{DiffusionKernel, ScreenParameters};
use crate::api::{CancelToken, EngineError};
use crate::raster::ChannelPlane;

/// Per pixel: error diffusion where `tone < highlight` or `tone > shadow`,
/// the rotated screen elsewhere.
///
/// The diffusion runs over the whole plane so its error field stays
/// continuous across tonal boundaries.
pub(crate) fn screen_hybrid(
    plane: &ChannelPlane,
    params: &ScreenParameters,
    highlight: f32,
    shadow: f32,
    kernel: DiffusionKernel,
    cancel: &CancelToken,
) -> Result<Vec<f32>, EngineError> {
    let (fm, am) = rayon::join(
        || diffuse(plane, kernel.kernel(), params, cancel),
        || screen_ordered(plane, params, cancel),
    );
    let (fm, am) = (fm?, am?);

    Ok(plane
        .data()
        .iter()
        .zip(fm.into_iter().zip(am))
        .map(|(&tone, (fm, am))| {
            if tone < highlight || tone > shadow {
                fm
            } else {
                am
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Channel;
    use crate::screen::ScreenMethod;

    #[test]
    fn test_regions_follow_their_method() {
        // Left half highlight (FM), right half midtone (AM).
        let width = 40;
        let height = 20;
        let data: Vec<f32> = (0..width * height)
            .map(|i| if i % width < width / 2 { 0.1 } else { 0.5 })
            .collect();
        let plane = ChannelPlane::from_vec(Channel::Black, width, height, data).unwrap();
        let params = ScreenParameters::new(300.0, 60.0).method(ScreenMethod::hybrid());
        let cancel = CancelToken::new();

        let hybrid = screen_hybrid(
            &plane,
            &params,
            0.2,
            0.8,
            DiffusionKernel::FloydSteinberg,
            &cancel,
        )
        .unwrap();
        let fm = diffuse(&plane, DiffusionKernel::FloydSteinberg.kernel(), &params, &cancel)
            .unwrap();
        let am = screen_ordered(&plane, &params, &cancel).unwrap();

        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                let expected = if x < width / 2 { fm[i] } else { am[i] };
                assert_eq!(hybrid[i], expected, "pixel ({x}, {y})");
            }
        }
    }
}
