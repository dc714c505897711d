//! Level quantisation and seeded threshold jitter shared by all screens.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Noise;
use crate::raster::Channel;

/// Values this close to a level are snapped onto it before thresholding.
const SNAP: f32 = 1e-5;

/// Jittered thresholds are kept strictly inside `(0, 1)` so solid 0 and 1
/// survive any noise amplitude.
const THRESHOLD_MIN: f32 = 1e-4;
const THRESHOLD_MAX: f32 = 1.0 - 1e-4;

/// Quantise `value` to one of `levels` evenly spaced levels.
///
/// The tone is split into `levels - 1` intervals; within an interval the
/// output moves to the upper level when the fractional position exceeds
/// `threshold`. For binary output this is simply `value > threshold`.
#[inline]
pub fn quantize(value: f32, threshold: f32, levels: u16) -> f32 {
    let steps = (levels.max(2) - 1) as f32;
    let mut scaled = value.clamp(0.0, 1.0) * steps;
    let nearest = scaled.round();
    if (scaled - nearest).abs() < SNAP {
        scaled = nearest;
    }
    let base = scaled.floor();
    let level = if scaled - base > threshold {
        base + 1.0
    } else {
        base
    };
    level.min(steps) / steps
}

/// Per-row jitter source.
///
/// Every `(seed, channel, row)` triple maps to an independent generator, so
/// parallel rows draw the same numbers regardless of scheduling.
pub(crate) struct RowJitter {
    rng: Option<(StdRng, f32)>,
}

impl RowJitter {
    pub(crate) fn new(noise: Option<Noise>, channel: Channel, row: usize) -> Self {
        let rng = noise.filter(|n| n.amplitude > 0.0).map(|n| {
            let seed = n.seed
                ^ (row as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
                ^ ((usize::from(channel) as u64 + 1) << 56);
            (StdRng::seed_from_u64(seed), n.amplitude)
        });
        Self { rng }
    }

    /// Offset a threshold by the next jitter sample.
    #[inline]
    pub(crate) fn apply(&mut self, threshold: f32) -> f32 {
        match &mut self.rng {
            Some((rng, amplitude)) => {
                let offset = rng.gen_range(-*amplitude..=*amplitude);
                (threshold + offset).clamp(THRESHOLD_MIN, THRESHOLD_MAX)
            }
            None => threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_quantize() {
        assert_eq!(quantize(0.0, 0.5, 2), 0.0);
        assert_eq!(quantize(1.0, 0.5, 2), 1.0);
        assert_eq!(quantize(0.6, 0.5, 2), 1.0);
        assert_eq!(quantize(0.4, 0.5, 2), 0.0);
        assert_eq!(quantize(0.5, 0.5, 2), 0.0);
    }

    #[test]
    fn test_multilevel_quantize() {
        // levels 0, 1/3, 2/3, 1
        assert_eq!(quantize(0.5, 0.4, 4), 2.0 / 3.0);
        assert_eq!(quantize(0.5, 0.6, 4), 1.0 / 3.0);
        assert_eq!(quantize(1.0 / 3.0, 0.0001, 4), 1.0 / 3.0);
        assert_eq!(quantize(1.0, 0.9, 4), 1.0);
    }

    #[test]
    fn test_quantize_clamps_out_of_range() {
        assert_eq!(quantize(-0.3, 0.5, 2), 0.0);
        assert_eq!(quantize(1.7, 0.5, 2), 1.0);
    }

    #[test]
    fn test_jitter_is_reproducible() {
        let noise = Some(Noise {
            amplitude: 0.2,
            seed: 42,
        });
        let mut a = RowJitter::new(noise, Channel::Cyan, 7);
        let mut b = RowJitter::new(noise, Channel::Cyan, 7);
        let mut other = RowJitter::new(noise, Channel::Magenta, 7);
        let xs: Vec<f32> = (0..16).map(|_| a.apply(0.5)).collect();
        let ys: Vec<f32> = (0..16).map(|_| b.apply(0.5)).collect();
        let zs: Vec<f32> = (0..16).map(|_| other.apply(0.5)).collect();
        assert_eq!(xs, ys);
        assert_ne!(xs, zs);
        assert!(xs.iter().all(|t| (0.3..=0.7).contains(t)));
    }

    #[test]
    fn test_jitter_keeps_threshold_inside_unit_interval() {
        let noise = Some(Noise {
            amplitude: 0.5,
            seed: 1,
        });
        let mut jitter = RowJitter::new(noise, Channel::Black, 0);
        for _ in 0..1000 {
            let t = jitter.apply(0.01);
            assert!(t > 0.0 && t < 1.0);
        }
    }

    #[test]
    fn test_no_noise_is_identity() {
        let mut jitter = RowJitter::new(None, Channel::White, 3);
        assert_eq!(jitter.apply(0.25), 0.25);
    }
}
