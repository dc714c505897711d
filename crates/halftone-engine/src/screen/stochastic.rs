//! Dispersed-dot (FM) ordered screen.
//!
//! A 64x64 tile of hashed values is converted to ranks, giving thresholds
//! that are uniform in `(0, 1)` and spatially uncorrelated. Unlike error
//! diffusion every pixel is independent, so rows screen in parallel and the
//! result does not depend on scan order.

use std::sync::OnceLock;

const TILE: usize = 64;

/// Hash per tile position, evaluated at compile time.
const TILE_HASHES: [u32; TILE * TILE] = generate_hashes();

const fn generate_hashes() -> [u32; TILE * TILE] {
    let mut out = [0u32; TILE * TILE];
    let mut i = 0;
    while i < TILE * TILE {
        let x = (i % TILE) as u32;
        let y = (i / TILE) as u32;
        let mut hash = i as u32;
        hash = hash.wrapping_mul(0x85eb_ca6b);
        hash ^= hash >> 13;
        hash = hash.wrapping_mul(0xc2b2_ae35);
        hash ^= hash >> 16;
        hash = hash.wrapping_add(x.wrapping_mul(0x045d_9f3b));
        hash ^= hash >> 11;
        hash = hash.wrapping_add(y.wrapping_mul(0x119d_e1f3));
        hash ^= hash >> 15;
        hash = hash.wrapping_mul(0x27d4_eb2d);
        hash ^= hash >> 13;
        out[i] = hash;
        i += 1;
    }
    out
}

fn tile() -> &'static [f32] {
    static THRESHOLDS: OnceLock<Vec<f32>> = OnceLock::new();
    THRESHOLDS.get_or_init(|| {
        let n = TILE * TILE;
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&i| (TILE_HASHES[i], i));
        let mut thresholds = vec![0.0f32; n];
        for (rank, &i) in order.iter().enumerate() {
            thresholds[i] = ((rank as f64 + 0.5) / n as f64) as f32;
        }
        thresholds
    })
}

/// Threshold in `(0, 1)` for pixel `(x, y)`; the tile repeats every 64 pixels.
#[inline]
pub fn stochastic_threshold(x: usize, y: usize) -> f32 {
    tile()[(y % TILE) * TILE + (x % TILE)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_is_rank_normalised() {
        let mut sorted = tile().to_vec();
        sorted.sort_by(f32::total_cmp);
        let n = sorted.len() as f64;
        for (rank, t) in sorted.iter().enumerate() {
            assert_eq!(*t, ((rank as f64 + 0.5) / n) as f32);
        }
    }

    #[test]
    fn test_tiling_period() {
        assert_eq!(stochastic_threshold(3, 5), stochastic_threshold(67, 133));
    }

    #[test]
    fn test_quadrants_are_mixed() {
        // Each 32x32 quadrant should hold a spread of thresholds.
        for (qx, qy) in [(0, 0), (32, 0), (0, 32), (32, 32)] {
            let mut lo = 1.0f32;
            let mut hi = 0.0f32;
            let mut sum = 0.0f64;
            for y in qy..qy + 32 {
                for x in qx..qx + 32 {
                    let t = stochastic_threshold(x, y);
                    lo = lo.min(t);
                    hi = hi.max(t);
                    sum += t as f64;
                }
            }
            let mean = sum / 1024.0;
            assert!(lo < 0.05 && hi > 0.95, "quadrant ({qx},{qy}): {lo}..{hi}");
            assert!((mean - 0.5).abs() < 0.05, "quadrant ({qx},{qy}) mean {mean}");
        }
    }
}
