//! Rotated clustered-dot threshold function.
//!
//! A pixel centre is rotated into screen coordinates measured in cells; the
//! fractional position inside the cell looks up a rank-normalised spot
//! table. Ranks make the thresholds uniform in `(0, 1)`, so the share of
//! pixels switched on tracks the tone at every angle.

use std::sync::OnceLock;

use super::DotShape;

/// Spot table edge length.
pub(crate) const SPOT_SIZE: usize = 64;

/// Position of the centre of pixel `(x, y)` in a screen rotated by
/// `angle_deg`, in units of `cell` pixels.
///
/// Pure function of its arguments; the integer parts identify the cell, the
/// fractional parts the position inside it.
#[inline]
pub fn cell_position(x: usize, y: usize, angle_deg: f64, cell: f64) -> (f64, f64) {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    rotate(x, y, sin, cos, 1.0 / cell)
}

#[inline]
fn rotate(x: usize, y: usize, sin: f64, cos: f64, inv_cell: f64) -> (f64, f64) {
    let px = x as f64 + 0.5;
    let py = y as f64 + 0.5;
    (
        (px * cos + py * sin) * inv_cell,
        (-px * sin + py * cos) * inv_cell,
    )
}

/// Threshold in `(0, 1)` of pixel `(x, y)` for a screen at `angle_deg`
/// with `cell`-pixel cells. Depends on nothing but its arguments.
///
/// ```
/// use halftone_engine::{screen_threshold, DotShape};
///
/// let a = screen_threshold(10, 20, 45.0, 5.0, DotShape::Round);
/// assert_eq!(a, screen_threshold(10, 20, 45.0, 5.0, DotShape::Round));
/// ```
pub fn screen_threshold(x: usize, y: usize, angle_deg: f64, cell: f64, shape: DotShape) -> f32 {
    let (u, v) = cell_position(x, y, angle_deg, cell);
    SpotTable::cached(shape).lookup(u - u.floor(), v - v.floor())
}

/// Thresholds for one dot shape, `SPOT_SIZE x SPOT_SIZE`, row-major.
#[derive(Debug, Clone)]
pub(crate) struct SpotTable {
    thresholds: Vec<f32>,
}

impl SpotTable {
    pub(crate) fn new(shape: DotShape) -> Self {
        let n = SPOT_SIZE * SPOT_SIZE;
        let spot = |i: usize| -> f64 {
            let sx = ((i % SPOT_SIZE) as f64 + 0.5) / SPOT_SIZE as f64 * 2.0 - 1.0;
            let sy = ((i / SPOT_SIZE) as f64 + 0.5) / SPOT_SIZE as f64 * 2.0 - 1.0;
            match shape {
                DotShape::Round => sx * sx + sy * sy,
                DotShape::Diamond => sx.abs() + sy.abs(),
                DotShape::Line => sy.abs(),
            }
        };
        let values: Vec<f64> = (0..n).map(spot).collect();

        // Lowest spot value switches on first; ties go by index.
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));

        let mut thresholds = vec![0.0f32; n];
        for (rank, &i) in order.iter().enumerate() {
            thresholds[i] = ((rank as f64 + 0.5) / n as f64) as f32;
        }
        Self { thresholds }
    }

    /// Shared table for `shape`, built on first use.
    pub(crate) fn cached(shape: DotShape) -> &'static SpotTable {
        static ROUND: OnceLock<SpotTable> = OnceLock::new();
        static DIAMOND: OnceLock<SpotTable> = OnceLock::new();
        static LINE: OnceLock<SpotTable> = OnceLock::new();
        let cell = match shape {
            DotShape::Round => &ROUND,
            DotShape::Diamond => &DIAMOND,
            DotShape::Line => &LINE,
        };
        cell.get_or_init(|| SpotTable::new(shape))
    }

    /// Threshold at fractional cell position `(fu, fv)` in `[0, 1)`.
    #[inline]
    pub(crate) fn lookup(&self, fu: f64, fv: f64) -> f32 {
        let ix = ((fu * SPOT_SIZE as f64) as usize).min(SPOT_SIZE - 1);
        let iy = ((fv * SPOT_SIZE as f64) as usize).min(SPOT_SIZE - 1);
        self.thresholds[iy * SPOT_SIZE + ix]
    }
}

/// A rotated AM screen for one channel.
///
/// ```
/// use halftone_engine::{DotShape, RotatedScreen};
///
/// let screen = RotatedScreen::new(45.0, 5.0, DotShape::Round);
/// let t = screen.threshold(3, 7);
/// assert!(t > 0.0 && t < 1.0);
/// assert_eq!(t, screen.threshold(3, 7));
/// ```
#[derive(Debug, Clone)]
pub struct RotatedScreen {
    sin: f64,
    cos: f64,
    inv_cell: f64,
    table: &'static SpotTable,
}

impl RotatedScreen {
    /// Screen at `angle_deg` with cells of `cell` output pixels.
    pub fn new(angle_deg: f64, cell: f64, shape: DotShape) -> Self {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        Self {
            sin,
            cos,
            inv_cell: 1.0 / cell,
            table: SpotTable::cached(shape),
        }
    }

    /// Threshold in `(0, 1)` for pixel `(x, y)`.
    #[inline]
    pub fn threshold(&self, x: usize, y: usize) -> f32 {
        let (u, v) = rotate(x, y, self.sin, self.cos, self.inv_cell);
        self.table.lookup(u - u.floor(), v - v.floor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coverage(screen: &RotatedScreen, tone: f32, size: usize) -> f64 {
        let mut on = 0usize;
        for y in 0..size {
            for x in 0..size {
                if tone > screen.threshold(x, y) {
                    on += 1;
                }
            }
        }
        on as f64 / (size * size) as f64
    }

    #[test]
    fn test_spot_table_is_a_permutation_of_ranks() {
        for shape in [DotShape::Round, DotShape::Diamond, DotShape::Line] {
            let table = SpotTable::new(shape);
            let mut sorted = table.thresholds.clone();
            sorted.sort_by(f32::total_cmp);
            let n = sorted.len();
            for (rank, t) in sorted.iter().enumerate() {
                let expected = ((rank as f64 + 0.5) / n as f64) as f32;
                assert_eq!(*t, expected, "{shape:?} rank {rank}");
            }
        }
    }

    #[test]
    fn test_round_dot_grows_from_centre() {
        let table = SpotTable::new(DotShape::Round);
        assert!(table.lookup(0.5, 0.5) < table.lookup(0.05, 0.05));
        assert!(table.lookup(0.5, 0.5) < 0.01);
    }

    #[test]
    fn test_cell_position_rotation() {
        let (u, v) = cell_position(0, 0, 0.0, 2.0);
        assert!((u - 0.25).abs() < 1e-12 && (v - 0.25).abs() < 1e-12);

        // 90 degrees swaps axes (with a sign flip).
        let (u, v) = cell_position(3, 1, 90.0, 1.0);
        assert!((u - 1.5).abs() < 1e-9, "u = {u}");
        assert!((v + 3.5).abs() < 1e-9, "v = {v}");
    }

    #[test]
    fn test_coverage_tracks_tone_at_angles() {
        for angle in [15.0, 45.0, 75.0] {
            let screen = RotatedScreen::new(angle, 5.0, DotShape::Round);
            for tone in [0.1f32, 0.25, 0.5, 0.75, 0.9] {
                let got = coverage(&screen, tone, 100);
                assert!(
                    (got - tone as f64).abs() < 0.03,
                    "angle {angle} tone {tone}: coverage {got}"
                );
            }
        }
    }

    #[test]
    fn test_free_function_matches_screen() {
        let screen = RotatedScreen::new(75.0, 10.0, DotShape::Line);
        for (x, y) in [(0, 0), (13, 7), (99, 42)] {
            assert_eq!(
                screen.threshold(x, y),
                screen_threshold(x, y, 75.0, 10.0, DotShape::Line)
            );
        }
    }

    #[test]
    fn test_solid_tones() {
        let screen = RotatedScreen::new(30.0, 7.5, DotShape::Diamond);
        assert_eq!(coverage(&screen, 0.0, 40), 0.0);
        assert_eq!(coverage(&screen, 1.0, 40), 1.0);
    }
}
