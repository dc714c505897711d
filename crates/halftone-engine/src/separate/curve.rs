//! Monotonic piecewise-linear tone curves.

use serde::{Deserialize, Serialize};

use crate::api::EngineError;

/// Number of samples used when a closed-form curve is tabulated.
const CURVE_SAMPLES: usize = 33;

/// A monotonic map `[0, 1] -> [0, 1]` given by control points.
///
/// Points are sorted by input, the first input is 0 and the last is 1, and
/// outputs never decrease. Evaluation interpolates linearly between the two
/// neighbouring points.
///
/// ```
/// use halftone_engine::ToneCurve;
///
/// let curve = ToneCurve::new(vec![(0.0, 0.0), (0.5, 0.2), (1.0, 1.0)]).unwrap();
/// assert!((curve.apply(0.25) - 0.1).abs() < 1e-6);
///
/// assert!(ToneCurve::new(vec![(0.0, 0.5), (1.0, 0.2)]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f32, f32)>", into = "Vec<(f32, f32)>")]
pub struct ToneCurve {
    points: Vec<(f32, f32)>,
}

impl ToneCurve {
    /// Build a curve from control points.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidProfile`] when there are fewer than two points,
    /// a coordinate is outside `[0, 1]`, inputs are not strictly increasing,
    /// outputs decrease, or the inputs do not span `[0, 1]`.
    pub fn new(points: Vec<(f32, f32)>) -> Result<Self, EngineError> {
        if points.len() < 2 {
            return Err(EngineError::InvalidProfile(format!(
                "tone curve needs at least two points, got {}",
                points.len()
            )));
        }
        for &(x, y) in &points {
            if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
                return Err(EngineError::InvalidProfile(format!(
                    "tone curve point ({x}, {y}) is outside [0, 1]"
                )));
            }
        }
        for pair in points.windows(2) {
            let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
            if x1 <= x0 {
                return Err(EngineError::InvalidProfile(format!(
                    "tone curve inputs must increase strictly ({x0} then {x1})"
                )));
            }
            if y1 < y0 {
                return Err(EngineError::InvalidProfile(format!(
                    "tone curve is not monotonic ({x0} -> {y0}, {x1} -> {y1})"
                )));
            }
        }
        let first = points[0].0;
        let last = points[points.len() - 1].0;
        if first != 0.0 || last != 1.0 {
            return Err(EngineError::InvalidProfile(format!(
                "tone curve must cover [0, 1], covers [{first}, {last}]"
            )));
        }
        Ok(Self { points })
    }

    /// `f(x) = x`.
    pub fn identity() -> Self {
        Self {
            points: vec![(0.0, 0.0), (1.0, 1.0)],
        }
    }

    /// `f(x) = 0`. As a black-generation curve this disables black; as an
    /// under-colour-removal curve it leaves C/M/Y untouched.
    pub fn zero() -> Self {
        Self {
            points: vec![(0.0, 0.0), (1.0, 0.0)],
        }
    }

    /// `f(x) = strength * x`, `strength` clamped into `[0, 1]`.
    pub fn linear(strength: f32) -> Self {
        Self {
            points: vec![(0.0, 0.0), (1.0, strength.clamp(0.0, 1.0))],
        }
    }

    /// Zero up to `start`, then rising linearly to 1 (skeleton black).
    pub fn from_threshold(start: f32) -> Self {
        let start = start.clamp(0.0, 1.0);
        if start <= 0.0 {
            return Self::identity();
        }
        if start >= 1.0 {
            return Self::zero();
        }
        Self {
            points: vec![(0.0, 0.0), (start, 0.0), (1.0, 1.0)],
        }
    }

    /// `f(x) = x^gamma`, tabulated.
    pub fn gamma(gamma: f32) -> Result<Self, EngineError> {
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(EngineError::InvalidProfile(format!(
                "gamma must be positive, got {gamma}"
            )));
        }
        Ok(Self::sampled(|x| x.powf(gamma)))
    }

    /// Pre-compensation for press dot gain `gain` (e.g. `0.12` for 12 %):
    /// `f(x) = 1 - (1 - x)^(1 / (1 + gain))`.
    pub fn dot_gain_compensation(gain: f32) -> Result<Self, EngineError> {
        if !(gain.is_finite() && gain >= 0.0) {
            return Err(EngineError::InvalidProfile(format!(
                "dot gain must be a non-negative number, got {gain}"
            )));
        }
        let exponent = 1.0 / (1.0 + gain);
        Ok(Self::sampled(|x| 1.0 - (1.0 - x).powf(exponent)))
    }

    fn sampled(f: impl Fn(f32) -> f32) -> Self {
        let last = (CURVE_SAMPLES - 1) as f32;
        let mut points: Vec<(f32, f32)> = (0..CURVE_SAMPLES)
            .map(|i| {
                let x = i as f32 / last;
                (x, f(x).clamp(0.0, 1.0))
            })
            .collect();
        // Float noise must not break monotonicity.
        for i in 1..points.len() {
            if points[i].1 < points[i - 1].1 {
                points[i].1 = points[i - 1].1;
            }
        }
        Self { points }
    }

    /// Control points.
    pub fn points(&self) -> &[(f32, f32)] {
        &self.points
    }

    /// Whether this is the identity map.
    pub fn is_identity(&self) -> bool {
        self.points.iter().all(|&(x, y)| x == y)
    }

    /// Evaluate the curve. Inputs outside `[0, 1]` are clamped.
    pub fn apply(&self, x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        let idx = self.points.partition_point(|&(px, _)| px < x);
        if idx == 0 {
            return self.points[0].1;
        }
        if idx >= self.points.len() {
            return self.points[self.points.len() - 1].1;
        }
        let (x0, y0) = self.points[idx - 1];
        let (x1, y1) = self.points[idx];
        let t = (x - x0) / (x1 - x0);
        (y0 + t * (y1 - y0)).clamp(0.0, 1.0)
    }
}

impl Default for ToneCurve {
    fn default() -> Self {
        Self::identity()
    }
}

impl TryFrom<Vec<(f32, f32)>> for ToneCurve {
    type Error = EngineError;

    fn try_from(points: Vec<(f32, f32)>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<ToneCurve> for Vec<(f32, f32)> {
    fn from(curve: ToneCurve) -> Self {
        curve.points
    }
}
