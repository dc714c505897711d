//! Process-ink coverage for a single pixel.

/// Coverages of the four process inks, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cmyk {
    /// Cyan coverage
    pub c: f32,
    /// Magenta coverage
    pub m: f32,
    /// Yellow coverage
    pub y: f32,
    /// Black coverage
    pub k: f32,
}

impl Cmyk {
    /// Create a coverage quadruple.
    #[inline]
    pub const fn new(c: f32, m: f32, y: f32, k: f32) -> Self {
        Self { c, m, y, k }
    }

    /// Gray component `1 - max(R, G, B)` of an RGB triple in `0.0..=1.0`.
    #[inline]
    pub fn gray_component(rgb: [f32; 3]) -> f32 {
        1.0 - rgb[0].max(rgb[1]).max(rgb[2])
    }

    /// Largest of the four coverages.
    #[inline]
    pub fn max(self) -> f32 {
        self.c.max(self.m).max(self.y).max(self.k)
    }

    /// Total area coverage (0.0..=4.0).
    #[inline]
    pub fn sum(self) -> f32 {
        self.c + self.m + self.y + self.k
    }

    /// Multiply every coverage by `factor`.
    #[inline]
    pub fn scale(self, factor: f32) -> Self {
        Self::new(
            self.c * factor,
            self.m * factor,
            self.y * factor,
            self.k * factor,
        )
    }

    /// Apply `f` to every coverage.
    #[inline]
    pub fn map(self, mut f: impl FnMut(f32) -> f32) -> Self {
        Self::new(f(self.c), f(self.m), f(self.y), f(self.k))
    }

    /// Clamp every coverage into `0.0..=1.0`.
    #[inline]
    pub fn clamped(self) -> Self {
        self.map(|v| v.clamp(0.0, 1.0))
    }

    /// Coverages as `[c, m, y, k]`.
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.c, self.m, self.y, self.k]
    }
}
