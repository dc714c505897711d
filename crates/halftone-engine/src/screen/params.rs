//! Screening parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::kernel::{self, Kernel};
use crate::api::EngineError;
use crate::raster::{Channel, ChannelSet};

/// Error diffusion kernel selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffusionKernel {
    /// 4 neighbours, 100 % propagation.
    #[default]
    FloydSteinberg,
    /// 6 neighbours, 75 % propagation; keeps highlights open.
    Atkinson,
    /// 12 neighbours over 3 rows.
    JarvisJudiceNinke,
    /// 12 neighbours over 3 rows, sharper centre weights.
    Stucki,
    /// 7 neighbours over 2 rows.
    Burkes,
    /// 10 neighbours over 3 rows.
    Sierra,
    /// 7 neighbours over 2 rows.
    SierraTwoRow,
    /// 3 neighbours.
    SierraLite,
}

impl DiffusionKernel {
    pub const ALL: [DiffusionKernel; 8] = [
        DiffusionKernel::FloydSteinberg,
        DiffusionKernel::Atkinson,
        DiffusionKernel::JarvisJudiceNinke,
        DiffusionKernel::Stucki,
        DiffusionKernel::Burkes,
        DiffusionKernel::Sierra,
        DiffusionKernel::SierraTwoRow,
        DiffusionKernel::SierraLite,
    ];

    /// The weight table.
    pub fn kernel(self) -> &'static Kernel {
        match self {
            DiffusionKernel::FloydSteinberg => &kernel::FLOYD_STEINBERG,
            DiffusionKernel::Atkinson => &kernel::ATKINSON,
            DiffusionKernel::JarvisJudiceNinke => &kernel::JARVIS_JUDICE_NINKE,
            DiffusionKernel::Stucki => &kernel::STUCKI,
            DiffusionKernel::Burkes => &kernel::BURKES,
            DiffusionKernel::Sierra => &kernel::SIERRA,
            DiffusionKernel::SierraTwoRow => &kernel::SIERRA_TWO_ROW,
            DiffusionKernel::SierraLite => &kernel::SIERRA_LITE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DiffusionKernel::FloydSteinberg => "floyd-steinberg",
            DiffusionKernel::Atkinson => "atkinson",
            DiffusionKernel::JarvisJudiceNinke => "jarvis-judice-ninke",
            DiffusionKernel::Stucki => "stucki",
            DiffusionKernel::Burkes => "burkes",
            DiffusionKernel::Sierra => "sierra",
            DiffusionKernel::SierraTwoRow => "sierra-two-row",
            DiffusionKernel::SierraLite => "sierra-lite",
        }
    }
}

impl fmt::Display for DiffusionKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiffusionKernel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        DiffusionKernel::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                EngineError::InvalidScreenParameters(format!("unknown diffusion kernel '{s}'"))
            })
    }
}

/// Spot function that shapes clustered (AM) dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DotShape {
    /// Circular dots growing from the cell centre.
    #[default]
    Round,
    /// Square dots rotated 45° within the cell.
    Diamond,
    /// Lines parallel to the screen's u axis.
    Line,
}

impl FromStr for DotShape {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "round" => Ok(DotShape::Round),
            "diamond" => Ok(DotShape::Diamond),
            "line" => Ok(DotShape::Line),
            _ => Err(EngineError::InvalidScreenParameters(format!(
                "unknown dot shape '{s}'"
            ))),
        }
    }
}

/// Screening algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ScreenMethod {
    /// Rotated clustered-dot (AM) screen.
    #[default]
    Ordered,
    /// Dispersed-dot (FM) error diffusion.
    ErrorDiffusion {
        #[serde(default)]
        kernel: DiffusionKernel,
    },
    /// Dispersed-dot (FM) ordered screen from a hashed threshold tile.
    Stochastic,
    /// Error diffusion below `highlight` and above `shadow`, clustered dots
    /// in between.
    Hybrid {
        highlight: f32,
        shadow: f32,
        #[serde(default)]
        kernel: DiffusionKernel,
    },
}

impl ScreenMethod {
    pub const DEFAULT_HIGHLIGHT: f32 = 0.2;
    pub const DEFAULT_SHADOW: f32 = 0.8;

    /// Hybrid with default thresholds and Floyd–Steinberg.
    pub fn hybrid() -> Self {
        ScreenMethod::Hybrid {
            highlight: Self::DEFAULT_HIGHLIGHT,
            shadow: Self::DEFAULT_SHADOW,
            kernel: DiffusionKernel::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScreenMethod::Ordered => "ordered",
            ScreenMethod::ErrorDiffusion { .. } => "error-diffusion",
            ScreenMethod::Stochastic => "stochastic",
            ScreenMethod::Hybrid { .. } => "hybrid",
        }
    }
}

impl fmt::Display for ScreenMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScreenMethod {
    type Err = EngineError;

    /// Method names with default settings. `error-diffusion` also accepts a
    /// kernel suffix, e.g. `error-diffusion:atkinson`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, kernel) = match s.split_once(':') {
            Some((name, kernel)) => (name, Some(kernel.parse::<DiffusionKernel>()?)),
            None => (s, None),
        };
        match name.to_ascii_lowercase().as_str() {
            "ordered" | "am" => Ok(ScreenMethod::Ordered),
            "error-diffusion" | "fm" => Ok(ScreenMethod::ErrorDiffusion {
                kernel: kernel.unwrap_or_default(),
            }),
            "stochastic" => Ok(ScreenMethod::Stochastic),
            "hybrid" => Ok(ScreenMethod::Hybrid {
                highlight: Self::DEFAULT_HIGHLIGHT,
                shadow: Self::DEFAULT_SHADOW,
                kernel: kernel.unwrap_or_default(),
            }),
            _ => Err(EngineError::InvalidScreenParameters(format!(
                "unknown screening method '{s}'"
            ))),
        }
    }
}

/// Seeded threshold jitter.
///
/// Each row of each channel draws from its own generator seeded from `seed`,
/// so results are reproducible and independent of thread scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Noise {
    /// Maximum jitter added to thresholds, `0.0..=0.5`.
    pub amplitude: f32,
    pub seed: u64,
}

/// Configuration for the halftone screener.
///
/// # Defaults
///
/// - Method: [`ScreenMethod::Ordered`]
/// - Angles: C 15°, M 75°, Y 0°, K 45°, W 30°
/// - Dot shape: [`DotShape::Round`]
/// - Levels: 2 (binary)
/// - Serpentine scanning: enabled
/// - Error clamp: 0.5
/// - Noise: off
///
/// ```
/// use halftone_engine::{ScreenMethod, ScreenParameters};
///
/// let params = ScreenParameters::new(600.0, 55.0)
///     .method(ScreenMethod::Stochastic)
///     .levels(4);
/// assert!(params.validate().is_ok());
/// assert!((params.cell_size() - 600.0 / 55.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenParameters {
    /// Output resolution in dots per inch.
    pub dpi: f64,
    /// Screen ruling in lines per inch.
    pub lpi: f64,
    pub method: ScreenMethod,
    /// Screen angle per channel in degrees, `[0, 360)`.
    pub angles: ChannelSet<f64>,
    pub dot_shape: DotShape,
    /// Number of output levels per pixel (2 = binary).
    pub levels: u16,
    /// Alternate scan direction on odd rows during error diffusion.
    pub serpentine: bool,
    /// Accumulated diffusion error is clamped to `[-clamp, 1 + clamp]`.
    pub error_clamp: f32,
    pub noise: Option<Noise>,
}

impl ScreenParameters {
    /// Parameters for `dpi` / `lpi` with every other setting at its default.
    pub fn new(dpi: f64, lpi: f64) -> Self {
        Self {
            dpi,
            lpi,
            method: ScreenMethod::Ordered,
            angles: ChannelSet::from_fn(Channel::default_angle),
            dot_shape: DotShape::Round,
            levels: 2,
            serpentine: true,
            error_clamp: 0.5,
            noise: None,
        }
    }

    pub fn method(mut self, method: ScreenMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the screen angle of one channel.
    pub fn angle(mut self, channel: Channel, degrees: f64) -> Self {
        self.angles[channel] = degrees;
        self
    }

    pub fn angles(mut self, angles: ChannelSet<f64>) -> Self {
        self.angles = angles;
        self
    }

    pub fn dot_shape(mut self, shape: DotShape) -> Self {
        self.dot_shape = shape;
        self
    }

    pub fn levels(mut self, levels: u16) -> Self {
        self.levels = levels;
        self
    }

    pub fn serpentine(mut self, enabled: bool) -> Self {
        self.serpentine = enabled;
        self
    }

    pub fn error_clamp(mut self, clamp: f32) -> Self {
        self.error_clamp = clamp;
        self
    }

    /// Enable seeded threshold jitter.
    pub fn noise(mut self, amplitude: f32, seed: u64) -> Self {
        self.noise = Some(Noise { amplitude, seed });
        self
    }

    /// Screen cell edge length in output pixels.
    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.dpi / self.lpi
    }

    /// Check every setting.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidScreenParameters`] when DPI or LPI is not a
    /// positive number, LPI exceeds DPI / 2, an angle is outside `[0, 360)`,
    /// `levels` is outside `2..=256`, the noise amplitude is outside
    /// `[0, 0.5]`, or hybrid thresholds are not `0 <= highlight < shadow <= 1`.
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::InvalidScreenParameters(msg));

        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return invalid(format!("DPI must be positive, got {}", self.dpi));
        }
        if !(self.lpi.is_finite() && self.lpi > 0.0) {
            return invalid(format!("LPI must be positive, got {}", self.lpi));
        }
        if self.lpi > self.dpi / 2.0 {
            return invalid(format!(
                "LPI {} exceeds half the DPI ({}); the screen would alias",
                self.lpi,
                self.dpi / 2.0
            ));
        }
        for (channel, &angle) in self.angles.iter() {
            if !(0.0..360.0).contains(&angle) {
                return invalid(format!(
                    "{channel} screen angle {angle} is outside [0, 360)"
                ));
            }
        }
        if !(2..=256).contains(&self.levels) {
            return invalid(format!("levels must be in 2..=256, got {}", self.levels));
        }
        if !(self.error_clamp.is_finite() && self.error_clamp >= 0.0) {
            return invalid(format!(
                "error clamp must be non-negative, got {}",
                self.error_clamp
            ));
        }
        if let Some(noise) = self.noise {
            if !(0.0..=0.5).contains(&noise.amplitude) {
                return invalid(format!(
                    "noise amplitude {} is outside [0, 0.5]",
                    noise.amplitude
                ));
            }
        }
        if let ScreenMethod::Hybrid {
            highlight, shadow, ..
        } = self.method
        {
            if !(0.0 <= highlight && highlight < shadow && shadow <= 1.0) {
                return invalid(format!(
                    "hybrid thresholds need 0 <= highlight < shadow <= 1, got {highlight} / {shadow}"
                ));
            }
        }
        Ok(())
    }
}
