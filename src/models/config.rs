use std::path::Path;

use halftone_engine::{
    Channel, ChannelSet, DiffusionKernel, DotShape, HalftoneEngine, Noise, PreviewOptions,
    ScreenMethod, ScreenParameters, SeparationProfile, Srgb, ToneCurve, WhitePolicy,
};
use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// Built-in preset names, in display order.
pub const PRESETS: [&str; 3] = ["epson-standard", "high-detail", "fast-production"];

/// Screening method as written in job files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodKind {
    #[default]
    Ordered,
    ErrorDiffusion,
    Stochastic,
    Hybrid,
}

/// How black is generated from the gray component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum BlackGeneration {
    /// Gray component replacement: `K = strength * gray`, CMY reduced by K.
    Gcr { strength: f32 },
    /// Under-colour removal: `K = min(c, m, y)` subtracted from C/M/Y
    /// without renormalising.
    Ucr,
    /// Pure CMY build, no black ink.
    None,
}

impl Default for BlackGeneration {
    fn default() -> Self {
        BlackGeneration::Gcr { strength: 0.8 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiffCompression {
    #[default]
    Lzw,
    None,
}

/// Job configuration loaded from a YAML or JSON file.
///
/// Every field has a default, so a config file only needs to list what it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Output resolution
    pub dpi: f64,

    /// Screen ruling
    pub lpi: f64,

    pub method: MethodKind,

    /// Kernel for error diffusion and the hybrid method
    pub kernel: DiffusionKernel,

    pub dot_shape: DotShape,

    /// Output levels per pixel (2 = binary)
    pub levels: u16,

    /// Screen angle per channel in degrees
    pub angles: ChannelSet<f64>,

    pub white: WhitePolicy,

    pub black_generation: BlackGeneration,

    /// Total ink limit in percent (400 = no limit)
    pub total_ink_limit: f32,

    /// Expected press dot gain (0.12 = 12 %)
    pub dot_gain: f32,

    pub serpentine: bool,

    /// Seeded threshold jitter
    pub noise: Option<Noise>,

    /// Resolution of the input artwork; when unset the artwork is assumed
    /// to be at the output DPI
    pub source_dpi: Option<f64>,

    /// Garment or film colour shown in the preview
    pub backdrop: Srgb,

    /// Measured ink colours for the preview
    pub inks: ChannelSet<Srgb>,

    pub compression: TiffCompression,
}

impl Default for JobConfig {
    fn default() -> Self {
        let preview = PreviewOptions::default();
        Self {
            dpi: 600.0,
            lpi: 55.0,
            method: MethodKind::Ordered,
            kernel: DiffusionKernel::FloydSteinberg,
            dot_shape: DotShape::Round,
            levels: 2,
            angles: ChannelSet::from_fn(Channel::default_angle),
            white: WhitePolicy::edge_enhanced(),
            black_generation: BlackGeneration::default(),
            total_ink_limit: 280.0,
            dot_gain: 0.12,
            serpentine: true,
            noise: None,
            source_dpi: None,
            backdrop: preview.backdrop,
            inks: preview.inks,
            compression: TiffCompression::Lzw,
        }
    }
}

impl JobConfig {
    /// Look up a built-in preset by name.
    pub fn preset(name: &str) -> Result<Self, JobError> {
        let base = Self::default();
        let preset = match name {
            "epson-standard" => Self {
                dpi: 600.0,
                lpi: 55.0,
                white: WhitePolicy::edge_enhanced(),
                dot_gain: 0.15,
                ..base
            },
            "high-detail" => Self {
                dpi: 600.0,
                lpi: 65.0,
                white: WhitePolicy::underbase(),
                dot_gain: 0.10,
                ..base
            },
            "fast-production" => Self {
                dpi: 300.0,
                lpi: 45.0,
                white: WhitePolicy::Density,
                dot_gain: 0.20,
                ..base
            },
            _ => return Err(JobError::UnknownPreset(name.to_string())),
        };
        Ok(preset)
    }

    /// Load a config file; the format follows the extension (`.json`, else
    /// YAML).
    pub fn load(path: &Path) -> Result<Self, JobError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = if is_json(path) {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        tracing::info!(
            path = %path.display(),
            dpi = config.dpi,
            lpi = config.lpi,
            method = ?config.method,
            "Loaded job config"
        );
        Ok(config)
    }

    /// Write the config; the format follows the extension.
    pub fn save(&self, path: &Path) -> Result<(), JobError> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)?
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn screen_method(&self) -> ScreenMethod {
        match self.method {
            MethodKind::Ordered => ScreenMethod::Ordered,
            MethodKind::ErrorDiffusion => ScreenMethod::ErrorDiffusion {
                kernel: self.kernel,
            },
            MethodKind::Stochastic => ScreenMethod::Stochastic,
            MethodKind::Hybrid => ScreenMethod::Hybrid {
                highlight: ScreenMethod::DEFAULT_HIGHLIGHT,
                shadow: ScreenMethod::DEFAULT_SHADOW,
                kernel: self.kernel,
            },
        }
    }

    pub fn screen_parameters(&self) -> ScreenParameters {
        ScreenParameters {
            dpi: self.dpi,
            lpi: self.lpi,
            method: self.screen_method(),
            angles: self.angles,
            dot_shape: self.dot_shape,
            levels: self.levels,
            serpentine: self.serpentine,
            error_clamp: ScreenParameters::new(self.dpi, self.lpi).error_clamp,
            noise: self.noise,
        }
    }

    /// Reject job-file values the engine would otherwise clamp or ignore.
    pub fn validate(&self) -> Result<(), JobError> {
        if !(self.dot_gain.is_finite() && self.dot_gain >= 0.0) {
            return Err(JobError::Config(format!(
                "dot_gain must be a non-negative number, got {}",
                self.dot_gain
            )));
        }
        if let BlackGeneration::Gcr { strength } = self.black_generation {
            if !(0.0..=1.0).contains(&strength) {
                return Err(JobError::Config(format!(
                    "gcr strength {strength} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }

    pub fn separation_profile(&self) -> SeparationProfile {
        let (black, removal, rescale) = match self.black_generation {
            BlackGeneration::Gcr { strength } => {
                (ToneCurve::linear(strength), ToneCurve::identity(), true)
            }
            BlackGeneration::Ucr => (ToneCurve::identity(), ToneCurve::identity(), false),
            BlackGeneration::None => (ToneCurve::zero(), ToneCurve::zero(), true),
        };
        let mut profile = SeparationProfile::new()
            .black_generation(black)
            .under_color_removal(removal)
            .rescale_after_removal(rescale)
            .white(self.white);
        if self.total_ink_limit < 400.0 {
            profile = profile.total_ink_limit(self.total_ink_limit / 100.0);
        }
        if self.dot_gain > 0.0 {
            profile = profile.dot_gain(self.dot_gain);
        }
        profile
    }

    pub fn preview_options(&self) -> PreviewOptions {
        PreviewOptions::new().backdrop(self.backdrop).inks(self.inks)
    }

    /// Build a validated engine for this job.
    pub fn engine(&self) -> Result<HalftoneEngine, JobError> {
        self.validate()?;
        let engine = HalftoneEngine::new(self.separation_profile(), self.screen_parameters())?
            .preview_options(self.preview_options());
        Ok(engine)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use halftone_engine::{separate, PixelFormat, RasterImage};

    #[test]
    fn test_defaults_match_original_settings() {
        let config = JobConfig::default();
        assert_eq!(config.dpi, 600.0);
        assert_eq!(config.lpi, 55.0);
        assert_eq!(config.angles[Channel::Black], 45.0);
        assert_eq!(config.angles[Channel::White], 30.0);
        assert_eq!(config.total_ink_limit, 280.0);
        assert!(config.engine().is_ok());
    }

    #[test]
    fn test_all_presets_build_engines() {
        for name in PRESETS {
            let config = JobConfig::preset(name).unwrap();
            assert!(config.engine().is_ok(), "preset {name}");
        }
        assert!(matches!(
            JobConfig::preset("glossy"),
            Err(JobError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "lpi: 65\nmethod: error-diffusion\nkernel: atkinson\n";
        let config: JobConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.lpi, 65.0);
        assert_eq!(config.dpi, 600.0);
        assert_eq!(
            config.screen_method(),
            ScreenMethod::ErrorDiffusion {
                kernel: DiffusionKernel::Atkinson
            }
        );
    }

    #[test]
    fn test_white_and_black_modes_from_yaml() {
        let yaml = "white:\n  mode: underbase\n  threshold: 0.9\nblack_generation:\n  mode: ucr\n";
        let config: JobConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.white, WhitePolicy::Underbase { threshold: 0.9 });
        assert_eq!(config.black_generation, BlackGeneration::Ucr);
    }

    #[test]
    fn test_ink_limit_percent_conversion() {
        let config = JobConfig {
            total_ink_limit: 250.0,
            ..JobConfig::default()
        };
        assert_eq!(config.separation_profile().ink_limit(), Some(2.5));

        let unlimited = JobConfig {
            total_ink_limit: 400.0,
            ..JobConfig::default()
        };
        assert_eq!(unlimited.separation_profile().ink_limit(), None);
    }

    #[test]
    fn test_ucr_mode_subtracts_full_gray() {
        let config = JobConfig {
            black_generation: BlackGeneration::Ucr,
            dot_gain: 0.0,
            total_ink_limit: 400.0,
            white: WhitePolicy::None,
            ..JobConfig::default()
        };
        let image = RasterImage::new(1, 1, PixelFormat::Rgb8, vec![51, 153, 102]).unwrap();
        let planes = separate(&image, &config.separation_profile()).unwrap();

        let expected = [0.4, 0.0, 0.2, 0.4];
        for (channel, want) in Channel::ALL.into_iter().zip(expected) {
            let got = planes[channel].get(0, 0);
            assert!((got - want).abs() < 1e-5, "{channel}: {got} != {want}");
        }
    }

    #[test]
    fn test_high_detail_skips_paper_white() {
        let config = JobConfig::preset("high-detail").unwrap();
        assert_eq!(config.white, WhitePolicy::underbase());

        let image = RasterImage::new(2, 1, PixelFormat::Rgb8, vec![255, 255, 255, 40, 40, 40])
            .unwrap();
        let planes = separate(&image, &config.separation_profile()).unwrap();
        assert_eq!(planes.white.get(0, 0), 0.0);
        assert_eq!(planes.white.get(1, 0), 1.0);
    }

    #[test]
    fn test_negative_dot_gain_rejected() {
        let config = JobConfig {
            dot_gain: -0.05,
            ..JobConfig::default()
        };
        assert!(matches!(config.engine(), Err(JobError::Config(_))));
    }

    #[test]
    fn test_gcr_strength_out_of_range_rejected() {
        for strength in [-0.1, 1.5] {
            let config = JobConfig {
                black_generation: BlackGeneration::Gcr { strength },
                ..JobConfig::default()
            };
            assert!(
                matches!(config.engine(), Err(JobError::Config(_))),
                "strength {strength}"
            );
        }
    }

    #[test]
    fn test_invalid_lpi_rejected_by_engine() {
        let config = JobConfig {
            dpi: 300.0,
            lpi: 200.0,
            ..JobConfig::default()
        };
        assert!(matches!(config.engine(), Err(JobError::Engine(_))));
    }
}
