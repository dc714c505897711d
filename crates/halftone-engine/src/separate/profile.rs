//! Separation profile: black generation, under-colour removal, white policy.

use serde::{Deserialize, Serialize};

use super::ToneCurve;
use crate::api::EngineError;

/// How the white underbase is derived.
///
/// Thresholds compare against the mean of R, G and B in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum WhitePolicy {
    /// Solid white under the whole image.
    #[default]
    Full,
    /// White only where no colour ink prints: `1 - max(C, M, Y, K)`.
    Knockout,
    /// No white layer.
    None,
    /// Solid white where the pixel is darker than `threshold`.
    Underbase { threshold: f32 },
    /// Continuous white proportional to darkness: `1 - mean(R, G, B)`.
    Density,
    /// [`WhitePolicy::Underbase`] plus a one-pixel-dilated Sobel edge mask,
    /// so fine outlines get white behind them even when light.
    EdgeEnhanced { threshold: f32, edge_threshold: f32 },
}

impl WhitePolicy {
    /// Near-white pixels (mean above ~250/255) get no underbase.
    pub const DEFAULT_UNDERBASE_THRESHOLD: f32 = 0.98;
    /// Edge-enhanced mode uses a stricter base threshold (~220/255).
    pub const DEFAULT_EDGE_BASE_THRESHOLD: f32 = 0.86;
    /// Sobel magnitude (normalised to `0.0..=1.0`) that counts as an edge.
    pub const DEFAULT_EDGE_THRESHOLD: f32 = 0.2;

    /// Underbase with the default threshold.
    pub fn underbase() -> Self {
        WhitePolicy::Underbase {
            threshold: Self::DEFAULT_UNDERBASE_THRESHOLD,
        }
    }

    /// Edge-enhanced underbase with default thresholds.
    pub fn edge_enhanced() -> Self {
        WhitePolicy::EdgeEnhanced {
            threshold: Self::DEFAULT_EDGE_BASE_THRESHOLD,
            edge_threshold: Self::DEFAULT_EDGE_THRESHOLD,
        }
    }

    /// Whether deriving the white plane needs neighbouring pixels.
    pub(crate) fn needs_neighbourhood(self) -> bool {
        matches!(self, WhitePolicy::EdgeEnhanced { .. })
    }

    fn validate(self) -> Result<(), EngineError> {
        let check = |name: &str, v: f32| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(EngineError::InvalidProfile(format!(
                    "white {name} {v} is outside [0, 1]"
                )))
            }
        };
        match self {
            WhitePolicy::Underbase { threshold } => check("threshold", threshold),
            WhitePolicy::EdgeEnhanced {
                threshold,
                edge_threshold,
            } => {
                check("threshold", threshold)?;
                check("edge threshold", edge_threshold)
            }
            _ => Ok(()),
        }
    }
}

/// Caller-supplied separation settings.
///
/// Built with consuming setters:
///
/// ```
/// use halftone_engine::{SeparationProfile, ToneCurve, WhitePolicy};
///
/// let profile = SeparationProfile::new()
///     .black_generation(ToneCurve::linear(0.8))
///     .white(WhitePolicy::Knockout)
///     .total_ink_limit(2.8)
///     .dot_gain(0.12);
/// assert!(profile.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationProfile {
    black_generation: ToneCurve,
    under_color_removal: ToneCurve,
    white: WhitePolicy,
    total_ink_limit: Option<f32>,
    dot_gain: Option<f32>,
    rescale_after_removal: bool,
}

impl Default for SeparationProfile {
    fn default() -> Self {
        Self {
            black_generation: ToneCurve::identity(),
            under_color_removal: ToneCurve::identity(),
            white: WhitePolicy::Full,
            total_ink_limit: None,
            dot_gain: None,
            rescale_after_removal: true,
        }
    }
}

impl SeparationProfile {
    /// Full black generation, full UCR, solid white, no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Curve mapping the gray component to black coverage.
    pub fn black_generation(mut self, curve: ToneCurve) -> Self {
        self.black_generation = curve;
        self
    }

    /// Curve mapping black coverage to the amount removed from C/M/Y.
    pub fn under_color_removal(mut self, curve: ToneCurve) -> Self {
        self.under_color_removal = curve;
        self
    }

    /// Whether C/M/Y are renormalised by `1 / (1 - u)` after removal.
    ///
    /// On (the default) gives `C = (1 - R - u) / (1 - u)`; off gives the
    /// plain subtraction `C = 1 - R - u`.
    pub fn rescale_after_removal(mut self, rescale: bool) -> Self {
        self.rescale_after_removal = rescale;
        self
    }

    pub fn white(mut self, policy: WhitePolicy) -> Self {
        self.white = policy;
        self
    }

    /// Maximum of `C + M + Y + K` as a fraction (2.8 = 280 %).
    pub fn total_ink_limit(mut self, limit: f32) -> Self {
        self.total_ink_limit = Some(limit);
        self
    }

    /// Press dot gain to pre-compensate on C/M/Y/K (0.12 = 12 %).
    pub fn dot_gain(mut self, gain: f32) -> Self {
        self.dot_gain = Some(gain);
        self
    }

    pub fn black_generation_curve(&self) -> &ToneCurve {
        &self.black_generation
    }

    pub fn under_color_removal_curve(&self) -> &ToneCurve {
        &self.under_color_removal
    }

    pub fn rescales_after_removal(&self) -> bool {
        self.rescale_after_removal
    }

    pub fn white_policy(&self) -> WhitePolicy {
        self.white
    }

    pub fn ink_limit(&self) -> Option<f32> {
        self.total_ink_limit
    }

    pub fn dot_gain_value(&self) -> Option<f32> {
        self.dot_gain
    }

    /// Check every setting.
    ///
    /// Curves built through [`ToneCurve::new`] are valid already; they are
    /// re-checked here because profiles can also arrive through serde.
    pub fn validate(&self) -> Result<(), EngineError> {
        ToneCurve::new(self.black_generation.points().to_vec())?;
        ToneCurve::new(self.under_color_removal.points().to_vec())?;
        self.white.validate()?;
        if let Some(limit) = self.total_ink_limit {
            if !(limit.is_finite() && limit > 0.0 && limit <= 4.0) {
                return Err(EngineError::InvalidProfile(format!(
                    "total ink limit {limit} is outside (0, 4]"
                )));
            }
        }
        if let Some(gain) = self.dot_gain {
            if !(gain.is_finite() && gain >= 0.0) {
                return Err(EngineError::InvalidProfile(format!(
                    "dot gain must be a non-negative number, got {gain}"
                )));
            }
        }
        Ok(())
    }

    /// The dot-gain pre-compensation curve, if one is configured.
    pub(crate) fn dot_gain_curve(&self) -> Result<Option<ToneCurve>, EngineError> {
        match self.dot_gain {
            Some(gain) if gain > 0.0 => ToneCurve::dot_gain_compensation(gain).map(Some),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_valid() {
        let profile = SeparationProfile::default();
        assert!(profile.validate().is_ok());
        assert_eq!(profile.white_policy(), WhitePolicy::Full);
        assert!(profile.black_generation_curve().is_identity());
        assert!(profile.rescales_after_removal());
    }

    #[test]
    fn test_ink_limit_range() {
        assert!(SeparationProfile::new().total_ink_limit(0.0).validate().is_err());
        assert!(SeparationProfile::new().total_ink_limit(4.5).validate().is_err());
        assert!(SeparationProfile::new().total_ink_limit(4.0).validate().is_ok());
    }

    #[test]
    fn test_negative_dot_gain_rejected() {
        let err = SeparationProfile::new().dot_gain(-0.1).validate().unwrap_err();
        assert!(matches!(err, EngineError::InvalidProfile(_)));
    }

    #[test]
    fn test_white_thresholds_checked() {
        let profile = SeparationProfile::new().white(WhitePolicy::EdgeEnhanced {
            threshold: 0.5,
            edge_threshold: 1.2,
        });
        assert!(profile.validate().is_err());
        assert!(SeparationProfile::new()
            .white(WhitePolicy::edge_enhanced())
            .validate()
            .is_ok());
    }

    #[test]
    fn test_zero_dot_gain_has_no_curve() {
        let profile = SeparationProfile::new().dot_gain(0.0);
        assert_eq!(profile.dot_gain_curve().unwrap(), None);
        let profile = SeparationProfile::new().dot_gain(0.1);
        assert!(profile.dot_gain_curve().unwrap().is_some());
    }
}
