//! HalftoneEngine -- the primary entry point for the crate.
//!
//! [`HalftoneEngine`] runs the whole pipeline: separation, five-way parallel
//! screening and compositing.

use super::{CancelToken, EngineError, Stage};
use crate::color::Srgb;
use crate::output::{compose_with, PreviewOptions, ProcessingResult};
use crate::raster::{Channel, ChannelSet, RasterImage};
use crate::screen::{screen_with, ScreenParameters};
use crate::separate::{separate_with, SeparationProfile};

/// Separation + screening pipeline for DTF films.
///
/// # Design
///
/// - Constructor validates both the profile and the screen parameters, so a
///   built engine never fails on configuration
/// - Configuration methods consume and return `self`
/// - [`process()`](Self::process) takes `&self`; one engine can process many
///   images, also from several threads at once
///
/// # Example
///
/// ```
/// use halftone_engine::{
///     Channel, HalftoneEngine, PixelFormat, RasterImage, ScreenParameters, SeparationProfile,
/// };
///
/// let engine = HalftoneEngine::new(
///     SeparationProfile::default(),
///     ScreenParameters::new(300.0, 60.0),
/// )
/// .unwrap();
///
/// let image = RasterImage::new(8, 8, PixelFormat::Gray8, vec![128; 64]).unwrap();
/// let result = engine.process(&image).unwrap();
///
/// assert_eq!(result.plane(Channel::Black).width(), 8);
/// assert_eq!(result.preview().width(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct HalftoneEngine {
    profile: SeparationProfile,
    params: ScreenParameters,
    preview: PreviewOptions,
}

impl HalftoneEngine {
    /// Create an engine.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidProfile`] or
    /// [`EngineError::InvalidScreenParameters`] when either input fails
    /// validation.
    pub fn new(profile: SeparationProfile, params: ScreenParameters) -> Result<Self, EngineError> {
        profile.validate()?;
        params.validate()?;
        Ok(Self {
            profile,
            params,
            preview: PreviewOptions::default(),
        })
    }

    /// Garment or film colour for the preview.
    #[inline]
    pub fn backdrop(mut self, color: Srgb) -> Self {
        self.preview.backdrop = color;
        self
    }

    /// Ink colours for the preview.
    #[inline]
    pub fn inks(mut self, inks: ChannelSet<Srgb>) -> Self {
        self.preview.inks = inks;
        self
    }

    /// Replace all preview options at once.
    #[inline]
    pub fn preview_options(mut self, options: PreviewOptions) -> Self {
        self.preview = options;
        self
    }

    pub fn profile(&self) -> &SeparationProfile {
        &self.profile
    }

    pub fn screen_parameters(&self) -> &ScreenParameters {
        &self.params
    }

    /// Run the full pipeline on `image`.
    pub fn process(&self, image: &RasterImage) -> Result<ProcessingResult, EngineError> {
        self.process_with(image, &CancelToken::new(), &|_| {})
    }

    /// Run the full pipeline with cancellation and progress reporting.
    ///
    /// `progress` may be called from worker threads. On any error, including
    /// cancellation, every intermediate buffer is dropped and no partial
    /// result is returned.
    pub fn process_with(
        &self,
        image: &RasterImage,
        cancel: &CancelToken,
        progress: &(dyn Fn(Stage) + Sync),
    ) -> Result<ProcessingResult, EngineError> {
        let span = tracing::info_span!(
            "halftone",
            width = image.width(),
            height = image.height(),
            dpi = self.params.dpi,
            lpi = self.params.lpi,
            method = %self.params.method,
        );
        let _enter = span.enter();

        progress(Stage::Separating);
        let planes = separate_with(image, &self.profile, cancel)?;

        let screened = planes
            .par_map(|channel, plane| {
                progress(Stage::Screening(channel));
                screen_with(plane, &self.params, cancel)
            })
            .transpose()?;
        cancel.check()?;

        progress(Stage::Compositing);
        let result = compose_with(screened, &self.preview)?;

        tracing::info!(
            width = result.width(),
            height = result.height(),
            black = result.plane(Channel::Black).coverage(),
            white = result.plane(Channel::White).coverage(),
            "processing complete"
        );
        progress(Stage::Done);
        Ok(result)
    }
}
