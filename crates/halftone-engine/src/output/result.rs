//! The immutable output of a processing job.

use crate::raster::{Channel, ChannelPlane, ChannelSet, RasterImage};

/// Five screened planes plus an RGB preview.
///
/// Planes share one size; the preview has the same size. Lookup works by
/// [`Channel`] or by lower-case channel name (`"cyan"` .. `"white"`).
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    planes: ChannelSet<ChannelPlane>,
    preview: RasterImage,
    dpi: Option<f64>,
}

impl ProcessingResult {
    pub(crate) fn new(planes: ChannelSet<ChannelPlane>, preview: RasterImage) -> Self {
        let dpi = planes.cyan.dpi();
        Self {
            planes,
            preview,
            dpi,
        }
    }

    /// The screened plane for `channel`.
    #[inline]
    pub fn plane(&self, channel: Channel) -> &ChannelPlane {
        &self.planes[channel]
    }

    /// The screened plane named `name` (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Option<&ChannelPlane> {
        name.parse::<Channel>().ok().map(|c| self.plane(c))
    }

    #[inline]
    pub fn planes(&self) -> &ChannelSet<ChannelPlane> {
        &self.planes
    }

    /// RGB8 rendering of the screened separations.
    #[inline]
    pub fn preview(&self) -> &RasterImage {
        &self.preview
    }

    /// Output resolution of the planes, if known.
    #[inline]
    pub fn dpi(&self) -> Option<f64> {
        self.dpi
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.preview.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.preview.height()
    }

    /// Take ownership of planes and preview.
    pub fn into_parts(self) -> (ChannelSet<ChannelPlane>, RasterImage) {
        (self.planes, self.preview)
    }
}
